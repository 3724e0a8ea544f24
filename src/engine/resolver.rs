//! GL entry-point lookup handed to the engine's render context

use std::ffi::{c_char, c_void, CStr};
use std::panic::{self, AssertUnwindSafe};

type ResolveFn = dyn Fn(&CStr) -> *const c_void;

/// Owned symbol resolver.
///
/// The engine keeps a raw pointer to this value, so it lives in a `Box` owned
/// by the binding and must not move or drop before the render context is
/// freed.
pub struct ProcResolver {
    resolve: Box<ResolveFn>,
}

impl ProcResolver {
    pub fn new<F>(resolve: F) -> Box<Self>
    where
        F: Fn(&CStr) -> *const c_void + 'static,
    {
        Box::new(Self {
            resolve: Box::new(resolve),
        })
    }

    /// Address of `name` in the current GL context, null if unknown
    pub fn resolve(&self, name: &CStr) -> *const c_void {
        (self.resolve)(name)
    }

    /// Context pointer to pass alongside [`ProcResolver::trampoline`]
    pub fn as_context_ptr(&self) -> *mut c_void {
        self as *const Self as *mut c_void
    }

    /// C callback the engine invokes with the context pointer from
    /// [`ProcResolver::as_context_ptr`].
    ///
    /// # Safety
    ///
    /// `ctx` must be null or point to a live `ProcResolver`, and `name` must be
    /// null or a valid NUL-terminated string.
    pub unsafe extern "C" fn trampoline(ctx: *mut c_void, name: *const c_char) -> *mut c_void {
        if ctx.is_null() || name.is_null() {
            return std::ptr::null_mut();
        }
        let resolver = &*(ctx as *const ProcResolver);
        let name = CStr::from_ptr(name);

        // Unwinding across the C boundary is undefined behavior
        let address = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(name)))
            .unwrap_or(std::ptr::null());

        if address.is_null() {
            tracing::debug!(target: "mpv", symbol = ?name, "GL entry point not found");
        } else {
            tracing::trace!(target: "mpv", symbol = ?name, "Resolved GL entry point");
        }
        address as *mut c_void
    }
}
