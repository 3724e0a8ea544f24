//! libmpv-backed engine binding
//!
//! The instance is driven through `libmpv2`; the render API and the event
//! queue go through `libmpv2-sys` directly.

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use glutin::display::{Display, GlDisplay};
use libmpv2::Mpv;
use libmpv2_sys as sys;

use super::{EngineError, EngineFactory, MediaEngine, ProcResolver};
use crate::render::FrameSize;

const OPENGL_API: &CStr = c"opengl";

/// Engine settings applied to every instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Minimum level of engine log messages forwarded to tracing
    pub log_level: String,
    /// Hardware decoding mode (`hwdec` option)
    pub hwdec: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            log_level: "debug".to_string(),
            hwdec: "auto".to_string(),
        }
    }
}

/// Opens [`MpvBinding`]s that resolve GL symbols through a glutin display
pub struct MpvFactory {
    display: Display,
    options: EngineOptions,
}

impl MpvFactory {
    pub fn new(display: Display, options: EngineOptions) -> Self {
        Self { display, options }
    }
}

impl EngineFactory for MpvFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaEngine>, EngineError> {
        let display = self.display.clone();
        let resolver = ProcResolver::new(move |name| display.get_proc_address(name));
        let binding = MpvBinding::open(path, &self.options, resolver)?;
        Ok(Box::new(binding))
    }
}

/// One mpv instance with its OpenGL render context.
///
/// Dropping the binding frees the render context before the instance is
/// destroyed; the resolver outlives the context.
pub struct MpvBinding {
    render_ctx: NonNull<sys::mpv_render_context>,
    /// Referenced by the render context through a raw pointer
    _resolver: Box<ProcResolver>,
    mpv: Mpv,
    source: PathBuf,
    end_of_file: bool,
}

impl MpvBinding {
    /// Start a muted instance playing `path` and bind a render context to it
    pub fn open(path: &Path, options: &EngineOptions, resolver: Box<ProcResolver>) -> Result<Self, EngineError> {
        let mpv = Mpv::new().map_err(|e| EngineError::Create(format!("{:?}", e)))?;

        set_option(&mpv, "vo", "libmpv")?;
        set_option(&mpv, "terminal", "no")?;
        set_option(&mpv, "hwdec", &options.hwdec)?;
        request_log_messages(&mpv, &options.log_level);

        // Several panels play at once; their audio would overlap
        mpv.set_property("volume", 0i64).map_err(|e| EngineError::Property {
            name: "volume",
            message: format!("{:?}", e),
        })?;

        load_file(&mpv, path)?;

        let render_ctx = create_render_context(&mpv, &resolver)?;

        tracing::info!(path = %path.display(), hwdec = %options.hwdec, "Engine opened");

        Ok(Self {
            render_ctx,
            _resolver: resolver,
            mpv,
            source: path.to_path_buf(),
            end_of_file: false,
        })
    }

    fn drain_events(&mut self) {
        loop {
            // A zero timeout never blocks
            let event = unsafe { &*sys::mpv_wait_event(self.mpv.ctx.as_ptr(), 0.0) };
            match event.event_id {
                sys::mpv_event_id_MPV_EVENT_NONE | sys::mpv_event_id_MPV_EVENT_SHUTDOWN => break,
                sys::mpv_event_id_MPV_EVENT_LOG_MESSAGE => {
                    if !event.data.is_null() {
                        let message = unsafe { &*(event.data as *const sys::mpv_event_log_message) };
                        forward_log_message(message);
                    }
                }
                sys::mpv_event_id_MPV_EVENT_FILE_LOADED => {
                    self.end_of_file = false;
                    tracing::info!(path = %self.source.display(), "Stream opened");
                }
                sys::mpv_event_id_MPV_EVENT_END_FILE => {
                    self.end_of_file = true;
                    tracing::info!(path = %self.source.display(), "Playback finished");
                }
                _ => {}
            }
        }
    }
}

impl MediaEngine for MpvBinding {
    fn has_new_frame(&mut self) -> bool {
        self.drain_events();
        let flags = unsafe { sys::mpv_render_context_update(self.render_ctx.as_ptr()) };
        (flags & sys::mpv_render_update_flag_MPV_RENDER_UPDATE_FRAME as u64) != 0
    }

    fn render_into(&mut self, framebuffer: glow::Framebuffer, size: FrameSize) -> Result<(), EngineError> {
        let mut fbo = sys::mpv_opengl_fbo {
            fbo: framebuffer.0.get() as c_int,
            w: size.width as c_int,
            h: size.height as c_int,
            internal_format: 0,
        };
        // Row 0 of the texture is the top of the image, as egui samples it
        let mut flip_y: c_int = 0;
        let mut block_for_target_time: c_int = 0;
        let mut params = [
            sys::mpv_render_param {
                type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_OPENGL_FBO,
                data: &mut fbo as *mut _ as *mut c_void,
            },
            sys::mpv_render_param {
                type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_FLIP_Y,
                data: &mut flip_y as *mut _ as *mut c_void,
            },
            sys::mpv_render_param {
                type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_BLOCK_FOR_TARGET_TIME,
                data: &mut block_for_target_time as *mut _ as *mut c_void,
            },
            sys::mpv_render_param {
                type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_INVALID,
                data: std::ptr::null_mut(),
            },
        ];

        let rc = unsafe { sys::mpv_render_context_render(self.render_ctx.as_ptr(), params.as_mut_ptr()) };
        if rc < 0 {
            return Err(EngineError::Render(error_string(rc)));
        }
        Ok(())
    }

    fn playback_position(&self) -> Option<f64> {
        self.mpv.get_property::<f64>("time-pos").ok()
    }

    fn duration(&self) -> Option<f64> {
        self.mpv.get_property::<f64>("duration").ok()
    }

    fn time_remaining(&self) -> Option<f64> {
        self.mpv.get_property::<f64>("playtime-remaining").ok()
    }

    fn file_name(&self) -> Option<String> {
        self.mpv.get_property::<String>("filename").ok()
    }

    fn reached_end(&self) -> bool {
        self.end_of_file
    }

    fn terminate(self: Box<Self>) {
        tracing::info!(path = %self.source.display(), "Engine terminated");
        drop(self);
    }
}

impl Drop for MpvBinding {
    fn drop(&mut self) {
        // The context must go before the instance, which drops with `self.mpv`
        unsafe { sys::mpv_render_context_free(self.render_ctx.as_ptr()) };
    }
}

fn set_option(mpv: &Mpv, name: &'static str, value: &str) -> Result<(), EngineError> {
    mpv.set_property(name, value).map_err(|e| EngineError::Property {
        name,
        message: format!("{:?}", e),
    })
}

fn request_log_messages(mpv: &Mpv, level: &str) {
    let Ok(level_c) = CString::new(level) else {
        tracing::warn!(level, "Ignoring engine log level with NUL byte");
        return;
    };
    let rc = unsafe { sys::mpv_request_log_messages(mpv.ctx.as_ptr(), level_c.as_ptr()) };
    if rc < 0 {
        tracing::warn!(level, error = %error_string(rc), "Engine rejected log level");
    }
}

fn load_file(mpv: &Mpv, path: &Path) -> Result<(), EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::InvalidPath(path.to_path_buf()))?;
    let path_c = CString::new(path_str).map_err(|_| EngineError::InvalidPath(path.to_path_buf()))?;
    let mut args: [*const c_char; 3] = [c"loadfile".as_ptr(), path_c.as_ptr(), std::ptr::null()];

    let rc = unsafe { sys::mpv_command(mpv.ctx.as_ptr(), args.as_mut_ptr()) };
    if rc < 0 {
        return Err(EngineError::Load {
            path: path_str.to_string(),
            message: error_string(rc),
        });
    }
    Ok(())
}

fn create_render_context(
    mpv: &Mpv,
    resolver: &ProcResolver,
) -> Result<NonNull<sys::mpv_render_context>, EngineError> {
    let mut init_params = sys::mpv_opengl_init_params {
        get_proc_address: Some(ProcResolver::trampoline),
        get_proc_address_ctx: resolver.as_context_ptr(),
    };
    let mut params = [
        sys::mpv_render_param {
            type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_API_TYPE,
            data: OPENGL_API.as_ptr() as *mut c_void,
        },
        sys::mpv_render_param {
            type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_OPENGL_INIT_PARAMS,
            data: &mut init_params as *mut _ as *mut c_void,
        },
        sys::mpv_render_param {
            type_: sys::mpv_render_param_type_MPV_RENDER_PARAM_INVALID,
            data: std::ptr::null_mut(),
        },
    ];

    let mut render_ctx: *mut sys::mpv_render_context = std::ptr::null_mut();
    let rc = unsafe { sys::mpv_render_context_create(&mut render_ctx, mpv.ctx.as_ptr(), params.as_mut_ptr()) };
    if rc < 0 {
        return Err(EngineError::RenderContext(error_string(rc)));
    }
    NonNull::new(render_ctx).ok_or_else(|| EngineError::RenderContext("engine returned no context".to_string()))
}

fn error_string(code: c_int) -> String {
    let message = unsafe { CStr::from_ptr(sys::mpv_error_string(code)) };
    format!("{} ({})", message.to_string_lossy(), code)
}

/// tracing level for an engine log level name
fn tracing_level(level: &str) -> tracing::Level {
    match level {
        "fatal" | "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "v" | "debug" => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    }
}

fn forward_log_message(message: &sys::mpv_event_log_message) {
    let text_of = |ptr: *const c_char| {
        if ptr.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
        }
    };
    let prefix = text_of(message.prefix);
    let level = text_of(message.level);
    let text = text_of(message.text);
    let text = text.trim_end();

    match tracing_level(&level) {
        tracing::Level::ERROR => tracing::error!(target: "mpv", %prefix, "{}", text),
        tracing::Level::WARN => tracing::warn!(target: "mpv", %prefix, "{}", text),
        tracing::Level::INFO => tracing::info!(target: "mpv", %prefix, "{}", text),
        tracing::Level::DEBUG => tracing::debug!(target: "mpv", %prefix, "{}", text),
        _ => tracing::trace!(target: "mpv", %prefix, "{}", text),
    }
}
