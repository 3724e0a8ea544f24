//! Recording GL, texture registry and scripted media engines for tests

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::path::Path;
use std::rc::Rc;

use crate::engine::{EngineError, EngineFactory, MediaEngine};
use crate::render::{FrameSize, GraphicsApi, TextureRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlCall {
    CreateFramebuffer(glow::Framebuffer),
    CreateTexture(glow::Texture),
    BindFramebuffer(Option<glow::Framebuffer>),
    BindTexture(Option<glow::Texture>),
    LinearFiltering(glow::Texture),
    AllocateStorage { texture: glow::Texture, size: FrameSize },
    Attach { framebuffer: glow::Framebuffer, texture: glow::Texture },
    CheckStatus,
    DeleteFramebuffer(glow::Framebuffer),
    DeleteTexture(glow::Texture),
}

#[derive(Default)]
struct GlState {
    next_name: u32,
    bound_framebuffer: Option<glow::Framebuffer>,
    bound_texture: Option<glow::Texture>,
    storage: HashMap<glow::Texture, FrameSize>,
    attachments: HashMap<glow::Framebuffer, glow::Texture>,
    calls: Vec<GlCall>,
    fail_textures: bool,
    incomplete: bool,
}

impl GlState {
    fn next_name(&mut self) -> NonZeroU32 {
        self.next_name += 1;
        NonZeroU32::new(self.next_name).expect("names start at 1")
    }
}

/// `GraphicsApi` that tracks binding state and records every call.
///
/// Panics when a texture or framebuffer operation runs with nothing bound.
#[derive(Default)]
pub struct RecordingGl {
    state: RefCell<GlState>,
}

impl RecordingGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_texture_creation(&self) {
        self.state.borrow_mut().fail_textures = true;
    }

    pub fn report_incomplete(&self) {
        self.state.borrow_mut().incomplete = true;
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn storage_size(&self, texture: glow::Texture) -> Option<FrameSize> {
        self.state.borrow().storage.get(&texture).copied()
    }

    pub fn attachment(&self, framebuffer: glow::Framebuffer) -> Option<glow::Texture> {
        self.state.borrow().attachments.get(&framebuffer).copied()
    }

    pub fn bound_framebuffer(&self) -> Option<glow::Framebuffer> {
        self.state.borrow().bound_framebuffer
    }

    pub fn bound_texture(&self) -> Option<glow::Texture> {
        self.state.borrow().bound_texture
    }

    /// Storage allocations recorded for `texture`, in order
    pub fn allocations(&self, texture: glow::Texture) -> Vec<FrameSize> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                GlCall::AllocateStorage { texture: t, size } if *t == texture => Some(*size),
                _ => None,
            })
            .collect()
    }
}

impl GraphicsApi for RecordingGl {
    fn create_framebuffer(&self) -> Result<glow::Framebuffer, String> {
        let mut state = self.state.borrow_mut();
        let framebuffer = glow::NativeFramebuffer(state.next_name());
        state.calls.push(GlCall::CreateFramebuffer(framebuffer));
        Ok(framebuffer)
    }

    fn create_texture(&self) -> Result<glow::Texture, String> {
        let mut state = self.state.borrow_mut();
        if state.fail_textures {
            return Err("GL_OUT_OF_MEMORY".to_string());
        }
        let texture = glow::NativeTexture(state.next_name());
        state.calls.push(GlCall::CreateTexture(texture));
        Ok(texture)
    }

    fn bind_framebuffer(&self, framebuffer: Option<glow::Framebuffer>) {
        let mut state = self.state.borrow_mut();
        state.bound_framebuffer = framebuffer;
        state.calls.push(GlCall::BindFramebuffer(framebuffer));
    }

    fn bind_texture(&self, texture: Option<glow::Texture>) {
        let mut state = self.state.borrow_mut();
        state.bound_texture = texture;
        state.calls.push(GlCall::BindTexture(texture));
    }

    fn set_linear_filtering(&self) {
        let mut state = self.state.borrow_mut();
        let texture = state.bound_texture.expect("filtering set with no texture bound");
        state.calls.push(GlCall::LinearFiltering(texture));
    }

    fn allocate_rgb_storage(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        let texture = state.bound_texture.expect("storage allocated with no texture bound");
        let size = FrameSize::new(width, height);
        state.storage.insert(texture, size);
        state.calls.push(GlCall::AllocateStorage { texture, size });
    }

    fn attach_color_texture(&self, texture: glow::Texture) {
        let mut state = self.state.borrow_mut();
        let framebuffer = state.bound_framebuffer.expect("attachment with no framebuffer bound");
        state.attachments.insert(framebuffer, texture);
        state.calls.push(GlCall::Attach { framebuffer, texture });
    }

    fn framebuffer_complete(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.calls.push(GlCall::CheckStatus);
        !state.incomplete
    }

    fn delete_framebuffer(&self, framebuffer: glow::Framebuffer) {
        let mut state = self.state.borrow_mut();
        state.attachments.remove(&framebuffer);
        state.calls.push(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn delete_texture(&self, texture: glow::Texture) {
        let mut state = self.state.borrow_mut();
        state.storage.remove(&texture);
        state.calls.push(GlCall::DeleteTexture(texture));
    }
}

/// `TextureRegistry` handing out sequential user texture ids
#[derive(Default)]
pub struct RecordingTextures {
    registered: Vec<glow::Texture>,
    freed: Vec<egui::TextureId>,
}

impl RecordingTextures {
    pub fn registered(&self) -> Vec<glow::Texture> {
        self.registered.clone()
    }

    pub fn freed(&self) -> Vec<egui::TextureId> {
        self.freed.clone()
    }
}

impl TextureRegistry for RecordingTextures {
    fn register(&mut self, texture: glow::Texture) -> egui::TextureId {
        self.registered.push(texture);
        egui::TextureId::User(self.registered.len() as u64)
    }

    fn free(&mut self, id: egui::TextureId) {
        self.freed.push(id);
    }
}

/// Engine calls, labelled with the source file name
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Open(String),
    Poll(String),
    Render { source: String, size: FrameSize },
    Terminate(String),
}

pub type Journal = Rc<RefCell<Vec<EngineCall>>>;

/// Knobs a test turns on one scripted engine
pub struct ScriptControl {
    pub frame_ready: Cell<bool>,
    pub fail_render: Cell<bool>,
    pub timing: Cell<Option<(f64, f64, f64)>>,
    pub ended: Cell<bool>,
}

impl Default for ScriptControl {
    fn default() -> Self {
        Self {
            frame_ready: Cell::new(true),
            fail_render: Cell::new(false),
            timing: Cell::new(None),
            ended: Cell::new(false),
        }
    }
}

pub struct ScriptedEngine {
    label: String,
    journal: Journal,
    control: Rc<ScriptControl>,
}

impl MediaEngine for ScriptedEngine {
    fn has_new_frame(&mut self) -> bool {
        self.journal.borrow_mut().push(EngineCall::Poll(self.label.clone()));
        self.control.frame_ready.get()
    }

    fn render_into(&mut self, _framebuffer: glow::Framebuffer, size: FrameSize) -> Result<(), EngineError> {
        self.journal.borrow_mut().push(EngineCall::Render {
            source: self.label.clone(),
            size,
        });
        if self.control.fail_render.get() {
            return Err(EngineError::Render("scripted failure".to_string()));
        }
        Ok(())
    }

    fn playback_position(&self) -> Option<f64> {
        self.control.timing.get().map(|(pos, _, _)| pos)
    }

    fn duration(&self) -> Option<f64> {
        self.control.timing.get().map(|(_, dur, _)| dur)
    }

    fn time_remaining(&self) -> Option<f64> {
        self.control.timing.get().map(|(_, _, rem)| rem)
    }

    fn file_name(&self) -> Option<String> {
        Some(self.label.clone())
    }

    fn reached_end(&self) -> bool {
        self.control.ended.get()
    }

    fn terminate(self: Box<Self>) {
        self.journal.borrow_mut().push(EngineCall::Terminate(self.label.clone()));
    }
}

/// Factory producing `ScriptedEngine`s that share one journal
#[derive(Default)]
pub struct ScriptedFactory {
    journal: Journal,
    controls: RefCell<HashMap<String, Rc<ScriptControl>>>,
    failing: RefCell<HashSet<String>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Journal {
        Rc::clone(&self.journal)
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.journal.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Control shared by every engine opened for `label`
    pub fn control(&self, label: &str) -> Rc<ScriptControl> {
        Rc::clone(self.controls.borrow_mut().entry(label.to_string()).or_default())
    }

    pub fn fail_open(&self, label: &str) {
        self.failing.borrow_mut().insert(label.to_string());
    }

    pub fn count(&self, expected: &EngineCall) -> usize {
        self.journal.borrow().iter().filter(|call| *call == expected).count()
    }
}

impl EngineFactory for ScriptedFactory {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaEngine>, EngineError> {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.failing.borrow().contains(&label) {
            return Err(EngineError::RenderContext("scripted failure".to_string()));
        }
        self.journal.borrow_mut().push(EngineCall::Open(label.clone()));
        Ok(Box::new(ScriptedEngine {
            control: self.control(&label),
            journal: self.journal(),
            label,
        }))
    }
}
