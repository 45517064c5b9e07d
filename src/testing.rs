//! Headless test doubles for the rendering, asset and audio seams.

use crate::assets::{AssetLoader, Released, SlotTable, TextureHandle};
use crate::audio::AudioControl;
use crate::error::GameResult;
use crate::handler::Services;
use crate::input::InputState;
use crate::render::{Renderer, TextureDraw};
use crate::screen::{Screen, ScreenCommand, ScreenContext, ScreenStatus};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Clear(Color),
    FillRect(Rect, Color),
    DrawRect(Rect, Color),
    Line((i32, i32), (i32, i32), Color),
    Texture(TextureHandle, TextureDraw),
}

/// Renderer that records every call
pub struct RecordingRenderer {
    pub size: (u32, u32),
    pub calls: Vec<DrawCall>,
    pub texture_sizes: HashMap<TextureHandle, (u32, u32)>,
}

impl RecordingRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        RecordingRenderer {
            size: (width, height),
            calls: Vec::new(),
            texture_sizes: HashMap::new(),
        }
    }

    pub fn texture_draws(&self) -> Vec<(TextureHandle, TextureDraw)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Texture(handle, draw) => Some((*handle, *draw)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self, color: Color) -> GameResult<()> {
        self.calls.push(DrawCall::Clear(color));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> GameResult<()> {
        self.calls.push(DrawCall::FillRect(rect, color));
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> GameResult<()> {
        self.calls.push(DrawCall::DrawRect(rect, color));
        Ok(())
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color) -> GameResult<()> {
        self.calls.push(DrawCall::Line(from, to, color));
        Ok(())
    }

    fn draw_texture(&mut self, texture: TextureHandle, draw: &TextureDraw) -> GameResult<()> {
        self.calls.push(DrawCall::Texture(texture, *draw));
        Ok(())
    }

    fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.texture_sizes.get(&texture).copied()
    }
}

/// In-memory asset loader; only paths registered with `with_file` load
pub struct MemoryAssets {
    files: HashMap<String, (u32, u32)>,
    textures: SlotTable<(u32, u32)>,
    names: HashMap<String, TextureHandle>,
    pub unloaded: Vec<TextureHandle>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        MemoryAssets {
            files: HashMap::new(),
            textures: SlotTable::with_capacity(crate::assets::MAX_TEXTURES),
            names: HashMap::new(),
            unloaded: Vec::new(),
        }
    }

    pub fn with_file(mut self, path: &str, width: u32, height: u32) -> Self {
        self.files.insert(path.to_string(), (width, height));
        self
    }

    pub fn loaded_count(&self) -> usize {
        self.textures.len()
    }

    pub fn ref_count(&self, handle: TextureHandle) -> u32 {
        self.textures.ref_count(handle)
    }

    fn acquire_cached(&mut self, name: &str) -> Option<TextureHandle> {
        let handle = *self.names.get(name)?;
        self.textures.acquire(handle).then_some(handle)
    }
}

impl AssetLoader for MemoryAssets {
    fn load_texture(&mut self, name: &str, path: &str) -> TextureHandle {
        if let Some(handle) = self.acquire_cached(name) {
            return handle;
        }
        let Some(&size) = self.files.get(path) else {
            return TextureHandle::INVALID;
        };
        match self.textures.insert(size) {
            Ok(handle) => {
                self.names.insert(name.to_string(), handle);
                handle
            }
            Err(_) => TextureHandle::INVALID,
        }
    }

    fn create_solid_texture(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        _fill: Color,
        _border: Option<Color>,
    ) -> TextureHandle {
        if let Some(handle) = self.acquire_cached(name) {
            return handle;
        }
        match self.textures.insert((width, height)) {
            Ok(handle) => {
                self.names.insert(name.to_string(), handle);
                handle
            }
            Err(_) => TextureHandle::INVALID,
        }
    }

    fn texture(&self, name: &str) -> TextureHandle {
        self.names.get(name).copied().unwrap_or(TextureHandle::INVALID)
    }

    fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(handle).copied()
    }

    fn unload_texture(&mut self, handle: TextureHandle) {
        if let Released::Freed(_) = self.textures.release(handle) {
            self.names.retain(|_, h| *h != handle);
            self.unloaded.push(handle);
        }
    }
}

/// Audio sink that remembers what it was asked to do
#[derive(Default)]
pub struct RecordingAudio {
    pub events: Vec<String>,
    pub music: Option<String>,
}

impl AudioControl for RecordingAudio {
    fn play_sound(&mut self, name: &str) {
        self.events.push(format!("sound:{}", name));
    }

    fn play_music(&mut self, name: &str, _looped: bool) {
        self.events.push(format!("music:{}", name));
        self.music = Some(name.to_string());
    }

    fn fade_out_music(&mut self, seconds: f32) {
        self.events.push(format!("fade:{}", seconds));
    }

    fn stop_music(&mut self) {
        self.events.push("stop_music".to_string());
        self.music = None;
    }

    fn stop_all_sounds(&mut self) {
        self.events.push("stop_sounds".to_string());
    }

    fn current_music(&self) -> Option<&str> {
        self.music.as_deref()
    }
}

/// Owned input, assets and audio for driving screens without SDL
pub struct TestServices {
    pub input: InputState,
    pub assets: MemoryAssets,
    pub audio: RecordingAudio,
    pub commands: Vec<ScreenCommand>,
}

impl TestServices {
    pub fn new() -> Self {
        TestServices {
            input: InputState::new((1280, 720)),
            assets: MemoryAssets::new(),
            audio: RecordingAudio::default(),
            commands: Vec::new(),
        }
    }

    pub fn context(&mut self) -> ScreenContext<'_> {
        ScreenContext::new(
            &self.input,
            &mut self.assets,
            &mut self.audio,
            ScreenStatus::default(),
            &mut self.commands,
        )
    }

    pub fn services(&mut self) -> Services<'_> {
        Services {
            input: &self.input,
            assets: &mut self.assets,
            audio: &mut self.audio,
        }
    }
}

/// Screen that writes "init x" / "update x" / "draw x" / "unload x" to a log
///
/// `on_init` / `on_update` commands are queued every time the hook runs.
pub struct LifecycleScreen {
    name: String,
    log: Rc<RefCell<Vec<String>>>,
    pub on_init: Option<ScreenCommand>,
    pub on_update: Option<ScreenCommand>,
}

impl LifecycleScreen {
    pub fn new(name: &str, log: &Rc<RefCell<Vec<String>>>) -> Self {
        LifecycleScreen {
            name: name.to_string(),
            log: Rc::clone(log),
            on_init: None,
            on_update: None,
        }
    }

    pub fn on_init(mut self, command: ScreenCommand) -> Self {
        self.on_init = Some(command);
        self
    }

    pub fn on_update(mut self, command: ScreenCommand) -> Self {
        self.on_update = Some(command);
        self
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{} {}", event, self.name));
    }
}

fn emit(ctx: &mut ScreenContext, command: Option<ScreenCommand>) {
    match command {
        Some(ScreenCommand::SetScreen(id)) => ctx.set_screen(id),
        Some(ScreenCommand::Transition { target, duration }) => {
            ctx.request_transition(target, duration)
        }
        Some(ScreenCommand::Quit) => ctx.quit(),
        None => {}
    }
}

impl Screen for LifecycleScreen {
    fn init(&mut self, ctx: &mut ScreenContext) {
        self.record("init");
        emit(ctx, self.on_init);
    }

    fn update(&mut self, ctx: &mut ScreenContext, _dt: f32) {
        self.record("update");
        emit(ctx, self.on_update);
    }

    fn draw(&self, _renderer: &mut dyn Renderer) -> GameResult<()> {
        self.record("draw");
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut ScreenContext) {
        self.record("unload");
    }
}
