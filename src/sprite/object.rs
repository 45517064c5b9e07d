use crate::assets::{AssetLoader, TextureHandle};
use crate::error::GameResult;
use crate::math::Vec2;
use crate::render::{Renderer, TextureDraw, palette};
use log::warn;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

/// Frames in a horizontal strip are capped at this many
pub const MAX_SPRITE_FRAMES: u32 = 64;
pub const DEFAULT_FRAME_TIME: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Player,
    Enemy,
    Item,
    Background,
    Effect,
    Ui,
    Normal,
    Decor,
    Other,
}

/// A drawable texture with transform, tint and an optional frame strip
///
/// The texture is referenced, not owned, unless the sprite came from
/// `SpriteObject::load`; an owning sprite holds one reference on the
/// texture, which its manager drops when the sprite is removed. Clones
/// never own.
#[derive(Debug)]
pub struct SpriteObject {
    pub id: i32,
    pub name: String,
    pub texture: TextureHandle,
    pub position: Vec2,
    pub scale: Vec2,
    pub tint: Color,
    /// Degrees, clockwise
    pub rotation: f32,
    pub kind: SpriteKind,
    pub visible: bool,
    /// Pivot in destination pixels, for placement and rotation
    pub origin: Vec2,

    current_frame: u32,
    total_frames: u32,
    frame_time: f32,
    frame_timer: f32,
    animating: bool,

    owns_texture: bool,
}

impl SpriteObject {
    pub fn new(id: i32, name: &str, texture: TextureHandle, position: Vec2, kind: SpriteKind) -> Self {
        SpriteObject {
            id,
            name: name.to_string(),
            texture,
            position,
            scale: Vec2::new(1.0, 1.0),
            tint: palette::WHITE,
            rotation: 0.0,
            kind,
            visible: true,
            origin: Vec2::ZERO,
            current_frame: 0,
            total_frames: 1,
            frame_time: DEFAULT_FRAME_TIME,
            frame_timer: 0.0,
            animating: false,
            owns_texture: false,
        }
    }

    /// Load `path` under `name` and build a sprite owning that texture reference
    pub fn load(
        id: i32,
        name: &str,
        path: &str,
        assets: &mut dyn AssetLoader,
        position: Vec2,
        kind: SpriteKind,
    ) -> Option<Self> {
        let texture = assets.load_texture(name, path);
        if !texture.is_valid() {
            return None;
        }
        let mut sprite = SpriteObject::new(id, name, texture, position, kind);
        sprite.owns_texture = true;
        Some(sprite)
    }

    pub fn owns_texture(&self) -> bool {
        self.owns_texture
    }

    /// Drop the texture reference this sprite holds, if any
    pub fn release_texture(&mut self, assets: &mut dyn AssetLoader) {
        if self.owns_texture {
            assets.unload_texture(self.texture);
            self.owns_texture = false;
        }
    }

    /// Put the pivot in the middle of one (scaled) frame
    pub fn center_origin(&mut self, texture_size: (u32, u32)) {
        let (w, h) = self.frame_size(texture_size);
        self.origin = Vec2::new(w as f32 * self.scale.x / 2.0, h as f32 * self.scale.y / 2.0);
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    pub fn frame_timer(&self) -> f32 {
        self.frame_timer
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Size of one frame of the strip
    pub fn frame_size(&self, texture_size: (u32, u32)) -> (u32, u32) {
        (texture_size.0 / self.total_frames, texture_size.1)
    }

    /// Change how many frames the strip has (clamped to 1..=64)
    pub fn set_frames(&mut self, total: u32) {
        self.total_frames = total.clamp(1, MAX_SPRITE_FRAMES);
        if self.current_frame >= self.total_frames {
            self.current_frame = 0;
        }
    }

    /// Begin cycling through `total` frames, `frame_time` seconds each
    ///
    /// Returns false (and leaves the sprite unchanged) for a strip of one
    /// frame or a non-positive frame time.
    pub fn start_animation(&mut self, total: u32, frame_time: f32) -> bool {
        if total <= 1 || frame_time <= 0.0 {
            warn!(
                "Sprite '{}': invalid animation ({} frames, {}s per frame)",
                self.name, total, frame_time
            );
            return false;
        }
        self.set_frames(total);
        self.frame_time = frame_time;
        self.frame_timer = 0.0;
        self.current_frame = 0;
        self.animating = true;
        true
    }

    pub fn stop_animation(&mut self) {
        self.animating = false;
        self.frame_timer = 0.0;
    }

    pub fn set_frame(&mut self, frame: u32) -> bool {
        if frame >= self.total_frames {
            warn!(
                "Sprite '{}': frame {} out of range (0..{})",
                self.name, frame, self.total_frames
            );
            return false;
        }
        self.current_frame = frame;
        true
    }

    /// Advance the strip; leftover time carries into the next frame
    pub fn update(&mut self, dt: f32) {
        if !self.animating || self.total_frames <= 1 || self.frame_time <= 0.0 {
            return;
        }
        self.frame_timer += dt;
        while self.frame_timer >= self.frame_time {
            self.frame_timer -= self.frame_time;
            self.current_frame = (self.current_frame + 1) % self.total_frames;
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        if !self.visible {
            return Ok(());
        }
        let Some(texture_size) = renderer.texture_size(self.texture) else {
            return Ok(());
        };

        let (frame_w, frame_h) = self.frame_size(texture_size);
        let src = Rect::new((frame_w * self.current_frame) as i32, 0, frame_w, frame_h);
        let dst = Rect::new(
            self.position.x.round() as i32,
            self.position.y.round() as i32,
            (frame_w as f32 * self.scale.x.abs()).round() as u32,
            (frame_h as f32 * self.scale.y.abs()).round() as u32,
        );

        renderer.draw_texture(
            self.texture,
            &TextureDraw {
                src: Some(src),
                dst,
                origin: (self.origin.x.round() as i32, self.origin.y.round() as i32),
                rotation: self.rotation as f64,
                tint: self.tint,
                flip_horizontal: self.scale.x < 0.0,
            },
        )
    }
}

impl Clone for SpriteObject {
    fn clone(&self) -> Self {
        SpriteObject {
            id: self.id,
            name: self.name.clone(),
            texture: self.texture,
            position: self.position,
            scale: self.scale,
            tint: self.tint,
            rotation: self.rotation,
            kind: self.kind,
            visible: self.visible,
            origin: self.origin,
            current_frame: self.current_frame,
            total_frames: self.total_frames,
            frame_time: self.frame_time,
            frame_timer: self.frame_timer,
            animating: self.animating,
            owns_texture: false,
        }
    }
}
