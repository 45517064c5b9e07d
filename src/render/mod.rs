//! Rendering seam
//!
//! Screens, sprites and the debug overlay draw through the `Renderer` trait
//! instead of an SDL canvas directly. The SDL implementation lives in
//! `sdl.rs`; tests use a recording renderer so draw order can be asserted
//! without a window.
//!
//! # Coordinate spaces
//!
//! - **Virtual space**: the fixed-resolution offscreen target every screen
//!   draws into (1280x720 by default).
//! - **Window space**: the real window. Only the debug/FPS overlay draws
//!   here, after the virtual target has been blitted.

pub mod sdl;

use crate::assets::TextureHandle;
use crate::error::GameResult;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

pub use sdl::{SdlRenderer, present_frame};

/// Everything needed to draw (part of) a texture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureDraw {
    /// Source rectangle in texture pixels (None = whole texture)
    pub src: Option<Rect>,
    /// Destination rectangle. Its top-left is where `origin` lands.
    pub dst: Rect,
    /// Pivot inside `dst` used for placement and rotation
    pub origin: (i32, i32),
    /// Clockwise rotation in degrees
    pub rotation: f64,
    pub tint: Color,
    pub flip_horizontal: bool,
}

impl TextureDraw {
    /// Plain draw of the whole texture into `dst`
    pub fn new(dst: Rect) -> Self {
        TextureDraw {
            src: None,
            dst,
            origin: (0, 0),
            rotation: 0.0,
            tint: palette::WHITE,
            flip_horizontal: false,
        }
    }
}

/// Drawing primitives consumed by screens and managers
pub trait Renderer {
    /// Size of the surface being drawn to, in pixels
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Color) -> GameResult<()>;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> GameResult<()>;

    fn draw_rect(&mut self, rect: Rect, color: Color) -> GameResult<()>;

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color) -> GameResult<()>;

    /// Draw a texture; stale or invalid handles draw nothing
    fn draw_texture(&mut self, texture: TextureHandle, draw: &TextureDraw) -> GameResult<()>;

    /// Pixel size of a texture, if the handle is still live
    fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)>;

    /// Filled circle built from horizontal spans
    fn fill_circle(&mut self, center: (i32, i32), radius: i32, color: Color) -> GameResult<()> {
        if radius <= 0 {
            return Ok(());
        }
        let (cx, cy) = center;
        for dy in -radius..=radius {
            let half = ((radius * radius - dy * dy) as f32).sqrt() as i32;
            self.fill_rect(
                Rect::new(cx - half, cy + dy, (half * 2 + 1) as u32, 1),
                color,
            )?;
        }
        Ok(())
    }

    /// Rectangle outline `thickness` pixels wide, drawn inwards
    fn draw_rect_thick(&mut self, rect: Rect, thickness: u32, color: Color) -> GameResult<()> {
        for i in 0..thickness.min(rect.width() / 2).min(rect.height() / 2).max(1) {
            let inset = Rect::new(
                rect.x() + i as i32,
                rect.y() + i as i32,
                rect.width().saturating_sub(i * 2),
                rect.height().saturating_sub(i * 2),
            );
            self.draw_rect(inset, color)?;
        }
        Ok(())
    }
}

/// Named colors used across the screens
pub mod palette {
    use sdl2::pixels::Color;

    const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    pub const WHITE: Color = rgba(255, 255, 255, 255);
    pub const BLACK: Color = rgba(0, 0, 0, 255);
    pub const RAY_WHITE: Color = rgba(245, 245, 245, 255);
    pub const LIGHT_GRAY: Color = rgba(200, 200, 200, 255);
    pub const GRAY: Color = rgba(130, 130, 130, 255);
    pub const DARK_GRAY: Color = rgba(80, 80, 80, 255);
    pub const RED: Color = rgba(230, 41, 55, 255);
    pub const MAROON: Color = rgba(190, 33, 55, 255);
    pub const ORANGE: Color = rgba(255, 161, 0, 255);
    pub const YELLOW: Color = rgba(253, 249, 0, 255);
    pub const GOLD: Color = rgba(255, 203, 0, 255);
    pub const GREEN: Color = rgba(0, 228, 48, 255);
    pub const LIME: Color = rgba(0, 158, 47, 255);
    pub const DARK_GREEN: Color = rgba(0, 117, 44, 255);
    pub const SKY_BLUE: Color = rgba(102, 191, 255, 255);
    pub const BLUE: Color = rgba(0, 121, 241, 255);
    pub const DARK_BLUE: Color = rgba(0, 82, 172, 255);
    pub const PURPLE: Color = rgba(200, 122, 255, 255);
    pub const BROWN: Color = rgba(127, 106, 79, 255);

    /// Same color with a new alpha
    pub const fn fade(color: Color, alpha: u8) -> Color {
        rgba(color.r, color.g, color.b, alpha)
    }
}
