//! SDL2 implementation of the rendering seam.

use crate::assets::{AssetLoader, AssetManager, TextureHandle};
use crate::error::{GameError, GameResult};
use crate::handler::Handler;
use crate::render::{Renderer, TextureDraw, palette};
use sdl2::pixels::Color;
use sdl2::rect::{Point, Rect};
use sdl2::render::{BlendMode, Canvas, Texture};
use sdl2::video::Window;

/// Draws onto an SDL canvas (the window or the virtual target)
pub struct SdlRenderer<'r, 'tc> {
    canvas: &'r mut Canvas<Window>,
    assets: &'r mut AssetManager<'tc>,
    size: (u32, u32),
}

impl<'r, 'tc> SdlRenderer<'r, 'tc> {
    /// `size` is the logical size of whatever `canvas` currently targets
    pub fn new(
        canvas: &'r mut Canvas<Window>,
        assets: &'r mut AssetManager<'tc>,
        size: (u32, u32),
    ) -> Self {
        canvas.set_blend_mode(BlendMode::Blend);
        SdlRenderer {
            canvas,
            assets,
            size,
        }
    }
}

impl Renderer for SdlRenderer<'_, '_> {
    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn clear(&mut self, color: Color) -> GameResult<()> {
        self.canvas.set_draw_color(color);
        self.canvas.clear();
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> GameResult<()> {
        self.canvas.set_draw_color(color);
        self.canvas.fill_rect(rect)?;
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) -> GameResult<()> {
        self.canvas.set_draw_color(color);
        self.canvas.draw_rect(rect)?;
        Ok(())
    }

    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: Color) -> GameResult<()> {
        self.canvas.set_draw_color(color);
        self.canvas
            .draw_line(Point::new(from.0, from.1), Point::new(to.0, to.1))?;
        Ok(())
    }

    fn draw_texture(&mut self, handle: TextureHandle, draw: &TextureDraw) -> GameResult<()> {
        let Some(texture) = self.assets.texture_mut(handle) else {
            return Ok(());
        };

        texture.set_color_mod(draw.tint.r, draw.tint.g, draw.tint.b);
        texture.set_alpha_mod(draw.tint.a);

        // SDL places dst's top-left directly; shift so `origin` lands there
        let (ox, oy) = draw.origin;
        let dst = Rect::new(
            draw.dst.x() - ox,
            draw.dst.y() - oy,
            draw.dst.width(),
            draw.dst.height(),
        );

        self.canvas.copy_ex(
            texture,
            draw.src,
            Some(dst),
            draw.rotation,
            Some(Point::new(ox, oy)),
            draw.flip_horizontal,
            false,
        )?;
        Ok(())
    }

    fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.assets.texture_size(handle)
    }
}

/// Render one frame: virtual target, scaled blit, then window overlay
///
/// The virtual target is cleared and fully redrawn every frame. SDL render
/// targets share the window's top-left origin, so the blit needs no flip.
pub fn present_frame(
    canvas: &mut Canvas<Window>,
    target: &mut Texture,
    assets: &mut AssetManager,
    handler: &Handler,
) -> GameResult<()> {
    let query = target.query();
    let virtual_size = (query.width, query.height);

    let mut draw_result = Ok(());
    canvas
        .with_texture_canvas(target, |target_canvas| {
            let mut renderer = SdlRenderer::new(target_canvas, assets, virtual_size);
            draw_result = handler.draw_virtual(&mut renderer);
        })
        .map_err(|e| GameError::Sdl(e.to_string()))?;
    draw_result?;

    let (window_w, window_h) = canvas.output_size()?;
    canvas.set_draw_color(palette::BLACK);
    canvas.clear();
    canvas.copy(target, None, Some(Rect::new(0, 0, window_w, window_h)))?;

    {
        let mut renderer = SdlRenderer::new(canvas, assets, (window_w, window_h));
        handler.draw_overlay(&mut renderer)?;
    }

    canvas.present();
    Ok(())
}
