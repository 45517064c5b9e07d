use crate::error::GameResult;
use crate::render::{Renderer, palette};
use crate::screen::{Screen, ScreenContext, ScreenId};
use crate::text::draw_text_centered;
use log::debug;
use sdl2::keyboard::Keycode;
use sdl2::rect::Rect;

/// Seconds before the title screen takes over on its own
const INIT_DURATION: f32 = 3.0;
/// Alpha units removed from the black cover per second
const FADE_SPEED: f32 = 150.0;
const SKIP_HINT_DELAY: f32 = 1.0;

/// Startup splash: fades in from black, then moves on to the title
pub struct InitScreen {
    timer: f32,
    fade_alpha: f32,
    virtual_size: (u32, u32),
}

impl InitScreen {
    pub fn new() -> Self {
        InitScreen {
            timer: 0.0,
            fade_alpha: 255.0,
            virtual_size: (0, 0),
        }
    }

    /// 0-3 dots, cycling twice a second
    fn dot_count(&self) -> i32 {
        (self.timer * 2.0) as i32 % 4
    }
}

impl Default for InitScreen {
    fn default() -> Self {
        InitScreen::new()
    }
}

impl Screen for InitScreen {
    fn init(&mut self, ctx: &mut ScreenContext) {
        self.timer = 0.0;
        self.fade_alpha = 255.0;
        self.virtual_size = ctx.virtual_size();
        debug!("Init screen ready");
    }

    fn update(&mut self, ctx: &mut ScreenContext, dt: f32) {
        self.timer += dt;
        self.fade_alpha = (self.fade_alpha - FADE_SPEED * dt).max(0.0);

        let skipped = ctx
            .input
            .any_key_pressed(&[Keycode::Space, Keycode::Return, Keycode::Escape]);
        if self.timer > INIT_DURATION || skipped {
            ctx.set_screen(ScreenId::Title);
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let (width, height) = self.virtual_size;
        let cx = width as i32 / 2;
        let cy = height as i32 / 2;

        renderer.clear(palette::BLACK)?;
        draw_text_centered(renderer, "STARTER 2D", cx, cy - 60, 6, palette::WHITE)?;
        draw_text_centered(
            renderer,
            &format!("VERSION {}", env!("CARGO_PKG_VERSION")),
            cx,
            cy - 10,
            3,
            palette::LIGHT_GRAY,
        )?;

        let loading = "LOADING";
        let (loading_w, _) = crate::text::measure_text(loading, 2);
        draw_text_centered(renderer, loading, cx, cy + 30, 2, palette::GRAY)?;
        for i in 0..self.dot_count() {
            renderer.fill_circle((cx + loading_w as i32 / 2 + 20 + i * 10, cy + 38), 3, palette::WHITE)?;
        }

        if self.timer > SKIP_HINT_DELAY {
            draw_text_centered(renderer, "PRESS ANY KEY TO SKIP", cx, cy + 80, 2, palette::DARK_GRAY)?;
        }

        if self.fade_alpha > 0.0 {
            renderer.fill_rect(
                Rect::new(0, 0, width, height),
                palette::fade(palette::BLACK, self.fade_alpha as u8),
            )?;
        }
        Ok(())
    }
}
