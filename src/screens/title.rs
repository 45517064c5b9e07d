use super::MAIN_MUSIC;
use crate::error::GameResult;
use crate::render::{Renderer, palette};
use crate::screen::{Screen, ScreenContext, ScreenId};
use crate::text::draw_text_centered;
use sdl2::keyboard::Keycode;

/// Title menu. Escape is handled globally (it quits from this screen).
pub struct TitleScreen {
    virtual_size: (u32, u32),
    blink: f32,
}

impl TitleScreen {
    pub fn new() -> Self {
        TitleScreen {
            virtual_size: (0, 0),
            blink: 0.0,
        }
    }
}

impl Default for TitleScreen {
    fn default() -> Self {
        TitleScreen::new()
    }
}

impl Screen for TitleScreen {
    fn init(&mut self, ctx: &mut ScreenContext) {
        self.virtual_size = ctx.virtual_size();
        self.blink = 0.0;
        ctx.audio.play_music(MAIN_MUSIC, true);
    }

    fn update(&mut self, ctx: &mut ScreenContext, dt: f32) {
        self.blink = (self.blink + dt) % 1.0;

        if ctx.status.transitioning {
            return;
        }
        if ctx.input.any_key_pressed(&[Keycode::Return, Keycode::Space]) {
            let duration = ctx.status.transition_duration;
            ctx.request_transition(ScreenId::Debug1, duration);
        }
    }

    fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let (width, height) = self.virtual_size;
        let cx = width as i32 / 2;
        let cy = height as i32 / 2;

        renderer.clear(palette::DARK_BLUE)?;
        draw_text_centered(renderer, "STARTER 2D", cx, cy - 100, 8, palette::WHITE)?;
        if self.blink < 0.6 {
            draw_text_centered(renderer, "PRESS ENTER OR SPACE TO START", cx, cy + 20, 3, palette::GOLD)?;
        }
        draw_text_centered(renderer, "PRESS ESC TO EXIT", cx, cy + 60, 2, palette::LIGHT_GRAY)?;
        draw_text_centered(
            renderer,
            "F1 DEBUG  F2 FPS  F3 INFO  P PAUSE",
            cx,
            height as i32 - 40,
            2,
            palette::SKY_BLUE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenCommand;
    use crate::testing::TestServices;

    #[test]
    fn test_start_requests_transition() {
        let mut services = TestServices::new();
        let mut screen = TitleScreen::new();
        screen.init(&mut services.context());
        assert_eq!(services.audio.music.as_deref(), Some(MAIN_MUSIC));

        services.input.press_key(Keycode::Return);
        screen.update(&mut services.context(), 0.016);
        assert_eq!(
            services.commands,
            vec![ScreenCommand::Transition {
                target: ScreenId::Debug1,
                duration: 1.0
            }]
        );
    }

    #[test]
    fn test_no_request_while_transitioning() {
        let mut services = TestServices::new();
        let mut screen = TitleScreen::new();
        services.input.press_key(Keycode::Space);

        let mut ctx = services.context();
        ctx.status.transitioning = true;
        screen.update(&mut ctx, 0.016);
        drop(ctx);
        assert!(services.commands.is_empty());
    }
}
