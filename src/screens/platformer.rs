//! Debug test 1: side-view platformer
//!
//! Exercises per-frame physics, rectangle collision, a follow camera,
//! sound effects, and the `AnimationManager` (idle / run sequences). The
//! player art comes from a 64x64 grid sheet when one is present and falls
//! back to a generated block otherwise.

use super::{DEBUG_MUSIC, MAIN_MUSIC, debug_navigation, texture_or_placeholder};
use crate::assets::TextureHandle;
use crate::error::GameResult;
use crate::math::{Rectf, Vec2};
use crate::render::{Renderer, TextureDraw, palette};
use crate::screen::{Screen, ScreenContext, ScreenId};
use crate::sprite::{AnimationManager, AnimationSequence, SequenceKind};
use crate::text::draw_text;
use log::debug;
use sdl2::keyboard::Keycode;
use sdl2::rect::Rect;

const GRAVITY: f32 = 800.0;
const JUMP_FORCE: f32 = 400.0;
const MOVE_SPEED: f32 = 200.0;
const PLAYER_SIZE: Vec2 = Vec2::new(32.0, 32.0);
const SPAWN: Vec2 = Vec2::new(100.0, 300.0);
/// Falling below this resets the player
const KILL_PLANE: f32 = 700.0;

const PLAYER_SHEET: &str = "res/image/player_sheet.png";
const IDLE_ANIMATOR: &str = "player_idle";
const RUN_ANIMATOR: &str = "player_run";

#[derive(Debug, Clone, Copy)]
struct Player {
    /// Top-left corner
    position: Vec2,
    velocity: Vec2,
    on_ground: bool,
    facing_right: bool,
}

impl Player {
    fn spawn() -> Self {
        Player {
            position: SPAWN,
            velocity: Vec2::ZERO,
            on_ground: false,
            facing_right: true,
        }
    }

    fn rect(&self) -> Rectf {
        Rectf::new(self.position.x, self.position.y, PLAYER_SIZE.x, PLAYER_SIZE.y)
    }

    fn center(&self) -> Vec2 {
        self.position + PLAYER_SIZE * 0.5
    }
}

pub struct PlatformerScreen {
    player: Player,
    platforms: Vec<Rectf>,
    animations: AnimationManager,
    running: bool,
    block_texture: TextureHandle,
    sheet_texture: TextureHandle,
    virtual_size: (u32, u32),
}

impl PlatformerScreen {
    pub fn new() -> Self {
        PlatformerScreen {
            player: Player::spawn(),
            platforms: Vec::new(),
            animations: AnimationManager::new(),
            running: false,
            block_texture: TextureHandle::INVALID,
            sheet_texture: TextureHandle::INVALID,
            virtual_size: (0, 0),
        }
    }

    fn build_level() -> Vec<Rectf> {
        vec![
            Rectf::new(0.0, 500.0, 800.0, 50.0),
            Rectf::new(200.0, 400.0, 100.0, 20.0),
            Rectf::new(400.0, 350.0, 100.0, 20.0),
            Rectf::new(600.0, 300.0, 100.0, 20.0),
            Rectf::new(300.0, 250.0, 150.0, 20.0),
            Rectf::new(100.0, 150.0, 120.0, 20.0),
        ]
    }

    fn setup_animations(&mut self) {
        self.animations.unload_all();
        self.animations
            .add_sequence(AnimationSequence::from_range("idle", SequenceKind::PingPong, 0, 4, 0.2));
        self.animations
            .add_sequence(AnimationSequence::from_range("run", SequenceKind::Loop, 11, 6, 0.08));
        self.animations.create_animator(IDLE_ANIMATOR, "idle");
        self.animations.create_animator(RUN_ANIMATOR, "run");
    }

    fn active_animator(&self) -> &str {
        if self.running { RUN_ANIMATOR } else { IDLE_ANIMATOR }
    }

    /// Offset that keeps the player centred on screen
    fn camera_offset(&self) -> Vec2 {
        let center = self.player.center();
        Vec2::new(
            self.virtual_size.0 as f32 / 2.0 - center.x,
            self.virtual_size.1 as f32 / 2.0 - center.y,
        )
    }

    fn move_player(&mut self, ctx: &mut ScreenContext, dt: f32) {
        let input = ctx.input;
        let was_on_ground = self.player.on_ground;

        let mut direction = 0.0;
        if input.is_key_down(Keycode::A) || input.is_key_down(Keycode::Left) {
            direction = -1.0;
            self.player.facing_right = false;
        }
        if input.is_key_down(Keycode::D) || input.is_key_down(Keycode::Right) {
            direction = 1.0;
            self.player.facing_right = true;
        }

        let jump = input.any_key_pressed(&[Keycode::Space, Keycode::W, Keycode::Up]);
        if jump && self.player.on_ground {
            self.player.velocity.y = -JUMP_FORCE;
            self.player.on_ground = false;
            ctx.audio.play_sound("jump");
        }

        self.player.velocity.x = direction * MOVE_SPEED;
        self.player.velocity.y += GRAVITY * dt;
        self.player.position += self.player.velocity * dt;

        self.player.on_ground = false;
        for platform in &self.platforms {
            if !self.player.rect().overlaps(platform) {
                continue;
            }
            if self.player.velocity.y > 0.0 && self.player.position.y < platform.y {
                self.player.position.y = platform.y - PLAYER_SIZE.y;
                self.player.velocity.y = 0.0;
                if !was_on_ground {
                    ctx.audio.play_sound("land");
                }
                self.player.on_ground = true;
            } else if self.player.velocity.y < 0.0 && self.player.position.y > platform.y {
                self.player.position.y = platform.bottom();
                self.player.velocity.y = 0.0;
            }
        }

        if self.player.position.y > KILL_PLANE {
            debug!("Player fell off the level, respawning");
            self.player = Player::spawn();
        }
    }

    fn update_animation(&mut self, dt: f32) {
        let running = self.player.on_ground && self.player.velocity.x != 0.0;
        if running != self.running {
            self.running = running;
            let (animator, sequence) = if running {
                (RUN_ANIMATOR, "run")
            } else {
                (IDLE_ANIMATOR, "idle")
            };
            self.animations.play_animation(animator, sequence);
        }
        self.animations.update(dt);
    }

    fn draw_player(&self, renderer: &mut dyn Renderer, offset: Vec2) -> GameResult<()> {
        let frame = self
            .animations
            .animator(self.active_animator())
            .map(|a| a.sprite_index())
            .unwrap_or(0);

        let top_left = self.player.position + offset;
        let dst = Rect::new(
            top_left.x.round() as i32,
            top_left.y.round() as i32,
            PLAYER_SIZE.x as u32,
            PLAYER_SIZE.y as u32,
        );

        let mut draw = TextureDraw::new(dst);
        draw.flip_horizontal = !self.player.facing_right;
        if self.sheet_texture.is_valid() {
            draw.src = Some(self.animations.frame_rect(frame));
            renderer.draw_texture(self.sheet_texture, &draw)?;
        } else {
            // Placeholder art bobs with the animation frame
            draw.dst.offset(0, -((frame % 2) as i32) * 2);
            renderer.draw_texture(self.block_texture, &draw)?;
        }

        // Facing indicator
        let (tip, base) = if self.player.facing_right {
            (top_left.x + PLAYER_SIZE.x + 3.0, top_left.x + PLAYER_SIZE.x - 5.0)
        } else {
            (top_left.x - 3.0, top_left.x + 5.0)
        };
        let top = (base as i32, (top_left.y + 10.0) as i32);
        let bottom = (base as i32, (top_left.y + 22.0) as i32);
        let point = (tip as i32, (top_left.y + 16.0) as i32);
        renderer.draw_line(top, bottom, palette::YELLOW)?;
        renderer.draw_line(bottom, point, palette::YELLOW)?;
        renderer.draw_line(point, top, palette::YELLOW)
    }

    fn draw_hud(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let lines: [(&str, i32); 5] = [
            ("DEBUG TEST 1: 2D PLATFORMER", 10),
            ("WASD/ARROW KEYS: MOVE", 40),
            ("SPACE: JUMP", 60),
            ("TAB: NEXT TEST", 80),
            ("ESC: BACK TO TITLE", 100),
        ];
        for (i, (text, y)) in lines.iter().enumerate() {
            let scale = if i == 0 { 3 } else { 2 };
            draw_text(renderer, text, 10, *y, scale, palette::WHITE)?;
        }

        let p = self.player;
        let info = [
            format!("POSITION: ({:.1}, {:.1})", p.position.x, p.position.y),
            format!("VELOCITY: ({:.1}, {:.1})", p.velocity.x, p.velocity.y),
            format!("ON GROUND: {}", if p.on_ground { "YES" } else { "NO" }),
            format!("FACING: {}", if p.facing_right { "RIGHT" } else { "LEFT" }),
            format!("ANIMATION: {}", if self.running { "RUN" } else { "IDLE" }),
        ];
        for (i, line) in info.iter().enumerate() {
            draw_text(renderer, line, 10, 140 + i as i32 * 20, 2, palette::YELLOW)?;
        }
        Ok(())
    }
}

impl Default for PlatformerScreen {
    fn default() -> Self {
        PlatformerScreen::new()
    }
}

impl Screen for PlatformerScreen {
    fn init(&mut self, ctx: &mut ScreenContext) {
        ctx.audio.play_music(DEBUG_MUSIC, true);

        self.virtual_size = ctx.virtual_size();
        self.player = Player::spawn();
        self.platforms = Self::build_level();
        self.running = false;
        self.setup_animations();

        self.sheet_texture = ctx.assets.load_texture("platformer_sheet", PLAYER_SHEET);
        self.block_texture = texture_or_placeholder(
            ctx,
            "platformer_player",
            "res/image/player_platformer.png",
            (32, 32),
            palette::BLUE,
            palette::DARK_BLUE,
        );
        debug!("Platformer ready with {} platforms", self.platforms.len());
    }

    fn update(&mut self, ctx: &mut ScreenContext, dt: f32) {
        self.move_player(ctx, dt);
        self.update_animation(dt);
        debug_navigation(ctx, ScreenId::Debug2);
    }

    fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        renderer.clear(palette::SKY_BLUE)?;

        let offset = self.camera_offset();
        for platform in &self.platforms {
            let rect = Rectf::new(platform.x + offset.x, platform.y + offset.y, platform.w, platform.h).to_sdl();
            renderer.fill_rect(rect, palette::GREEN)?;
            renderer.draw_rect_thick(rect, 2, palette::DARK_GREEN)?;
        }
        self.draw_player(renderer, offset)?;
        self.draw_hud(renderer)
    }

    fn unload(&mut self, ctx: &mut ScreenContext) {
        ctx.audio.play_music(MAIN_MUSIC, true);
        ctx.assets.unload_texture(self.sheet_texture);
        ctx.assets.unload_texture(self.block_texture);
        self.sheet_texture = TextureHandle::INVALID;
        self.block_texture = TextureHandle::INVALID;
        self.animations.unload_all();
        self.platforms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenCommand;
    use crate::testing::{RecordingRenderer, TestServices};

    const DT: f32 = 1.0 / 60.0;

    fn ready(services: &mut TestServices) -> PlatformerScreen {
        let mut screen = PlatformerScreen::new();
        screen.init(&mut services.context());
        screen
    }

    fn run(screen: &mut PlatformerScreen, services: &mut TestServices, frames: usize) {
        for _ in 0..frames {
            services.input.begin_frame();
            screen.update(&mut services.context(), DT);
        }
    }

    #[test]
    fn test_player_lands_on_ground() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        run(&mut screen, &mut services, 90);

        assert!(screen.player.on_ground);
        assert_eq!(screen.player.position.y, 500.0 - PLAYER_SIZE.y);
        let landings = services.audio.events.iter().filter(|e| *e == "sound:land").count();
        assert_eq!(landings, 1);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);

        services.input.press_key(Keycode::Space);
        screen.update(&mut services.context(), DT);
        assert!(!services.audio.events.contains(&"sound:jump".to_string()));

        run(&mut screen, &mut services, 90);
        services.input.begin_frame();
        services.input.release_key(Keycode::Space);
        services.input.begin_frame();
        services.input.press_key(Keycode::Space);
        screen.update(&mut services.context(), DT);
        assert!(services.audio.events.contains(&"sound:jump".to_string()));
        assert!(screen.player.velocity.y < 0.0);
    }

    #[test]
    fn test_running_switches_animation() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        run(&mut screen, &mut services, 90);
        assert_eq!(screen.active_animator(), IDLE_ANIMATOR);

        services.input.press_key(Keycode::D);
        run(&mut screen, &mut services, 5);
        assert_eq!(screen.active_animator(), RUN_ANIMATOR);
        assert!(screen.player.facing_right);
        assert!(screen.animations.is_playing(RUN_ANIMATOR));
    }

    #[test]
    fn test_fall_resets_player() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        screen.player.position = Vec2::new(1000.0, 690.0);
        screen.player.velocity = Vec2::new(0.0, 600.0);
        screen.update(&mut services.context(), 0.1);
        assert_eq!(screen.player.position, SPAWN);
    }

    #[test]
    fn test_music_and_cleanup() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        assert_eq!(services.audio.music.as_deref(), Some(DEBUG_MUSIC));
        let block = screen.block_texture;
        assert!(block.is_valid());

        screen.unload(&mut services.context());
        assert_eq!(services.audio.music.as_deref(), Some(MAIN_MUSIC));
        assert!(services.assets.unloaded.contains(&block));
        assert!(screen.animations.is_empty());
    }

    #[test]
    fn test_tab_goes_to_shooter() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        services.input.press_key(Keycode::Tab);
        screen.update(&mut services.context(), DT);
        assert_eq!(services.commands, vec![ScreenCommand::SetScreen(ScreenId::Debug2)]);
    }

    #[test]
    fn test_draw_centres_camera_on_player() {
        let mut services = TestServices::new();
        let screen = ready(&mut services);
        let mut renderer = RecordingRenderer::new(1280, 720);
        screen.draw(&mut renderer).unwrap();

        let draws = renderer.texture_draws();
        assert_eq!(draws.len(), 1);
        let (_, draw) = draws[0];
        assert_eq!((draw.dst.x(), draw.dst.y()), (640 - 16, 360 - 16));
    }
}
