//! Debug test 2: top-down shooter
//!
//! Bullets, enemies and explosion particles all live in one
//! `EntityManager`; each kind carries its own behavior. The screen itself
//! only moves the player, spawns things, and resolves hits.

use super::{DEBUG_MUSIC, MAIN_MUSIC, debug_navigation, texture_or_placeholder};
use crate::assets::{AssetLoader, TextureHandle};
use crate::entity::{Entity, EntityBehavior, EntityFrame, EntityKind, EntityManager};
use crate::error::GameResult;
use crate::math::{Rectf, Vec2};
use crate::render::{Renderer, TextureDraw, palette};
use crate::screen::{Screen, ScreenContext, ScreenId};
use crate::sprite::{SpriteKind, SpriteObject};
use crate::text::draw_text;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::Color;
use sdl2::rect::Rect;

const PLAYER_SPEED: f32 = 250.0;
const PLAYER_SIZE: u32 = 32;
/// Closest the player's centre may get to the screen edge
const EDGE_MARGIN: f32 = 15.0;
const MAX_HEALTH: f32 = 100.0;
const SHOOT_COOLDOWN: f32 = 0.15;

const BULLET_SPEED: f32 = 500.0;
const BULLET_LIFETIME: f32 = 3.0;
const BULLET_SPAWN_OFFSET: f32 = 20.0;
const BULLET_HIT_RANGE: f32 = 15.0;

const MAX_ENEMIES: usize = 10;
const ENEMY_SIZE: u32 = 30;
const ENEMY_SPAWN_INTERVAL: f32 = 2.0;
const ENEMY_CONTACT_RANGE: f32 = 25.0;
/// Health lost per second while an enemy touches the player
const CONTACT_DAMAGE: f32 = 20.0;
const KILL_SCORE: u32 = 10;

const MAX_PARTICLES: usize = 100;
const PARTICLES_PER_EXPLOSION: usize = 8;

const GRID_SPACING: usize = 50;

//=============================================================================
// Behaviors
//=============================================================================

struct BulletBehavior {
    lifetime: f32,
}

impl EntityBehavior for BulletBehavior {
    fn update(&mut self, entity: &mut Entity, frame: &EntityFrame) {
        entity.position += entity.velocity * frame.dt;
        self.lifetime -= frame.dt;

        let p = entity.position;
        let b = frame.bounds;
        if self.lifetime <= 0.0 || p.x < b.x || p.x > b.right() || p.y < b.y || p.y > b.bottom() {
            entity.active = false;
        }
    }

    fn draw(&self, entity: &Entity, renderer: &mut dyn Renderer) -> GameResult<()> {
        let p = entity.position;
        renderer.fill_circle((p.x as i32, p.y as i32), 3, palette::YELLOW)
    }
}

/// Chases whatever the frame focuses on (the player)
struct EnemyBehavior {
    speed: f32,
}

impl EntityBehavior for EnemyBehavior {
    fn update(&mut self, entity: &mut Entity, frame: &EntityFrame) {
        let Some(target) = frame.focus else {
            return;
        };
        entity.velocity = (target - entity.position).normalize() * self.speed;
        entity.position += entity.velocity * frame.dt;
    }
}

struct ParticleBehavior {
    lifetime: f32,
    max_lifetime: f32,
    color: Color,
}

impl EntityBehavior for ParticleBehavior {
    fn update(&mut self, entity: &mut Entity, frame: &EntityFrame) {
        entity.position += entity.velocity * frame.dt;
        self.lifetime -= frame.dt;
        if self.lifetime <= 0.0 {
            entity.active = false;
        }
    }

    fn draw(&self, entity: &Entity, renderer: &mut dyn Renderer) -> GameResult<()> {
        let alpha = (self.lifetime / self.max_lifetime).clamp(0.0, 1.0);
        let p = entity.position;
        renderer.fill_circle(
            (p.x as i32, p.y as i32),
            3,
            palette::fade(self.color, (255.0 * alpha) as u8),
        )
    }
}

//=============================================================================
// Screen
//=============================================================================

pub struct ShooterScreen {
    player_position: Vec2,
    /// Degrees; the sprite faces up, so 0 points north
    player_rotation: f32,
    health: f32,
    score: u32,
    shoot_cooldown: f32,
    spawn_timer: f32,
    entities: EntityManager,
    rng: StdRng,
    player_texture: TextureHandle,
    enemy_texture: TextureHandle,
    enemy_texture_size: (u32, u32),
    virtual_size: (u32, u32),
}

impl ShooterScreen {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic spawns, for tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        ShooterScreen {
            player_position: Vec2::ZERO,
            player_rotation: 0.0,
            health: MAX_HEALTH,
            score: 0,
            shoot_cooldown: 0.0,
            spawn_timer: 0.0,
            entities: EntityManager::new(),
            rng,
            player_texture: TextureHandle::INVALID,
            enemy_texture: TextureHandle::INVALID,
            enemy_texture_size: (ENEMY_SIZE, ENEMY_SIZE),
            virtual_size: (0, 0),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    fn bounds(&self) -> Rectf {
        Rectf::new(0.0, 0.0, self.virtual_size.0 as f32, self.virtual_size.1 as f32)
    }

    /// Player back in the middle, every entity gone
    fn reset(&mut self, assets: &mut dyn AssetLoader) {
        self.entities.unload_all(assets);
        self.player_position = Vec2::new(self.virtual_size.0 as f32 / 2.0, self.virtual_size.1 as f32 / 2.0);
        self.player_rotation = 0.0;
        self.health = MAX_HEALTH;
        self.score = 0;
        self.shoot_cooldown = 0.0;
        self.spawn_timer = 0.0;
    }

    fn fire_bullet(&mut self, position: Vec2, direction: Vec2) -> bool {
        let id = self.entities.next_id();
        let mut bullet = Entity::new(id, EntityKind::Projectile, "bullet", position, (6.0, 6.0))
            .with_behavior(BulletBehavior {
                lifetime: BULLET_LIFETIME,
            });
        bullet.velocity = direction * BULLET_SPEED;
        self.entities.add(bullet).is_ok()
    }

    fn spawn_enemy_at(&mut self, position: Vec2, speed: f32) -> bool {
        let id = self.entities.next_id();
        let mut sprite = SpriteObject::new(id, "enemy", self.enemy_texture, position, SpriteKind::Enemy);
        let (w, h) = self.enemy_texture_size;
        sprite.scale = Vec2::new(ENEMY_SIZE as f32 / w.max(1) as f32, ENEMY_SIZE as f32 / h.max(1) as f32);
        sprite.center_origin(self.enemy_texture_size);

        let size = ENEMY_SIZE as f32;
        let enemy = Entity::new(id, EntityKind::Enemy, "enemy", position, (size, size))
            .with_sprite(sprite)
            .with_behavior(EnemyBehavior { speed });
        self.entities.add(enemy).is_ok()
    }

    /// New enemy just off a random edge
    fn spawn_enemy(&mut self) {
        if self.entities.count_by_kind(EntityKind::Enemy) >= MAX_ENEMIES {
            return;
        }
        let (w, h) = (self.virtual_size.0 as f32, self.virtual_size.1 as f32);
        let position = match self.rng.gen_range(0..4) {
            0 => Vec2::new(self.rng.gen_range(0.0..=w), -20.0),
            1 => Vec2::new(w + 20.0, self.rng.gen_range(0.0..=h)),
            2 => Vec2::new(self.rng.gen_range(0.0..=w), h + 20.0),
            _ => Vec2::new(-20.0, self.rng.gen_range(0.0..=h)),
        };
        let speed = self.rng.gen_range(80.0..=120.0);
        self.spawn_enemy_at(position, speed);
    }

    /// Ring of particles flying outwards
    fn explode(&mut self, position: Vec2, color: Color) {
        for i in 0..PARTICLES_PER_EXPLOSION {
            if self.entities.count_by_kind(EntityKind::Misc) >= MAX_PARTICLES || self.entities.is_full() {
                return;
            }
            let angle = (i as f32 / PARTICLES_PER_EXPLOSION as f32 * 360.0).to_radians();
            let speed = self.rng.gen_range(50.0..=150.0);
            let lifetime = self.rng.gen_range(0.5..=1.5);

            let id = self.entities.next_id();
            let mut particle = Entity::new(id, EntityKind::Misc, "particle", position, (3.0, 3.0))
                .with_behavior(ParticleBehavior {
                    lifetime,
                    max_lifetime: lifetime,
                    color,
                });
            particle.velocity = Vec2::new(angle.cos(), angle.sin()) * speed;
            let _ = self.entities.add(particle);
        }
    }

    fn move_player(&mut self, ctx: &ScreenContext, dt: f32) {
        let input = ctx.input;
        let mut direction = Vec2::ZERO;
        if input.is_key_down(Keycode::W) {
            direction.y -= 1.0;
        }
        if input.is_key_down(Keycode::S) {
            direction.y += 1.0;
        }
        if input.is_key_down(Keycode::A) {
            direction.x -= 1.0;
        }
        if input.is_key_down(Keycode::D) {
            direction.x += 1.0;
        }

        let mut p = self.player_position + direction.normalize() * PLAYER_SPEED * dt;
        p.x = p.x.clamp(EDGE_MARGIN, self.virtual_size.0 as f32 - EDGE_MARGIN);
        p.y = p.y.clamp(EDGE_MARGIN, self.virtual_size.1 as f32 - EDGE_MARGIN);
        self.player_position = p;
    }

    fn aim_and_shoot(&mut self, ctx: &mut ScreenContext, dt: f32) {
        let (mx, my) = ctx.input.mouse_virtual(ctx.virtual_size());
        let mouse = Vec2::new(mx, my);
        self.player_rotation = self.player_position.angle_to(mouse) + 90.0;

        if self.shoot_cooldown > 0.0 {
            self.shoot_cooldown -= dt;
        }
        if ctx.input.is_mouse_down(MouseButton::Left) && self.shoot_cooldown <= 0.0 {
            let aim = (mouse - self.player_position).normalize();
            let spawn = self.player_position + aim * BULLET_SPAWN_OFFSET;
            if self.fire_bullet(spawn, aim) {
                ctx.audio.play_sound("shoot");
            }
            self.shoot_cooldown = SHOOT_COOLDOWN;
        }
    }

    /// Enemy contact damage and bullet hits
    fn resolve_contacts(&mut self, ctx: &mut ScreenContext, dt: f32) {
        let enemies: Vec<(i32, Vec2)> = self
            .entities
            .get_by_kind(EntityKind::Enemy)
            .iter()
            .filter(|e| e.is_active())
            .map(|e| (e.id, e.position))
            .collect();
        let mut bullets: Vec<(i32, Vec2)> = self
            .entities
            .get_by_kind(EntityKind::Projectile)
            .iter()
            .filter(|e| e.is_active())
            .map(|e| (e.id, e.position))
            .collect();

        for (enemy_id, enemy_pos) in enemies {
            if enemy_pos.distance(self.player_position) < ENEMY_CONTACT_RANGE {
                self.health -= CONTACT_DAMAGE * dt;
                self.explode(enemy_pos, palette::RED);
            }

            let Some(hit) = bullets
                .iter()
                .position(|(_, b)| b.distance(enemy_pos) < BULLET_HIT_RANGE)
            else {
                continue;
            };
            let (bullet_id, _) = bullets.remove(hit);
            for id in [enemy_id, bullet_id] {
                if let Some(entity) = self.entities.get_by_id_mut(id) {
                    entity.active = false;
                }
            }
            self.score += KILL_SCORE;
            ctx.audio.play_sound("hit");
            self.explode(enemy_pos, palette::RED);
        }
    }

    fn draw_player(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let p = self.player_position;
        let half = PLAYER_SIZE as i32 / 2;
        let mut draw = TextureDraw::new(Rect::new(p.x as i32, p.y as i32, PLAYER_SIZE, PLAYER_SIZE));
        draw.origin = (half, half);
        draw.rotation = self.player_rotation as f64;
        renderer.draw_texture(self.player_texture, &draw)
    }

    fn draw_hud(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        draw_text(renderer, "DEBUG TEST 2: TOP-DOWN SHOOTER", 10, 10, 3, palette::WHITE)?;
        draw_text(renderer, "WASD: MOVE", 10, 40, 2, palette::WHITE)?;
        draw_text(renderer, "MOUSE: AIM, LEFT CLICK: SHOOT", 10, 60, 2, palette::WHITE)?;
        draw_text(renderer, "TAB: NEXT TEST", 10, 80, 2, palette::WHITE)?;
        draw_text(renderer, "ESC: BACK TO TITLE", 10, 100, 2, palette::WHITE)?;

        draw_text(renderer, &format!("SCORE: {}", self.score), 10, 140, 2, palette::YELLOW)?;
        draw_text(
            renderer,
            &format!("HEALTH: {:.0}/{:.0}", self.health.max(0.0), MAX_HEALTH),
            10,
            160,
            2,
            palette::YELLOW,
        )?;

        let background = Rect::new(10, 180, 200, 20);
        let filled = (self.health.max(0.0) / MAX_HEALTH * 200.0) as u32;
        renderer.fill_rect(background, palette::MAROON)?;
        if filled > 0 {
            renderer.fill_rect(Rect::new(10, 180, filled, 20), palette::RED)?;
        }
        renderer.draw_rect_thick(background, 2, palette::WHITE)
    }
}

impl Default for ShooterScreen {
    fn default() -> Self {
        ShooterScreen::new()
    }
}

impl Screen for ShooterScreen {
    fn init(&mut self, ctx: &mut ScreenContext) {
        ctx.audio.play_music(DEBUG_MUSIC, true);
        self.virtual_size = ctx.virtual_size();

        self.player_texture = texture_or_placeholder(
            ctx,
            "shooter_player",
            "res/image/player_shooter.png",
            (PLAYER_SIZE, PLAYER_SIZE),
            palette::SKY_BLUE,
            palette::WHITE,
        );
        self.enemy_texture = texture_or_placeholder(
            ctx,
            "shooter_enemy",
            "res/image/enemy.png",
            (ENEMY_SIZE, ENEMY_SIZE),
            palette::RED,
            palette::MAROON,
        );
        self.enemy_texture_size = ctx
            .assets
            .texture_size(self.enemy_texture)
            .unwrap_or((ENEMY_SIZE, ENEMY_SIZE));

        self.reset(ctx.assets);
        debug!("Shooter ready");
    }

    fn update(&mut self, ctx: &mut ScreenContext, dt: f32) {
        self.move_player(ctx, dt);
        self.aim_and_shoot(ctx, dt);

        self.spawn_timer += dt;
        if self.spawn_timer >= ENEMY_SPAWN_INTERVAL {
            self.spawn_enemy();
            self.spawn_timer = 0.0;
        }

        let frame = EntityFrame::new(dt, self.bounds()).with_focus(self.player_position);
        self.entities.update(&frame);
        self.resolve_contacts(ctx, dt);
        self.entities.remove_inactive(ctx.assets);

        if self.health <= 0.0 {
            info!("Player destroyed with score {}, restarting", self.score);
            self.reset(ctx.assets);
        }

        debug_navigation(ctx, ScreenId::Debug3);
    }

    fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let (width, height) = self.virtual_size;
        renderer.clear(palette::DARK_GRAY)?;
        for x in (0..width as i32).step_by(GRID_SPACING) {
            renderer.draw_line((x, 0), (x, height as i32), palette::GRAY)?;
        }
        for y in (0..height as i32).step_by(GRID_SPACING) {
            renderer.draw_line((0, y), (width as i32, y), palette::GRAY)?;
        }

        // Particles sit behind everything
        self.entities.draw_layers(
            renderer,
            &[EntityKind::Misc, EntityKind::Enemy, EntityKind::Projectile],
        )?;
        self.draw_player(renderer)?;
        self.draw_hud(renderer)
    }

    fn unload(&mut self, ctx: &mut ScreenContext) {
        ctx.audio.play_music(MAIN_MUSIC, true);
        self.entities.unload_all(ctx.assets);
        ctx.assets.unload_texture(self.player_texture);
        ctx.assets.unload_texture(self.enemy_texture);
        self.player_texture = TextureHandle::INVALID;
        self.enemy_texture = TextureHandle::INVALID;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenCommand;
    use crate::testing::{RecordingRenderer, TestServices};

    fn ready(services: &mut TestServices) -> ShooterScreen {
        let mut screen = ShooterScreen::with_seed(7);
        screen.init(&mut services.context());
        screen
    }

    #[test]
    fn test_init_centres_player() {
        let mut services = TestServices::new();
        let screen = ready(&mut services);
        assert_eq!(screen.player_position, Vec2::new(640.0, 360.0));
        assert_eq!(screen.health(), MAX_HEALTH);
        assert_eq!(services.audio.music.as_deref(), Some(DEBUG_MUSIC));
    }

    #[test]
    fn test_bullet_kills_enemy() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        assert!(screen.spawn_enemy_at(Vec2::new(100.0, 100.0), 0.0));
        assert!(screen.fire_bullet(Vec2::new(100.0, 105.0), Vec2::new(0.0, -1.0)));

        screen.update(&mut services.context(), 0.001);

        assert_eq!(screen.score(), KILL_SCORE);
        assert_eq!(screen.entities.count_by_kind(EntityKind::Enemy), 0);
        assert_eq!(screen.entities.count_by_kind(EntityKind::Projectile), 0);
        assert_eq!(screen.entities.count_by_kind(EntityKind::Misc), PARTICLES_PER_EXPLOSION);
        assert!(services.audio.events.contains(&"sound:hit".to_string()));
    }

    #[test]
    fn test_contact_drains_health() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        let player = screen.player_position;
        screen.spawn_enemy_at(player + Vec2::new(10.0, 0.0), 0.0);

        screen.update(&mut services.context(), 0.25);
        screen.update(&mut services.context(), 0.25);
        assert!((screen.health() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_death_resets_round() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        let player = screen.player_position;
        screen.score = 50;
        screen.health = 1.0;
        screen.spawn_enemy_at(player, 0.0);

        screen.update(&mut services.context(), 0.1);
        assert_eq!(screen.health(), MAX_HEALTH);
        assert_eq!(screen.score(), 0);
        assert!(screen.entities.is_empty());
    }

    #[test]
    fn test_bullets_expire_off_screen() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        screen.fire_bullet(Vec2::new(5.0, 5.0), Vec2::new(-1.0, 0.0));
        screen.update(&mut services.context(), 0.1);
        assert_eq!(screen.entities.count_by_kind(EntityKind::Projectile), 0);
    }

    #[test]
    fn test_shooting_respects_cooldown() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        services.input.set_mouse_position(1280, 360);
        services.input.press_mouse(MouseButton::Left);

        screen.update(&mut services.context(), 0.05);
        screen.update(&mut services.context(), 0.05);
        let shots = services.audio.events.iter().filter(|e| *e == "sound:shoot").count();
        assert_eq!(shots, 1);
        assert_eq!(screen.player_rotation, 90.0);
    }

    #[test]
    fn test_enemy_spawns_capped() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        for _ in 0..MAX_ENEMIES + 5 {
            screen.spawn_enemy();
        }
        assert_eq!(screen.entities.count_by_kind(EntityKind::Enemy), MAX_ENEMIES);
        for enemy in screen.entities.get_by_kind(EntityKind::Enemy) {
            assert!(!screen.bounds().contains(enemy.position));
        }
    }

    #[test]
    fn test_tab_goes_to_showcase() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        services.input.press_key(Keycode::Tab);
        screen.update(&mut services.context(), 0.016);
        assert_eq!(services.commands, vec![ScreenCommand::SetScreen(ScreenId::Debug3)]);
    }

    #[test]
    fn test_unload_frees_textures() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        let (player, enemy) = (screen.player_texture, screen.enemy_texture);
        screen.spawn_enemy_at(Vec2::new(50.0, 50.0), 0.0);

        screen.unload(&mut services.context());
        assert!(screen.entities.is_empty());
        assert!(services.assets.unloaded.contains(&player));
        assert!(services.assets.unloaded.contains(&enemy));
        assert_eq!(services.audio.music.as_deref(), Some(MAIN_MUSIC));
    }

    #[test]
    fn test_draw_health_bar() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        screen.health = 50.0;
        let mut renderer = RecordingRenderer::new(1280, 720);
        screen.draw(&mut renderer).unwrap();
        assert!(renderer.calls.contains(&crate::testing::DrawCall::FillRect(
            Rect::new(10, 180, 100, 20),
            palette::RED
        )));
    }

    #[test]
    fn test_spent_bullets_are_not_drawn() {
        let mut services = TestServices::new();
        let mut screen = ready(&mut services);
        let mut renderer = RecordingRenderer::new(1280, 720);
        screen.draw(&mut renderer).unwrap();
        let baseline = renderer.calls.len();

        assert!(screen.fire_bullet(Vec2::new(300.0, 300.0), Vec2::new(1.0, 0.0)));
        let mut renderer = RecordingRenderer::new(1280, 720);
        screen.draw(&mut renderer).unwrap();
        assert!(renderer.calls.len() > baseline);

        for entity in screen.entities.iter_mut() {
            entity.active = false;
        }
        let mut renderer = RecordingRenderer::new(1280, 720);
        screen.draw(&mut renderer).unwrap();
        assert_eq!(renderer.calls.len(), baseline);
    }
}
