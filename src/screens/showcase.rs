//! Debug test 3: drawing showcase
//!
//! Five pages selected with Up/Down: color gradients, rotating shapes, a
//! pooled sprite burst, bitmap text, and mouse interaction.

use super::{DEBUG_MUSIC, MAIN_MUSIC, debug_navigation};
use crate::assets::TextureHandle;
use crate::error::GameResult;
use crate::math::{Rectf, Vec2};
use crate::render::{Renderer, TextureDraw, palette};
use crate::screen::{Screen, ScreenContext, ScreenId};
use crate::sprite::{SpriteKind, SpriteManager, SpriteObject};
use crate::text::{draw_text, measure_text};
use log::debug;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use std::collections::VecDeque;

const TEST_NAMES: [&str; 5] = [
    "COLOR GRADIENTS",
    "SHAPE ANIMATION",
    "SPRITE POOL",
    "TEXT RENDERING",
    "MOUSE INTERACTION",
];

const GRID_SPACING: usize = 40;
const GRID_COLOR: Color = Color::RGBA(40, 40, 40, 255);
const BURST_SPRITES: usize = 50;
const SPARK_SIZE: u32 = 10;
const BLOCK_SIZE: u32 = 30;
const TRAIL_LENGTH: usize = 20;
const HOVER_RADIUS: f32 = 30.0;

/// `hue` in degrees, `saturation` and `value` in 0..=1
pub fn color_from_hsv(hue: f32, saturation: f32, value: f32) -> Color {
    let hue = hue.rem_euclid(360.0);
    let chroma = value * saturation;
    let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = value - chroma;

    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let channel = |c: f32| ((c + m) * 255.0).round() as u8;
    Color::RGBA(channel(r), channel(g), channel(b), 255)
}

/// Outline approximated with straight segments
fn draw_circle_lines(renderer: &mut dyn Renderer, center: Vec2, radius: f32, color: Color) -> GameResult<()> {
    const SEGMENTS: usize = 32;
    let point = |i: usize| {
        let angle = (i as f32 / SEGMENTS as f32 * 360.0).to_radians();
        (
            (center.x + angle.cos() * radius) as i32,
            (center.y + angle.sin() * radius) as i32,
        )
    };
    for i in 0..SEGMENTS {
        renderer.draw_line(point(i), point(i + 1), color)?;
    }
    Ok(())
}

pub struct ShowcaseScreen {
    selected: usize,
    show_grid: bool,
    animation_time: f32,
    color_cycle: f32,
    sprites: SpriteManager,
    burst_ids: Vec<i32>,
    spark_texture: TextureHandle,
    block_texture: TextureHandle,
    mouse: Vec2,
    clicked: bool,
    trail: VecDeque<Vec2>,
    virtual_size: (u32, u32),
}

impl ShowcaseScreen {
    pub fn new() -> Self {
        ShowcaseScreen {
            selected: 0,
            show_grid: true,
            animation_time: 0.0,
            color_cycle: 0.0,
            sprites: SpriteManager::new(),
            burst_ids: Vec::new(),
            spark_texture: TextureHandle::INVALID,
            block_texture: TextureHandle::INVALID,
            mouse: Vec2::ZERO,
            clicked: false,
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            virtual_size: (0, 0),
        }
    }

    pub fn selected_test(&self) -> &'static str {
        TEST_NAMES[self.selected]
    }

    fn content_area(&self) -> Rectf {
        let (w, h) = self.virtual_size;
        Rectf::new(50.0, 80.0, w as f32 - 100.0, h as f32 - 160.0)
    }

    fn content_center(&self) -> Vec2 {
        let area = self.content_area();
        Vec2::new(area.x + area.w / 2.0, area.y + area.h / 2.0)
    }

    /// Centres of the eight clickable circles on the mouse page
    fn target_positions(&self) -> [Vec2; 8] {
        let area = self.content_area();
        std::array::from_fn(|i| {
            Vec2::new(
                area.x + 100.0 + (i % 4) as f32 * 100.0,
                area.y + 50.0 + (i / 4) as f32 * 100.0,
            )
        })
    }

    fn hovered_target(&self) -> Option<usize> {
        self.target_positions()
            .iter()
            .position(|p| p.distance(self.mouse) < HOVER_RADIUS)
    }

    fn spawn_burst(&mut self) {
        let center = self.content_center();
        for _ in 0..BURST_SPRITES {
            let id = self.sprites.next_id();
            let mut sprite = SpriteObject::new(id, "spark", self.spark_texture, center, SpriteKind::Effect);
            sprite.center_origin((SPARK_SIZE, SPARK_SIZE));
            if self.sprites.add(sprite).is_ok() {
                self.burst_ids.push(id);
            }
        }
    }

    /// Sparks fly outwards, shrinking and fading, then start over
    fn update_burst(&mut self) {
        let center = self.content_center();
        for (i, &id) in self.burst_ids.iter().enumerate() {
            let Some(sprite) = self.sprites.get_by_id_mut(id) else {
                continue;
            };
            let t = (self.animation_time * 0.5 + i as f32 * 0.02) % 1.0;
            let angle = (i as f32 * 7.2).to_radians();
            let distance = t * 200.0;

            sprite.position = center + Vec2::new(angle.cos(), angle.sin()) * distance;
            sprite.scale = Vec2::new(1.0 - t, 1.0 - t);
            sprite.center_origin((SPARK_SIZE, SPARK_SIZE));
            sprite.tint = Color::RGBA(255, (255.0 * t) as u8, 100, ((1.0 - t) * 255.0) as u8);
        }
    }

    fn update_mouse(&mut self, ctx: &ScreenContext) {
        let (x, y) = ctx.input.mouse_virtual(ctx.virtual_size());
        self.mouse = Vec2::new(x, y);
        self.clicked = ctx.input.is_mouse_pressed(MouseButton::Left);

        if self.trail.len() == TRAIL_LENGTH {
            self.trail.pop_front();
        }
        self.trail.push_back(self.mouse);
    }

    //=========================================================================
    // Pages
    //=========================================================================

    fn draw_gradients(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let area = self.content_area().to_sdl();
        let width = area.width().max(1);
        for i in 0..width {
            let t = i as f32 / width as f32;
            let color = Color::RGBA((255.0 * (1.0 - t)) as u8, 0, (255.0 * t) as u8, 255);
            let x = area.x() + i as i32;
            renderer.draw_line((x, area.y()), (x, area.y() + 100), color)?;
        }

        let center = Vec2::new(area.x() as f32 + area.width() as f32 / 2.0, area.y() as f32 + 200.0);
        for hue in (0..360).step_by(10) {
            let angle = (hue as f32 + self.color_cycle * 50.0).to_radians();
            let p = center + Vec2::new(angle.cos(), angle.sin()) * 80.0;
            renderer.fill_circle((p.x as i32, p.y as i32), 8, color_from_hsv(hue as f32, 1.0, 1.0))?;
        }
        Ok(())
    }

    fn draw_shapes(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let center = self.content_center();
        let colors = [palette::RED, palette::GREEN, palette::BLUE, palette::YELLOW, palette::PURPLE];
        let half = BLOCK_SIZE as i32 / 2;

        for (i, color) in colors.iter().enumerate() {
            let rotation = self.animation_time * 50.0 + i as f32 * 72.0;
            let distance = 100.0 + (self.animation_time + i as f32).sin() * 30.0;
            let p = center + Vec2::new(rotation.to_radians().cos(), rotation.to_radians().sin()) * distance;

            let mut draw = TextureDraw::new(Rect::new(p.x as i32, p.y as i32, BLOCK_SIZE, BLOCK_SIZE));
            draw.origin = (half, half);
            draw.rotation = rotation as f64;
            draw.tint = *color;
            renderer.draw_texture(self.block_texture, &draw)?;
        }

        let pulse = 30.0 + (self.animation_time * 3.0).sin() * 15.0;
        renderer.fill_circle(
            (center.x as i32, center.y as i32),
            pulse as i32,
            palette::fade(palette::WHITE, 128),
        )?;
        draw_circle_lines(renderer, center, pulse, palette::WHITE)
    }

    fn draw_text_page(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let area = self.content_area();
        let (x, y) = (area.x as i32, area.y as i32);
        draw_text(renderer, "LARGE TITLE TEXT", x, y, 5, palette::WHITE)?;
        draw_text(renderer, "Medium subtitle text", x, y + 50, 3, palette::LIGHT_GRAY)?;
        draw_text(renderer, "Small body text for descriptions", x, y + 80, 2, palette::GRAY)?;

        let wave_y = y + 120;
        let (letter_width, _) = measure_text("W", 3);
        for (i, letter) in "ANIMATED TEXT".chars().enumerate() {
            let wave = (self.animation_time * 5.0 + i as f32 * 0.5).sin() * 10.0;
            let hue = (self.animation_time * 100.0 + i as f32 * 30.0) % 360.0;
            draw_text(
                renderer,
                &letter.to_string(),
                x + i as i32 * (letter_width as i32 + 6),
                wave_y + wave as i32,
                3,
                color_from_hsv(hue, 1.0, 1.0),
            )?;
        }

        let sample = "This text is measured";
        let (width, height) = measure_text(sample, 2);
        draw_text(renderer, sample, x, wave_y + 60, 2, palette::WHITE)?;
        renderer.draw_rect(Rect::new(x, wave_y + 60, width, height), palette::GREEN)?;
        draw_text(renderer, &format!("WIDTH: {} PIXELS", width), x, wave_y + 85, 1, palette::GREEN)
    }

    fn draw_mouse_page(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let area = self.content_area();
        draw_text(
            renderer,
            &format!("MOUSE: ({:.0}, {:.0})", self.mouse.x, self.mouse.y),
            area.x as i32,
            area.y as i32,
            2,
            palette::WHITE,
        )?;

        let hovered = self.hovered_target();
        for (i, p) in self.target_positions().iter().enumerate() {
            let is_hovered = hovered == Some(i);
            let (color, radius) = if is_hovered { (palette::RED, 35.0) } else { (palette::BLUE, 25.0) };
            let (x, y) = (p.x as i32, p.y as i32);
            renderer.fill_circle((x, y), radius as i32, color)?;
            draw_circle_lines(renderer, *p, radius, palette::WHITE)?;

            if is_hovered {
                draw_text(renderer, "HOVER", x - 14, y - 4, 1, palette::WHITE)?;
                if self.clicked {
                    draw_text(renderer, "CLICKED!", x - 24, y + 40, 1, palette::YELLOW)?;
                }
            }
        }

        // Oldest points are the faintest
        for (i, p) in self.trail.iter().enumerate() {
            let alpha = (i as f32 / TRAIL_LENGTH as f32 * 255.0) as u8;
            renderer.fill_circle((p.x as i32, p.y as i32), 3, palette::fade(palette::WHITE, alpha))?;
        }
        Ok(())
    }

    fn draw_footer(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let height = self.virtual_size.1 as i32;
        draw_text(renderer, "CURRENT TEST:", 10, height - 60, 2, palette::YELLOW)?;
        draw_text(renderer, self.selected_test(), 10, height - 40, 2, palette::WHITE)?;
        for i in 0..TEST_NAMES.len() {
            let color = if i == self.selected { palette::YELLOW } else { palette::DARK_GRAY };
            renderer.fill_circle((10 + i as i32 * 20, height - 15), 5, color)?;
        }
        Ok(())
    }
}

impl Default for ShowcaseScreen {
    fn default() -> Self {
        ShowcaseScreen::new()
    }
}

impl Screen for ShowcaseScreen {
    fn init(&mut self, ctx: &mut ScreenContext) {
        ctx.audio.play_music(DEBUG_MUSIC, true);
        self.virtual_size = ctx.virtual_size();
        self.selected = 0;
        self.show_grid = true;
        self.animation_time = 0.0;
        self.color_cycle = 0.0;
        self.trail.clear();

        self.spark_texture = ctx
            .assets
            .create_solid_texture("showcase_spark", SPARK_SIZE, SPARK_SIZE, palette::WHITE, None);
        self.block_texture = ctx
            .assets
            .create_solid_texture("showcase_block", BLOCK_SIZE, BLOCK_SIZE, palette::WHITE, None);
        self.spawn_burst();
        self.update_burst();
        debug!("Showcase ready with {} sprites", self.sprites.len());
    }

    fn update(&mut self, ctx: &mut ScreenContext, dt: f32) {
        self.animation_time += dt;
        self.color_cycle += dt * 2.0;

        let count = TEST_NAMES.len();
        if ctx.input.any_key_pressed(&[Keycode::Up, Keycode::W]) {
            self.selected = (self.selected + count - 1) % count;
        }
        if ctx.input.any_key_pressed(&[Keycode::Down, Keycode::S]) {
            self.selected = (self.selected + 1) % count;
        }
        if ctx.input.is_key_pressed(Keycode::G) {
            self.show_grid = !self.show_grid;
        }

        self.update_burst();
        self.sprites.update(dt);
        self.update_mouse(ctx);

        debug_navigation(ctx, ScreenId::Debug1);
    }

    fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        let (width, height) = self.virtual_size;
        renderer.clear(palette::BLACK)?;
        if self.show_grid {
            for x in (0..width as i32).step_by(GRID_SPACING) {
                renderer.draw_line((x, 0), (x, height as i32), GRID_COLOR)?;
            }
            for y in (0..height as i32).step_by(GRID_SPACING) {
                renderer.draw_line((0, y), (width as i32, y), GRID_COLOR)?;
            }
        }

        match self.selected {
            0 => self.draw_gradients(renderer)?,
            1 => self.draw_shapes(renderer)?,
            2 => self.sprites.draw(renderer)?,
            3 => self.draw_text_page(renderer)?,
            _ => self.draw_mouse_page(renderer)?,
        }

        draw_text(renderer, "DEBUG TEST 3: UI & GRAPHICS", 10, 10, 3, palette::WHITE)?;
        draw_text(renderer, "UP/DOWN OR W/S: CHANGE TEST", 10, 40, 2, palette::WHITE)?;
        draw_text(renderer, "G: TOGGLE GRID", 10, 55, 2, palette::WHITE)?;
        draw_text(renderer, "TAB: NEXT TEST   ESC: BACK TO TITLE", 10, 70, 2, palette::WHITE)?;
        self.draw_footer(renderer)
    }

    fn unload(&mut self, ctx: &mut ScreenContext) {
        ctx.audio.play_music(MAIN_MUSIC, true);
        self.sprites.unload_all(ctx.assets);
        self.burst_ids.clear();
        ctx.assets.unload_texture(self.spark_texture);
        ctx.assets.unload_texture(self.block_texture);
        self.spark_texture = TextureHandle::INVALID;
        self.block_texture = TextureHandle::INVALID;
    }
}
