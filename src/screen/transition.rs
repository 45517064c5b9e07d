//! Visual overlay drawn while the Handler waits to commit a screen switch.

use crate::error::GameResult;
use crate::render::{Renderer, palette};
use sdl2::pixels::Color;
use sdl2::rect::Rect;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionKind {
    #[default]
    Fade,
    Slide,
    Wipe,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEffect {
    kind: TransitionKind,
    color: Color,
    duration: f32,
    elapsed: f32,
    active: bool,
}

impl TransitionEffect {
    pub fn new() -> Self {
        TransitionEffect {
            kind: TransitionKind::Fade,
            color: palette::BLACK,
            duration: 0.0,
            elapsed: 0.0,
            active: false,
        }
    }

    /// Restart the effect; a running effect is replaced
    pub fn start(&mut self, kind: TransitionKind, duration: f32) {
        self.kind = kind;
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.active = false;
        }
    }

    /// 0 at the start, 1 when done
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        if !self.active {
            return Ok(());
        }
        let (width, height) = renderer.size();
        let progress = self.progress();

        match self.kind {
            TransitionKind::Fade => {
                let alpha = (progress * 255.0) as u8;
                renderer.fill_rect(Rect::new(0, 0, width, height), palette::fade(self.color, alpha))
            }
            TransitionKind::Slide => {
                let offset = (width as f32 * progress) as i32;
                renderer.fill_rect(Rect::new(offset - width as i32, 0, width, height), self.color)
            }
            TransitionKind::Wipe => {
                let wipe = (width as f32 * progress) as u32;
                if wipe == 0 {
                    return Ok(());
                }
                renderer.fill_rect(Rect::new(0, 0, wipe, height), self.color)
            }
            TransitionKind::Cut => renderer.fill_rect(Rect::new(0, 0, width, height), self.color),
        }
    }
}

impl Default for TransitionEffect {
    fn default() -> Self {
        TransitionEffect::new()
    }
}
