//! Game entities
//!
//! An `Entity` is plain data (identity, transform, size, an optional
//! sprite) plus an optional boxed `EntityBehavior` that gives it logic.
//! Entities are built by the caller and handed to the `EntityManager`,
//! which owns them from then on.
//!
//! # Rust Learning: Taking the behavior out to call it
//!
//! A behavior needs `&mut Entity` while it is itself stored inside that
//! entity. Borrowing both at once is impossible, so the manager does
//! `entity.behavior.take()`, calls the behavior with the now-unborrowed
//! entity, and puts it back. The `Option` makes the hand-off explicit.

pub mod manager;

pub use manager::{EntityManager, MAX_ENTITIES};

use crate::error::GameResult;
use crate::math::{Rectf, Vec2};
use crate::render::Renderer;
use crate::sprite::SpriteObject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Item,
    PowerUp,
    Collectible,
    Projectile,
    Misc,
}

/// Per-frame information shared with every behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityFrame {
    pub dt: f32,
    /// Point of interest for this frame (usually the player), if any
    pub focus: Option<Vec2>,
    /// Playfield in virtual pixels
    pub bounds: Rectf,
}

impl EntityFrame {
    pub fn new(dt: f32, bounds: Rectf) -> Self {
        EntityFrame {
            dt,
            focus: None,
            bounds,
        }
    }

    pub fn with_focus(mut self, focus: Vec2) -> Self {
        self.focus = Some(focus);
        self
    }
}

/// Logic attached to an entity
///
/// Every method receives the entity it belongs to. The defaults do nothing,
/// so a behavior only implements what it needs.
pub trait EntityBehavior {
    fn update(&mut self, _entity: &mut Entity, _frame: &EntityFrame) {}

    /// Extra drawing on top of the entity's sprite
    fn draw(&self, _entity: &Entity, _renderer: &mut dyn Renderer) -> GameResult<()> {
        Ok(())
    }

    /// Called once when the entity leaves the manager
    fn destroy(&mut self, _entity: &mut Entity) {}

    fn is_active(&self, entity: &Entity) -> bool {
        entity.active
    }
}

pub struct Entity {
    pub id: i32,
    pub kind: EntityKind,
    pub name: String,
    /// Centre of the entity
    pub position: Vec2,
    pub velocity: Vec2,
    /// Degrees, clockwise
    pub rotation: f32,
    pub active: bool,
    pub width: f32,
    pub height: f32,
    pub sprite: Option<SpriteObject>,
    behavior: Option<Box<dyn EntityBehavior>>,
}

impl Entity {
    pub fn new(id: i32, kind: EntityKind, name: &str, position: Vec2, size: (f32, f32)) -> Self {
        Entity {
            id,
            kind,
            name: name.to_string(),
            position,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            active: true,
            width: size.0,
            height: size.1,
            sprite: None,
            behavior: None,
        }
    }

    pub fn with_sprite(mut self, sprite: SpriteObject) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_behavior(mut self, behavior: impl EntityBehavior + 'static) -> Self {
        self.behavior = Some(Box::new(behavior));
        self
    }

    pub fn has_behavior(&self) -> bool {
        self.behavior.is_some()
    }

    /// Collision box centred on the position
    pub fn hitbox(&self) -> Rectf {
        Rectf::centered(self.position, self.width, self.height)
    }

    pub fn overlaps(&self, other: &Entity) -> bool {
        self.hitbox().overlaps(&other.hitbox())
    }

    pub fn distance_to(&self, other: &Entity) -> f32 {
        self.position.distance(other.position)
    }

    /// Whether the entity takes part in update and draw
    pub fn is_active(&self) -> bool {
        match &self.behavior {
            Some(behavior) => behavior.is_active(self),
            None => self.active,
        }
    }

    pub(crate) fn run_update(&mut self, frame: &EntityFrame) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.update(self, frame);
            self.behavior = Some(behavior);
        }
        if let Some(sprite) = &mut self.sprite {
            sprite.position = self.position;
            sprite.rotation = self.rotation;
            sprite.update(frame.dt);
        }
    }

    pub(crate) fn run_draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        if let Some(sprite) = &self.sprite {
            sprite.draw(renderer)?;
        }
        if let Some(behavior) = &self.behavior {
            behavior.draw(self, renderer)?;
        }
        Ok(())
    }

    pub(crate) fn run_destroy(&mut self) {
        if let Some(mut behavior) = self.behavior.take() {
            behavior.destroy(self);
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("active", &self.active)
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}
