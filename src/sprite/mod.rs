// Sprite module - textured drawables and frame animation
//
// - object.rs: SpriteObject (transform, tint, horizontal frame strip)
// - manager.rs: SpriteManager, a bounded pool of sprites
// - animation.rs: AnimationSequence / Animator / AnimationManager

pub mod animation;
pub mod manager;
pub mod object;

pub use animation::{
    AnimationFrame, AnimationManager, AnimationSequence, Animator, SequenceKind, SheetLayout,
};
pub use manager::SpriteManager;
pub use object::{SpriteKind, SpriteObject};
