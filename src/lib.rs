//! starter2d: a small SDL2 2D game framework
//!
//! The core (screens, entity / sprite / animation pools, the frame handler)
//! talks to graphics, assets and audio through the `Renderer`,
//! `AssetLoader` and `AudioControl` traits, so everything above the SDL
//! layer can be driven headless in tests.

// Module declarations
pub mod assets;
pub mod audio;
pub mod clock;
pub mod config;
pub mod entity;
pub mod error;
pub mod handler;
pub mod input;
pub mod logging;
pub mod math;
pub mod pool;
pub mod render;
pub mod screen;
pub mod screens;
pub mod sprite;
pub mod text;

#[cfg(test)]
mod testing;

pub use error::{GameError, GameResult};
pub use handler::{Handler, Services};
