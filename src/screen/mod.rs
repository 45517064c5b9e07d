//=========================================================================
// Screen System
//=========================================================================
//
// Screens are the top-level game states (title, gameplay, debug tests).
//
// Architecture:
//   Handler
//     └─ ScreenManager
//          ├─ screens: [Option<Box<dyn Screen>>; MAX_SCREENS]
//          └─ active: Option<ScreenId>
//
// Flow:
//   Handler::update() → ScreenManager::update() → Screen::update(ctx, dt)
//   Screens queue ScreenCommands on the context; the Handler applies
//   them after the update pass.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::assets::AssetLoader;
use crate::audio::AudioControl;
use crate::error::GameResult;
use crate::input::InputState;
use crate::render::Renderer;
use serde::{Deserialize, Serialize};
use std::fmt;

//=== Module Declarations =================================================

pub mod manager;
pub mod transition;

//=== Public API ==========================================================

pub use manager::ScreenManager;
pub use transition::{TransitionEffect, TransitionKind};

/// Upper bound on registered screens
pub const MAX_SCREENS: usize = 32;

//=== Screen Ids ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScreenId {
    Init,
    Splash,
    Intro,
    Title,
    MainMenu,
    Options,
    Credits,
    Gameplay,
    PauseMenu,
    GameOver,
    LevelComplete,
    Exit,
    Debug1,
    Debug2,
    Debug3,
    Debug4,
    Debug5,
    Debug6,
    Debug7,
    Debug8,
}

impl ScreenId {
    pub const ALL: [ScreenId; 20] = [
        ScreenId::Init,
        ScreenId::Splash,
        ScreenId::Intro,
        ScreenId::Title,
        ScreenId::MainMenu,
        ScreenId::Options,
        ScreenId::Credits,
        ScreenId::Gameplay,
        ScreenId::PauseMenu,
        ScreenId::GameOver,
        ScreenId::LevelComplete,
        ScreenId::Exit,
        ScreenId::Debug1,
        ScreenId::Debug2,
        ScreenId::Debug3,
        ScreenId::Debug4,
        ScreenId::Debug5,
        ScreenId::Debug6,
        ScreenId::Debug7,
        ScreenId::Debug8,
    ];

    /// Slot in the screen registry
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Raw screen index that does not name a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidScreenId(pub u8);

impl fmt::Display for InvalidScreenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid screen index {}", self.0)
    }
}

impl std::error::Error for InvalidScreenId {}

impl TryFrom<u8> for ScreenId {
    type Error = InvalidScreenId;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ScreenId::ALL
            .get(value as usize)
            .copied()
            .ok_or(InvalidScreenId(value))
    }
}

//=== Commands and Context ================================================

/// Request queued by a screen, applied by the Handler after the update pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScreenCommand {
    /// Switch immediately
    SetScreen(ScreenId),
    /// Switch after a timed transition
    Transition { target: ScreenId, duration: f32 },
    /// Stop the main loop
    Quit,
}

/// Read-only facts about the running game, refreshed every call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenStatus {
    pub game_time: f64,
    pub current: ScreenId,
    pub transitioning: bool,
    pub paused: bool,
    pub virtual_size: (u32, u32),
    /// Configured length of a timed screen transition
    pub transition_duration: f32,
}

impl Default for ScreenStatus {
    fn default() -> Self {
        ScreenStatus {
            game_time: 0.0,
            current: ScreenId::Init,
            transitioning: false,
            paused: false,
            virtual_size: (
                crate::config::DEFAULT_VIRTUAL_WIDTH,
                crate::config::DEFAULT_VIRTUAL_HEIGHT,
            ),
            transition_duration: 1.0,
        }
    }
}

/// Everything a screen may touch while it runs
pub struct ScreenContext<'a> {
    pub input: &'a InputState,
    pub assets: &'a mut dyn AssetLoader,
    pub audio: &'a mut dyn AudioControl,
    pub status: ScreenStatus,
    commands: &'a mut Vec<ScreenCommand>,
}

impl<'a> ScreenContext<'a> {
    pub fn new(
        input: &'a InputState,
        assets: &'a mut dyn AssetLoader,
        audio: &'a mut dyn AudioControl,
        status: ScreenStatus,
        commands: &'a mut Vec<ScreenCommand>,
    ) -> Self {
        ScreenContext {
            input,
            assets,
            audio,
            status,
            commands,
        }
    }

    pub fn set_screen(&mut self, id: ScreenId) {
        self.commands.push(ScreenCommand::SetScreen(id));
    }

    pub fn request_transition(&mut self, target: ScreenId, duration: f32) {
        self.commands.push(ScreenCommand::Transition { target, duration });
    }

    pub fn quit(&mut self) {
        self.commands.push(ScreenCommand::Quit);
    }

    pub fn virtual_size(&self) -> (u32, u32) {
        self.status.virtual_size
    }
}

//=== Screen Trait ========================================================

/// A game state with a four-step lifecycle
///
/// Every method has an empty default, so a screen only overrides what it
/// uses. The manager guarantees `unload` of the previous screen runs before
/// `init` of the next one, and never calls `init` twice without an `unload`
/// in between.
///
/// ```ignore
/// struct Pause;
///
/// impl Screen for Pause {
///     fn update(&mut self, ctx: &mut ScreenContext, _dt: f32) {
///         if ctx.input.is_key_pressed(Keycode::Return) {
///             ctx.set_screen(ScreenId::Gameplay);
///         }
///     }
/// }
/// ```
pub trait Screen {
    /// Called once on activation
    fn init(&mut self, _ctx: &mut ScreenContext) {}

    /// Called every frame while active and not paused
    fn update(&mut self, _ctx: &mut ScreenContext, _dt: f32) {}

    /// Draw into the virtual target
    fn draw(&self, _renderer: &mut dyn Renderer) -> GameResult<()> {
        Ok(())
    }

    /// Called once on deactivation
    fn unload(&mut self, _ctx: &mut ScreenContext) {}
}
