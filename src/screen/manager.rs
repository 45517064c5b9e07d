//=========================================================================
// Screen Manager
//=========================================================================
//
// Registry of screens indexed by ScreenId plus the single active slot.
//
// Switching always runs the outgoing screen's `unload` before the
// incoming screen's `init`. Switching to the screen that is already
// active restarts it (unload + init).
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{MAX_SCREENS, Screen, ScreenContext, ScreenId};
use crate::error::GameResult;
use crate::render::Renderer;
use log::{debug, info, warn};

//=== Screen Manager ======================================================

pub struct ScreenManager {
    screens: Vec<Option<Box<dyn Screen>>>,
    active: Option<ScreenId>,
    initialized: bool,
}

impl ScreenManager {
    pub fn new() -> Self {
        let mut screens = Vec::with_capacity(MAX_SCREENS);
        screens.resize_with(MAX_SCREENS, || None);
        ScreenManager {
            screens,
            active: None,
            initialized: true,
        }
    }

    /// Register a screen; an existing registration for `id` is replaced
    pub fn register(&mut self, id: ScreenId, screen: Box<dyn Screen>) {
        let slot = &mut self.screens[id.index()];
        if slot.is_some() {
            warn!("Replacing registered screen {}", id);
        } else {
            debug!("Registered screen {}", id);
        }
        *slot = Some(screen);
        self.initialized = true;
    }

    /// Register by raw index; out-of-range indices are rejected
    pub fn register_index(&mut self, index: u8, screen: Box<dyn Screen>) -> bool {
        match ScreenId::try_from(index) {
            Ok(id) => {
                self.register(id, screen);
                true
            }
            Err(e) => {
                warn!("Cannot register screen: {}", e);
                false
            }
        }
    }

    pub fn is_registered(&self, id: ScreenId) -> bool {
        self.screens[id.index()].is_some()
    }

    pub fn current(&self) -> Option<ScreenId> {
        self.active
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Unload the active screen (if any), then init `target`
    pub fn set_current_screen(&mut self, target: ScreenId, ctx: &mut ScreenContext) {
        if let Some(previous) = self.active.take() {
            if let Some(screen) = self.screens[previous.index()].as_mut() {
                debug!("Unloading screen {}", previous);
                screen.unload(ctx);
            }
        }

        self.active = Some(target);
        ctx.status.current = target;
        match self.screens[target.index()].as_mut() {
            Some(screen) => {
                info!("Switching to screen {}", target);
                screen.init(ctx);
            }
            None => warn!("Screen {} is active but not registered", target),
        }
    }

    pub fn update(&mut self, ctx: &mut ScreenContext, dt: f32) {
        if let Some(screen) = self.active_screen_mut() {
            screen.update(ctx, dt);
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        match self.active.and_then(|id| self.screens[id.index()].as_ref()) {
            Some(screen) => screen.draw(renderer),
            None => Ok(()),
        }
    }

    /// Unload the active screen and return to the pre-init state
    pub fn shutdown(&mut self, ctx: &mut ScreenContext) {
        if let Some(previous) = self.active.take() {
            if let Some(screen) = self.screens[previous.index()].as_mut() {
                debug!("Unloading screen {} on shutdown", previous);
                screen.unload(ctx);
            }
        }
        self.initialized = false;
    }

    fn active_screen_mut(&mut self) -> Option<&mut Box<dyn Screen>> {
        let id = self.active?;
        self.screens[id.index()].as_mut()
    }
}

impl Default for ScreenManager {
    fn default() -> Self {
        ScreenManager::new()
    }
}
