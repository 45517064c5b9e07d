//=========================================================================
// Handler
//=========================================================================
//
// Top-level orchestrator owned by `main`.
//
// Per frame:
//   update(now)  → clock tick → transition timer → global keys
//                → ScreenManager::update (unless paused) → screen commands
//   draw_virtual → clear, active screen, transition overlay (virtual space)
//   draw_overlay → FPS and debug panel (window space, after the blit)
//
// Invariant: while `transitioning` is set, `pending != current`. The
// switch commits in the same tick the timer reaches the duration.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::assets::AssetLoader;
use crate::audio::AudioControl;
use crate::clock::FrameClock;
use crate::config::Settings;
use crate::error::GameResult;
use crate::input::InputState;
use crate::render::{Renderer, palette};
use crate::screen::{
    ScreenCommand, ScreenContext, ScreenId, ScreenManager, ScreenStatus, TransitionEffect,
    TransitionKind,
};
use crate::text::draw_text;
use log::{debug, info, warn};
use sdl2::keyboard::Keycode;
use sdl2::rect::Rect;
use std::time::Instant;

/// Slack for float accumulation when comparing the transition timer
const TRANSITION_EPSILON: f32 = 1e-4;

/// Rounds of screen commands applied per frame; commands queued by screens
/// initialised in the last round are dropped.
const MAX_COMMAND_ROUNDS: usize = 4;

//=== Services ============================================================

/// The collaborators a frame needs, lent to the Handler for one call
pub struct Services<'a> {
    pub input: &'a InputState,
    pub assets: &'a mut dyn AssetLoader,
    pub audio: &'a mut dyn AudioControl,
}

//=== Handler =============================================================

pub struct Handler {
    screens: ScreenManager,
    clock: FrameClock,
    commands: Vec<ScreenCommand>,

    current: ScreenId,
    pending: ScreenId,
    started: bool,
    running: bool,

    transitioning: bool,
    transition_elapsed: f32,
    transition_duration: f32,
    default_transition_duration: f32,
    transition_kind: TransitionKind,
    effect: TransitionEffect,

    debug_mode: bool,
    show_debug_info: bool,
    show_fps: bool,
    virtual_size: (u32, u32),
}

impl Handler {
    pub fn new(settings: &Settings, screens: ScreenManager) -> Self {
        Handler {
            screens,
            clock: FrameClock::new(),
            commands: Vec::new(),
            current: settings.initial_screen,
            pending: settings.initial_screen,
            started: false,
            running: true,
            transitioning: false,
            transition_elapsed: 0.0,
            transition_duration: settings.transition_duration,
            default_transition_duration: settings.transition_duration,
            transition_kind: settings.transition,
            effect: TransitionEffect::new(),
            debug_mode: settings.debug_mode,
            show_debug_info: settings.debug_mode,
            show_fps: settings.show_fps,
            virtual_size: settings.virtual_size(),
        }
    }

    //=== Lifecycle =======================================================

    /// Initialise the starting screen; later calls do nothing
    pub fn start(&mut self, services: &mut Services) {
        if self.started {
            return;
        }
        self.started = true;
        info!("Starting on screen {}", self.current);

        let status = self.status();
        let mut ctx = ScreenContext::new(
            services.input,
            &mut *services.assets,
            &mut *services.audio,
            status,
            &mut self.commands,
        );
        self.screens.set_current_screen(self.current, &mut ctx);
        self.apply_commands(services);
    }

    /// Advance one frame using the wall clock
    pub fn update(&mut self, now: Instant, services: &mut Services) {
        self.tick(now);
        self.update_frame(services);
    }

    /// Measure this frame's delta; follow with `update_frame`
    pub fn tick(&mut self, now: Instant) -> f32 {
        self.clock.tick(now)
    }

    /// Advance one frame by an explicit delta
    pub fn step(&mut self, dt: f32, services: &mut Services) {
        self.clock.advance(dt);
        self.update_frame(services);
    }

    /// Run the frame measured by the last `tick`
    pub fn update_frame(&mut self, services: &mut Services) {
        let dt = self.clock.delta_time();
        if !self.started {
            self.start(services);
        }

        if self.transitioning {
            self.transition_elapsed += dt;
            self.effect.update(dt);
            if self.transition_elapsed + TRANSITION_EPSILON >= self.transition_duration {
                let target = self.pending;
                self.transitioning = false;
                self.effect.stop();
                debug!("Transition to {} complete", target);
                self.set_screen(target, services);
            }
        }

        self.handle_global_keys(services.input);

        if !self.clock.is_paused() {
            let status = self.status();
            let mut ctx = ScreenContext::new(
                services.input,
                &mut *services.assets,
                &mut *services.audio,
                status,
                &mut self.commands,
            );
            self.screens.update(&mut ctx, self.clock.update_delta());
        }

        self.apply_commands(services);
    }

    /// Unload the active screen; safe to call more than once
    pub fn shutdown(&mut self, services: &mut Services) {
        let status = self.status();
        let mut ctx = ScreenContext::new(
            services.input,
            &mut *services.assets,
            &mut *services.audio,
            status,
            &mut self.commands,
        );
        self.screens.shutdown(&mut ctx);
        self.commands.clear();
        self.transitioning = false;
        self.effect.stop();
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn quit(&mut self) {
        if self.running {
            info!("Quit requested");
        }
        self.running = false;
    }

    //=== Screen switching ================================================

    /// Switch immediately; switching to the current screen does nothing
    pub fn set_screen(&mut self, id: ScreenId, services: &mut Services) {
        if id == self.current && self.started {
            debug!("Already on screen {}", id);
            return;
        }
        self.current = id;
        self.pending = id;
        self.transitioning = false;
        self.effect.stop();

        let status = self.status();
        let mut ctx = ScreenContext::new(
            services.input,
            &mut *services.assets,
            &mut *services.audio,
            status,
            &mut self.commands,
        );
        self.screens.set_current_screen(id, &mut ctx);
        self.started = true;
    }

    /// Arm a timed switch to `id`; a newer request replaces an older one
    ///
    /// Returns false (with a warning) when `id` is already the current screen.
    pub fn request_screen_transition(&mut self, id: ScreenId, duration: f32) -> bool {
        if id == self.current {
            warn!("Ignoring transition to the current screen {}", id);
            return false;
        }
        if self.transitioning {
            debug!("Transition target {} replaced by {}", self.pending, id);
        }
        self.pending = id;
        self.transition_duration = duration;
        self.transition_elapsed = 0.0;
        self.transitioning = true;
        self.effect.start(self.transition_kind, duration);
        true
    }

    /// Timed switch using the configured duration
    pub fn request_default_transition(&mut self, id: ScreenId) -> bool {
        self.request_screen_transition(id, self.default_transition_duration)
    }

    pub fn is_screen_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn current_screen(&self) -> ScreenId {
        self.current
    }

    pub fn pending_screen(&self) -> ScreenId {
        self.pending
    }

    pub fn transition_elapsed(&self) -> f32 {
        self.transition_elapsed
    }

    pub fn set_transition_kind(&mut self, kind: TransitionKind) {
        self.transition_kind = kind;
    }

    fn apply_commands(&mut self, services: &mut Services) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for command in std::mem::take(&mut self.commands) {
                match command {
                    ScreenCommand::SetScreen(id) => self.set_screen(id, services),
                    ScreenCommand::Transition { target, duration } => {
                        self.request_screen_transition(target, duration);
                    }
                    ScreenCommand::Quit => self.quit(),
                }
            }
        }
        if !self.commands.is_empty() {
            warn!(
                "Dropping {} screen commands after {} rounds",
                self.commands.len(),
                MAX_COMMAND_ROUNDS
            );
            self.commands.clear();
        }
    }

    //=== Global controls =================================================

    fn handle_global_keys(&mut self, input: &InputState) {
        if input.quit_requested() {
            self.quit();
        }
        if input.is_key_pressed(Keycode::F1) {
            self.toggle_debug_mode();
        }
        if input.is_key_pressed(Keycode::F2) {
            self.show_fps = !self.show_fps;
        }
        if input.is_key_pressed(Keycode::F3) {
            self.show_debug_info = !self.show_debug_info;
        }
        if input.any_key_pressed(&[Keycode::P, Keycode::Pause]) {
            let paused = self.clock.toggle_pause();
            info!("Game {}", if paused { "paused" } else { "resumed" });
        }
        if input.is_key_pressed(Keycode::Escape) && self.current == ScreenId::Title {
            self.quit();
        }
    }

    /// Flip debug mode; the debug panel follows it
    pub fn toggle_debug_mode(&mut self) {
        self.debug_mode = !self.debug_mode;
        self.show_debug_info = self.debug_mode;
        debug!("Debug mode {}", if self.debug_mode { "on" } else { "off" });
    }

    pub fn is_debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn is_debug_info_visible(&self) -> bool {
        self.show_debug_info
    }

    pub fn is_fps_visible(&self) -> bool {
        self.show_fps
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    pub fn game_time(&self) -> f64 {
        self.clock.game_time()
    }

    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    pub fn status(&self) -> ScreenStatus {
        ScreenStatus {
            game_time: self.clock.game_time(),
            current: self.current,
            transitioning: self.transitioning,
            paused: self.clock.is_paused(),
            virtual_size: self.virtual_size,
            transition_duration: self.default_transition_duration,
        }
    }

    //=== Drawing =========================================================

    /// Everything drawn at virtual resolution
    pub fn draw_virtual(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        renderer.clear(palette::BLACK)?;
        self.screens.draw(renderer)?;
        self.effect.draw(renderer)
    }

    /// FPS counter and debug panel, drawn unscaled on top of the window
    pub fn draw_overlay(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        if self.show_fps {
            draw_text(renderer, &format!("FPS: {}", self.fps()), 10, 10, 2, palette::GREEN)?;
        }
        if self.show_debug_info {
            self.draw_debug_info(renderer)?;
        }
        Ok(())
    }

    fn draw_debug_info(&self, renderer: &mut dyn Renderer) -> GameResult<()> {
        const LINE: i32 = 15;
        let mut lines = vec![
            format!("SCREEN: {}", self.current),
            format!("GAME TIME: {:.2}", self.game_time()),
            format!("DELTA TIME: {:.4}", self.delta_time()),
            format!("PAUSED: {}", if self.is_paused() { "YES" } else { "NO" }),
            format!("TRANSITION: {}", if self.transitioning { "YES" } else { "NO" }),
        ];
        if self.transitioning {
            lines.push(format!(
                "TRANSITION TIMER: {:.2}/{:.2}",
                self.transition_elapsed, self.transition_duration
            ));
        }
        let controls = [
            "F1 - TOGGLE DEBUG MODE",
            "F2 - TOGGLE FPS DISPLAY",
            "F3 - TOGGLE DEBUG INFO",
            "P - TOGGLE PAUSE",
        ];

        let rows = 2 + lines.len() + 1 + 1 + controls.len();
        renderer.fill_rect(
            Rect::new(5, 45, 260, rows as u32 * LINE as u32 + 10),
            palette::fade(palette::BLACK, 160),
        )?;

        let mut y = 50;
        draw_text(renderer, "=== DEBUG INFO ===", 10, y, 1, palette::YELLOW)?;
        y += LINE * 2;
        for line in &lines {
            draw_text(renderer, line, 10, y, 1, palette::WHITE)?;
            y += LINE;
        }
        y += LINE;
        draw_text(renderer, "CONTROLS:", 10, y, 1, palette::YELLOW)?;
        y += LINE;
        for line in controls {
            draw_text(renderer, line, 10, y, 1, palette::LIGHT_GRAY)?;
            y += LINE;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{DrawCall, LifecycleScreen, RecordingRenderer, TestServices};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    type Log = Rc<RefCell<Vec<String>>>;

    fn settings(initial: ScreenId) -> Settings {
        Settings {
            initial_screen: initial,
            ..Settings::default()
        }
    }

    fn handler(initial: ScreenId, log: &Log) -> Handler {
        let mut screens = ScreenManager::new();
        screens.register(ScreenId::Title, Box::new(LifecycleScreen::new("title", log)));
        screens.register(ScreenId::Debug1, Box::new(LifecycleScreen::new("debug1", log)));
        screens.register(ScreenId::Debug2, Box::new(LifecycleScreen::new("debug2", log)));
        Handler::new(&settings(initial), screens)
    }

    fn started(initial: ScreenId, log: &Log, services: &mut TestServices) -> Handler {
        let mut handler = handler(initial, log);
        handler.start(&mut services.services());
        log.borrow_mut().clear();
        handler
    }

    /// Release everything, then press `key` for the next frame
    fn tap(services: &mut TestServices, key: Keycode) {
        services.input.begin_frame();
        services.input.release_key(key);
        services.input.begin_frame();
        services.input.press_key(key);
    }

    #[test]
    fn test_start_inits_initial_screen_once() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = handler(ScreenId::Title, &log);

        handler.start(&mut services.services());
        handler.start(&mut services.services());
        assert_eq!(*log.borrow(), vec!["init title"]);
    }

    #[test]
    fn test_transition_commits_when_timer_reaches_duration() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        assert!(handler.request_screen_transition(ScreenId::Debug1, 1.0));
        for _ in 0..3 {
            handler.step(0.25, &mut services.services());
        }
        assert!(handler.is_screen_transitioning());
        assert_eq!(handler.current_screen(), ScreenId::Title);

        handler.step(0.25, &mut services.services());
        assert!(!handler.is_screen_transitioning());
        assert_eq!(handler.current_screen(), ScreenId::Debug1);
        assert!(log.borrow().contains(&"unload title".to_string()));
        assert!(log.borrow().contains(&"init debug1".to_string()));
    }

    #[test]
    fn test_transition_commits_after_one_long_frame() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);
        let start = Instant::now();
        handler.update(start, &mut services.services());

        handler.request_screen_transition(ScreenId::Debug1, 1.0);
        handler.update(start + Duration::from_secs(1), &mut services.services());
        assert_eq!(handler.delta_time(), 1.0);
        assert_eq!(handler.current_screen(), ScreenId::Debug1);
        assert!(!handler.is_screen_transitioning());
        assert!((handler.game_time() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transition_commits_after_sixty_small_frames() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.request_screen_transition(ScreenId::Debug1, 1.0);
        for _ in 0..59 {
            handler.step(1.0 / 60.0, &mut services.services());
        }
        assert_eq!(handler.current_screen(), ScreenId::Title);
        handler.step(1.0 / 60.0, &mut services.services());
        assert_eq!(handler.current_screen(), ScreenId::Debug1);
    }

    #[test]
    fn test_tick_measures_the_frame_update_runs() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);
        let start = Instant::now();
        handler.tick(start);
        handler.update_frame(&mut services.services());

        let dt = handler.tick(start + Duration::from_millis(50));
        assert!((dt - 0.05).abs() < 1e-4);
        assert_eq!(handler.delta_time(), dt, "available before the screens update");
        handler.update_frame(&mut services.services());
        assert!((handler.game_time() - 0.05).abs() < 1e-4);
    }

    #[test]
    fn test_transition_not_committed_before_duration() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.request_screen_transition(ScreenId::Debug1, 1.0);
        for dt in [0.25, 0.25, 0.25, 0.249] {
            handler.step(dt, &mut services.services());
        }
        assert!(handler.is_screen_transitioning());
        assert_eq!(handler.current_screen(), ScreenId::Title);
        assert_eq!(handler.pending_screen(), ScreenId::Debug1);
    }

    #[test]
    fn test_transition_to_current_screen_is_rejected() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        assert!(!handler.request_screen_transition(ScreenId::Title, 1.0));
        assert!(!handler.is_screen_transitioning());
    }

    #[test]
    fn test_newer_transition_request_wins() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.request_screen_transition(ScreenId::Debug1, 1.0);
        handler.step(0.25, &mut services.services());
        handler.request_screen_transition(ScreenId::Debug2, 0.5);
        handler.step(0.25, &mut services.services());
        handler.step(0.25, &mut services.services());
        assert_eq!(handler.current_screen(), ScreenId::Debug2);
    }

    #[test]
    fn test_zero_duration_commits_next_update() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.request_screen_transition(ScreenId::Debug1, 0.0);
        handler.step(0.0, &mut services.services());
        assert_eq!(handler.current_screen(), ScreenId::Debug1);
    }

    #[test]
    fn test_set_screen_to_current_is_noop() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.set_screen(ScreenId::Title, &mut services.services());
        assert!(log.borrow().is_empty());

        handler.set_screen(ScreenId::Debug2, &mut services.services());
        assert_eq!(*log.borrow(), vec!["unload title", "init debug2"]);
    }

    #[test]
    fn test_pause_gates_game_time_and_screen_update() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.step(0.1, &mut services.services());
        assert!((handler.game_time() - 0.1).abs() < 1e-6);

        handler.set_paused(true);
        handler.request_screen_transition(ScreenId::Debug1, 0.2);
        handler.step(0.1, &mut services.services());
        assert!((handler.game_time() - 0.1).abs() < 1e-6);
        assert!((handler.delta_time() - 0.1).abs() < 1e-6, "wall time still flows");
        assert_eq!(log.borrow().iter().filter(|e| e.starts_with("update")).count(), 1);

        handler.step(0.1, &mut services.services());
        assert_eq!(handler.current_screen(), ScreenId::Debug1, "transitions run while paused");
    }

    #[test]
    fn test_debug_keys() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Debug1, &log, &mut services);
        assert!(!handler.is_debug_mode());

        tap(&mut services, Keycode::F1);
        handler.step(0.016, &mut services.services());
        assert!(handler.is_debug_mode());
        assert!(handler.is_debug_info_visible());

        tap(&mut services, Keycode::F3);
        handler.step(0.016, &mut services.services());
        assert!(!handler.is_debug_info_visible());
        assert!(handler.is_debug_mode());

        tap(&mut services, Keycode::F2);
        handler.step(0.016, &mut services.services());
        assert!(handler.is_fps_visible());

        tap(&mut services, Keycode::F1);
        handler.step(0.016, &mut services.services());
        assert!(!handler.is_debug_mode());
        assert!(!handler.is_debug_info_visible());

        tap(&mut services, Keycode::P);
        handler.step(0.016, &mut services.services());
        assert!(handler.is_paused());
    }

    #[test]
    fn test_escape_quits_only_on_title() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Debug1, &log, &mut services);

        tap(&mut services, Keycode::Escape);
        handler.step(0.016, &mut services.services());
        assert!(handler.is_running());

        handler.set_screen(ScreenId::Title, &mut services.services());
        tap(&mut services, Keycode::Escape);
        handler.step(0.016, &mut services.services());
        assert!(!handler.is_running());
    }

    #[test]
    fn test_screen_commands_are_applied_after_update() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut screens = ScreenManager::new();
        screens.register(
            ScreenId::Title,
            Box::new(LifecycleScreen::new("title", &log).on_update(ScreenCommand::SetScreen(ScreenId::Debug1))),
        );
        screens.register(
            ScreenId::Debug1,
            Box::new(LifecycleScreen::new("debug1", &log).on_update(ScreenCommand::Quit)),
        );
        let mut handler = Handler::new(&settings(ScreenId::Title), screens);

        handler.step(0.016, &mut services.services());
        assert_eq!(
            *log.borrow(),
            vec!["init title", "update title", "unload title", "init debug1"]
        );
        assert!(handler.is_running());

        handler.step(0.016, &mut services.services());
        assert!(!handler.is_running());
    }

    #[test]
    fn test_command_ping_pong_is_bounded() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut screens = ScreenManager::new();
        screens.register(
            ScreenId::Debug1,
            Box::new(LifecycleScreen::new("a", &log).on_init(ScreenCommand::SetScreen(ScreenId::Debug2))),
        );
        screens.register(
            ScreenId::Debug2,
            Box::new(LifecycleScreen::new("b", &log).on_init(ScreenCommand::SetScreen(ScreenId::Debug1))),
        );
        let mut handler = Handler::new(&settings(ScreenId::Debug1), screens);

        handler.start(&mut services.services());
        let inits = log.borrow().iter().filter(|e| e.starts_with("init")).count();
        assert_eq!(inits, 1 + MAX_COMMAND_ROUNDS);
        assert_eq!(handler.current_screen(), ScreenId::Debug1);
    }

    #[test]
    fn test_shutdown_twice() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);

        handler.shutdown(&mut services.services());
        handler.shutdown(&mut services.services());
        assert_eq!(*log.borrow(), vec!["unload title"]);
        assert!(!handler.is_running());
    }

    #[test]
    fn test_draw_virtual_and_overlay() {
        let log = Log::default();
        let mut services = TestServices::new();
        let mut handler = started(ScreenId::Title, &log, &mut services);
        let mut renderer = RecordingRenderer::new(1280, 720);

        handler.draw_virtual(&mut renderer).unwrap();
        assert_eq!(renderer.calls.first(), Some(&DrawCall::Clear(palette::BLACK)));
        assert_eq!(*log.borrow(), vec!["draw title"]);

        let mut overlay = RecordingRenderer::new(1280, 720);
        handler.draw_overlay(&mut overlay).unwrap();
        assert!(overlay.calls.is_empty(), "nothing to show by default");

        handler.toggle_debug_mode();
        handler.draw_overlay(&mut overlay).unwrap();
        assert!(!overlay.calls.is_empty());
    }
}
