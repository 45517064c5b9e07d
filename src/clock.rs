//! Frame timing
//!
//! `FrameClock` turns wall-clock instants into per-frame delta times and
//! keeps the accumulated game time, which only advances while the game is
//! not paused. Callers pass `Instant`s in explicitly so the clock can be
//! driven deterministically in tests.

use std::time::{Duration, Instant};

/// Largest delta handed to screen logic; longer stalls (window drags,
/// breakpoints) are simulated as one slow frame. The clock itself always
/// reports the real wall delta.
pub const MAX_UPDATE_DELTA: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    delta_time: f32,
    game_time: f64,
    paused: bool,

    // FPS counting over a one second window
    fps_window: f32,
    fps_frames: u32,
    current_fps: u32,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock {
            last_tick: None,
            delta_time: 0.0,
            game_time: 0.0,
            paused: false,
            fps_window: 0.0,
            fps_frames: 0,
            current_fps: 0,
        }
    }

    /// Advance the clock to `now` and return the frame delta in seconds
    ///
    /// The first tick returns 0.0. Game time accumulates only when not
    /// paused; the delta and the FPS counter advance either way.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.advance(dt)
    }

    /// Advance by an explicit delta (used by `tick` and by headless drivers)
    pub fn advance(&mut self, dt: f32) -> f32 {
        let dt = dt.max(0.0);
        self.delta_time = dt;

        if !self.paused {
            self.game_time += dt as f64;
        }

        self.fps_frames += 1;
        self.fps_window += dt;
        if self.fps_window >= 1.0 {
            self.current_fps = self.fps_frames;
            self.fps_frames = 0;
            self.fps_window -= 1.0;
        }

        dt
    }

    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// This frame's delta, capped for simulation
    pub fn update_delta(&self) -> f32 {
        self.delta_time.min(MAX_UPDATE_DELTA)
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn fps(&self) -> u32 {
        self.current_fps
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        FrameClock::new()
    }
}

/// Time left in the frame budget for `target_fps`, given how long the frame took
///
/// Returns `None` when the frame already used up its budget.
pub fn frame_budget_remaining(target_fps: u32, frame_elapsed: Duration) -> Option<Duration> {
    if target_fps == 0 {
        return None;
    }
    let budget = Duration::from_secs_f64(1.0 / target_fps as f64);
    budget.checked_sub(frame_elapsed).filter(|d| !d.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(Instant::now()), 0.0);
        assert_eq!(clock.game_time(), 0.0);
    }

    #[test]
    fn test_delta_from_wall_clock() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        let dt = clock.tick(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-4);
        assert!((clock.game_time() - 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_pause_gates_game_time_not_delta() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        clock.tick(start + Duration::from_millis(100));
        let before = clock.game_time();

        clock.set_paused(true);
        for i in 2..=5 {
            let dt = clock.tick(start + Duration::from_millis(100 * i));
            assert!((dt - 0.1).abs() < 1e-4, "delta still measured while paused");
        }
        assert_eq!(clock.game_time(), before);

        clock.set_paused(false);
        clock.tick(start + Duration::from_millis(600));
        assert!((clock.game_time() - before - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_long_stall_reports_wall_time() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick(start);
        let dt = clock.tick(start + Duration::from_secs(3));
        assert_eq!(dt, 3.0);
        assert_eq!(clock.game_time(), 3.0);
        assert_eq!(clock.update_delta(), MAX_UPDATE_DELTA);
    }

    #[test]
    fn test_fps_counter() {
        let mut clock = FrameClock::new();
        for _ in 0..10 {
            clock.advance(0.1);
        }
        // Float accumulation may land the window edge on frame 10 or 11
        clock.advance(0.1);
        assert!(clock.fps() == 10 || clock.fps() == 11);
    }

    #[test]
    fn test_frame_budget() {
        let left = frame_budget_remaining(50, Duration::from_millis(5));
        assert_eq!(left, Some(Duration::from_millis(15)));
        assert_eq!(frame_budget_remaining(50, Duration::from_millis(30)), None);
        assert_eq!(frame_budget_remaining(0, Duration::ZERO), None);
    }
}
