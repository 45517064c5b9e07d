//! Input state
//!
//! `InputState` is a per-frame snapshot built from SDL events. Screens only
//! ever query it ("is down", "was pressed this frame", "was released this
//! frame"); they never see raw events.
//!
//! # Frame protocol
//!
//! 1. `begin_frame()` copies the current state into the previous-frame state
//! 2. `handle_event()` for every polled SDL event
//! 3. `update_unified(dt)` rebuilds the unified input mask and hold timers
//!
//! "Pressed" means down now but not last frame; "released" the opposite.
//!
//! # Unified input
//!
//! Keyboard and controller are folded into one `InputBit` mask so screens
//! can ask "is Jump pressed" without caring about the device.

use sdl2::controller::{Axis, Button};
use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use std::collections::HashSet;

/// Stick and trigger travel below this is ignored
pub const AXIS_DEADZONE: f32 = 0.4;

const INPUT_BIT_COUNT: usize = 13;

/// Device-independent buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBit {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    Rb,
    Lb,
    Rt,
    Lt,
    Start,
}

impl InputBit {
    pub const ALL: [InputBit; INPUT_BIT_COUNT] = [
        InputBit::Up,
        InputBit::Down,
        InputBit::Left,
        InputBit::Right,
        InputBit::A,
        InputBit::B,
        InputBit::X,
        InputBit::Y,
        InputBit::Rb,
        InputBit::Lb,
        InputBit::Rt,
        InputBit::Lt,
        InputBit::Start,
    ];

    pub fn mask(self) -> u16 {
        1 << (self as u16)
    }

    fn keys(self) -> &'static [Keycode] {
        match self {
            InputBit::Up => &[Keycode::Up, Keycode::W],
            InputBit::Down => &[Keycode::Down, Keycode::S],
            InputBit::Left => &[Keycode::Left, Keycode::A],
            InputBit::Right => &[Keycode::Right, Keycode::D],
            InputBit::A => &[Keycode::Z, Keycode::Space],
            InputBit::B => &[Keycode::X, Keycode::Escape],
            InputBit::X => &[Keycode::C],
            InputBit::Y => &[Keycode::V],
            InputBit::Rb => &[Keycode::RShift],
            InputBit::Lb => &[Keycode::LShift],
            InputBit::Rt => &[Keycode::E],
            InputBit::Lt => &[Keycode::Q],
            InputBit::Start => &[Keycode::Return],
        }
    }

    fn button(self) -> Option<Button> {
        match self {
            InputBit::Up => Some(Button::DPadUp),
            InputBit::Down => Some(Button::DPadDown),
            InputBit::Left => Some(Button::DPadLeft),
            InputBit::Right => Some(Button::DPadRight),
            InputBit::A => Some(Button::A),
            InputBit::B => Some(Button::B),
            InputBit::X => Some(Button::X),
            InputBit::Y => Some(Button::Y),
            InputBit::Rb => Some(Button::RightShoulder),
            InputBit::Lb => Some(Button::LeftShoulder),
            InputBit::Start => Some(Button::Start),
            // Triggers are analog on SDL game controllers
            InputBit::Rt | InputBit::Lt => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AxisState {
    left_x: f32,
    left_y: f32,
    trigger_left: f32,
    trigger_right: f32,
}

#[derive(Debug, Clone)]
pub struct InputState {
    keys: HashSet<Keycode>,
    prev_keys: HashSet<Keycode>,

    mouse_position: (i32, i32),
    mouse_buttons: HashSet<MouseButton>,
    prev_mouse_buttons: HashSet<MouseButton>,
    mouse_wheel: i32,

    buttons: HashSet<Button>,
    prev_buttons: HashSet<Button>,
    axes: AxisState,

    unified: u16,
    prev_unified: u16,
    hold_times: [f32; INPUT_BIT_COUNT],

    window_size: (u32, u32),
    quit_requested: bool,
}

impl InputState {
    pub fn new(window_size: (u32, u32)) -> Self {
        InputState {
            keys: HashSet::new(),
            prev_keys: HashSet::new(),
            mouse_position: (0, 0),
            mouse_buttons: HashSet::new(),
            prev_mouse_buttons: HashSet::new(),
            mouse_wheel: 0,
            buttons: HashSet::new(),
            prev_buttons: HashSet::new(),
            axes: AxisState::default(),
            unified: 0,
            prev_unified: 0,
            hold_times: [0.0; INPUT_BIT_COUNT],
            window_size,
            quit_requested: false,
        }
    }

    /// Start a new frame: current state becomes the previous state
    pub fn begin_frame(&mut self) {
        self.prev_keys.clone_from(&self.keys);
        self.prev_mouse_buttons.clone_from(&self.mouse_buttons);
        self.prev_buttons.clone_from(&self.buttons);
        self.prev_unified = self.unified;
        self.mouse_wheel = 0;
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Quit { .. } => self.quit_requested = true,
            Event::KeyDown {
                keycode: Some(key), ..
            } => self.press_key(*key),
            Event::KeyUp {
                keycode: Some(key), ..
            } => self.release_key(*key),
            Event::MouseMotion { x, y, .. } => self.set_mouse_position(*x, *y),
            Event::MouseButtonDown { mouse_btn, x, y, .. } => {
                self.mouse_position = (*x, *y);
                self.mouse_buttons.insert(*mouse_btn);
            }
            Event::MouseButtonUp { mouse_btn, x, y, .. } => {
                self.mouse_position = (*x, *y);
                self.mouse_buttons.remove(mouse_btn);
            }
            Event::MouseWheel { y, .. } => self.mouse_wheel += *y,
            Event::ControllerButtonDown { button, .. } => {
                self.buttons.insert(*button);
            }
            Event::ControllerButtonUp { button, .. } => {
                self.buttons.remove(button);
            }
            Event::ControllerAxisMotion { axis, value, .. } => {
                self.set_axis(*axis, *value as f32 / i16::MAX as f32);
            }
            Event::Window {
                win_event: WindowEvent::SizeChanged(w, h),
                ..
            } => {
                self.window_size = ((*w).max(1) as u32, (*h).max(1) as u32);
            }
            _ => {}
        }
    }

    pub fn press_key(&mut self, key: Keycode) {
        self.keys.insert(key);
    }

    pub fn release_key(&mut self, key: Keycode) {
        self.keys.remove(&key);
    }

    pub fn press_mouse(&mut self, button: MouseButton) {
        self.mouse_buttons.insert(button);
    }

    pub fn release_mouse(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
    }

    pub fn set_mouse_position(&mut self, x: i32, y: i32) {
        self.mouse_position = (x, y);
    }

    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        let value = value.clamp(-1.0, 1.0);
        match axis {
            Axis::LeftX => self.axes.left_x = value,
            Axis::LeftY => self.axes.left_y = value,
            Axis::TriggerLeft => self.axes.trigger_left = value,
            Axis::TriggerRight => self.axes.trigger_right = value,
            _ => {}
        }
    }

    /// Rebuild the unified mask and advance hold timers
    pub fn update_unified(&mut self, dt: f32) {
        let mut mask = 0u16;
        for bit in InputBit::ALL {
            let key_down = bit.keys().iter().any(|k| self.keys.contains(k));
            let button_down = bit.button().is_some_and(|b| self.buttons.contains(&b));
            if key_down || button_down {
                mask |= bit.mask();
            }
        }

        let axes = self.axes;
        if axes.left_x < -AXIS_DEADZONE {
            mask |= InputBit::Left.mask();
        }
        if axes.left_x > AXIS_DEADZONE {
            mask |= InputBit::Right.mask();
        }
        if axes.left_y < -AXIS_DEADZONE {
            mask |= InputBit::Up.mask();
        }
        if axes.left_y > AXIS_DEADZONE {
            mask |= InputBit::Down.mask();
        }
        if axes.trigger_left > AXIS_DEADZONE {
            mask |= InputBit::Lt.mask();
        }
        if axes.trigger_right > AXIS_DEADZONE {
            mask |= InputBit::Rt.mask();
        }

        self.unified = mask;
        for (i, bit) in InputBit::ALL.iter().enumerate() {
            if mask & bit.mask() != 0 {
                self.hold_times[i] += dt;
            } else {
                self.hold_times[i] = 0.0;
            }
        }
    }

    //=========================================================================
    // Keyboard
    //=========================================================================

    pub fn is_key_down(&self, key: Keycode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_key_pressed(&self, key: Keycode) -> bool {
        self.keys.contains(&key) && !self.prev_keys.contains(&key)
    }

    pub fn is_key_released(&self, key: Keycode) -> bool {
        !self.keys.contains(&key) && self.prev_keys.contains(&key)
    }

    /// True if any of `keys` was pressed this frame
    pub fn any_key_pressed(&self, keys: &[Keycode]) -> bool {
        keys.iter().any(|k| self.is_key_pressed(*k))
    }

    //=========================================================================
    // Mouse
    //=========================================================================

    /// Mouse position in window pixels
    pub fn mouse_position(&self) -> (i32, i32) {
        self.mouse_position
    }

    /// Mouse position mapped into the virtual screen
    pub fn mouse_virtual(&self, virtual_size: (u32, u32)) -> (f32, f32) {
        let (mx, my) = self.mouse_position;
        let (ww, wh) = self.window_size;
        (
            mx as f32 * virtual_size.0 as f32 / ww.max(1) as f32,
            my as f32 * virtual_size.1 as f32 / wh.max(1) as f32,
        )
    }

    pub fn is_mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button) && !self.prev_mouse_buttons.contains(&button)
    }

    pub fn mouse_wheel(&self) -> i32 {
        self.mouse_wheel
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    //=========================================================================
    // Unified
    //=========================================================================

    pub fn is_down(&self, bit: InputBit) -> bool {
        self.unified & bit.mask() != 0
    }

    pub fn is_pressed(&self, bit: InputBit) -> bool {
        self.unified & !self.prev_unified & bit.mask() != 0
    }

    pub fn is_released(&self, bit: InputBit) -> bool {
        !self.unified & self.prev_unified & bit.mask() != 0
    }

    /// Seconds `bit` has been held continuously
    pub fn hold_time(&self, bit: InputBit) -> f32 {
        self.hold_times[bit as usize]
    }

    pub fn left_stick(&self) -> (f32, f32) {
        let dz = |v: f32| if v.abs() < AXIS_DEADZONE { 0.0 } else { v };
        (dz(self.axes.left_x), dz(self.axes.left_y))
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_edges() {
        let mut input = InputState::new((1280, 720));
        input.begin_frame();
        input.press_key(Keycode::Space);
        assert!(input.is_key_pressed(Keycode::Space));
        assert!(input.is_key_down(Keycode::Space));

        input.begin_frame();
        assert!(!input.is_key_pressed(Keycode::Space), "pressed lasts one frame");
        assert!(input.is_key_down(Keycode::Space));

        input.begin_frame();
        input.release_key(Keycode::Space);
        assert!(input.is_key_released(Keycode::Space));
        input.begin_frame();
        assert!(!input.is_key_released(Keycode::Space));
    }

    #[test]
    fn test_unified_from_keyboard_and_stick() {
        let mut input = InputState::new((1280, 720));
        input.press_key(Keycode::W);
        input.set_axis(Axis::LeftX, 0.8);
        input.update_unified(0.016);

        assert!(input.is_down(InputBit::Up));
        assert!(input.is_down(InputBit::Right));
        assert!(input.is_pressed(InputBit::Up));
        assert!(!input.is_down(InputBit::Left));
    }

    #[test]
    fn test_deadzone() {
        let mut input = InputState::new((1280, 720));
        input.set_axis(Axis::LeftY, 0.3);
        input.set_axis(Axis::TriggerRight, 0.3);
        input.update_unified(0.016);
        assert!(!input.is_down(InputBit::Down));
        assert!(!input.is_down(InputBit::Rt));
        assert_eq!(input.left_stick(), (0.0, 0.0));
    }

    #[test]
    fn test_hold_time_and_release() {
        let mut input = InputState::new((1280, 720));
        input.press_key(Keycode::Return);
        for _ in 0..3 {
            input.begin_frame();
            input.update_unified(0.5);
        }
        assert!((input.hold_time(InputBit::Start) - 1.5).abs() < 1e-6);

        input.begin_frame();
        input.release_key(Keycode::Return);
        input.update_unified(0.5);
        assert!(input.is_released(InputBit::Start));
        assert_eq!(input.hold_time(InputBit::Start), 0.0);
    }

    #[test]
    fn test_mouse_virtual_conversion() {
        let mut input = InputState::new((640, 360));
        input.set_mouse_position(320, 180);
        assert_eq!(input.mouse_virtual((1280, 720)), (640.0, 360.0));
    }

    #[test]
    fn test_quit_event() {
        let mut input = InputState::new((640, 360));
        input.handle_event(&Event::Quit { timestamp: 0 });
        assert!(input.quit_requested());
    }
}
