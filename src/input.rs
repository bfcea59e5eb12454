//! Keyboard and mouse state, fed from winit window events.
//!
//! [`Input`] distinguishes keys that are *held* from keys that went down or
//! up *this frame*. Call [`Input::begin_frame`] after each frame to clear the
//! per-frame sets and the accumulated mouse delta.
//!
//! The same state is exposed by name for a scripting layer: [`script_globals`]
//! lists the global names (`KEY_W`, `MOUSE_LEFT`, ...) a binding layer should
//! publish, and [`Input::is_down`], [`Input::pressed`] and [`Input::released`]
//! answer queries for an [`InputCode`].

use std::collections::HashSet;

use glam::{IVec2, Vec2};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// A key or mouse button, as seen by scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputCode {
    Key(KeyCode),
    Mouse(MouseButton),
}

/// Tracks input state for keyboard and mouse.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_buttons_released: HashSet<MouseButton>,
    mouse_position: IVec2,
    /// Last sample inside the window; `None` until the cursor is seen again.
    last_cursor: Option<IVec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    dead_zone: f32,
    enabled: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_buttons_pressed: HashSet::new(),
            mouse_buttons_released: HashSet::new(),
            mouse_position: IVec2::ZERO,
            last_cursor: None,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
            dead_zone: 0.0,
            enabled: true,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-event mouse movement below this many pixels (per axis) is dropped.
    pub fn with_dead_zone(mut self, pixels: f32) -> Self {
        self.dead_zone = pixels.max(0.0);
        self
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_buttons_pressed.clear();
        self.mouse_buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Enables or disables event processing.
    ///
    /// Disabling also releases everything currently held, so nothing stays
    /// stuck down while the window is unfocused.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.keys_released.extend(self.keys_down.drain());
            self.mouse_buttons_released
                .extend(self.mouse_buttons_down.drain());
            self.mouse_delta = Vec2::ZERO;
            self.last_cursor = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        if !self.enabled {
            return;
        }
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.update_key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.update_mouse_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.update_mouse_position(IVec2::new(position.x as i32, position.y as i32));
            }
            WindowEvent::CursorEntered { .. } | WindowEvent::CursorLeft { .. } => {
                self.forget_cursor();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.scroll_delta += d;
            }
            _ => {}
        }
    }

    pub(crate) fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
            self.keys_released.insert(key);
        }
    }

    pub(crate) fn update_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.mouse_buttons_down.insert(button) {
                self.mouse_buttons_pressed.insert(button);
            }
        } else {
            self.mouse_buttons_down.remove(&button);
            self.mouse_buttons_released.insert(button);
        }
    }

    pub(crate) fn update_mouse_position(&mut self, position: IVec2) {
        // The first sample after entering the window only sets the anchor.
        if let Some(previous) = self.last_cursor {
            let raw = (position - previous).as_vec2();
            let dead_zone = self.dead_zone;
            let filter = |v: f32| if v.abs() < dead_zone { 0.0 } else { v };
            self.mouse_delta += Vec2::new(filter(raw.x), filter(raw.y));
        }
        self.last_cursor = Some(position);
        self.mouse_position = position;
    }

    fn forget_cursor(&mut self) {
        self.last_cursor = None;
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Returns true if the mouse button was released this frame.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_buttons_released.contains(&button)
    }

    /// Current mouse position in window pixels.
    pub fn mouse_position(&self) -> IVec2 {
        self.mouse_position
    }

    /// Mouse movement accumulated this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    pub fn is_down(&self, code: InputCode) -> bool {
        match code {
            InputCode::Key(key) => self.key_down(key),
            InputCode::Mouse(button) => self.mouse_down(button),
        }
    }

    pub fn pressed(&self, code: InputCode) -> bool {
        match code {
            InputCode::Key(key) => self.key_pressed(key),
            InputCode::Mouse(button) => self.mouse_pressed(button),
        }
    }

    pub fn released(&self, code: InputCode) -> bool {
        match code {
            InputCode::Key(key) => self.key_released(key),
            InputCode::Mouse(button) => self.mouse_released(button),
        }
    }

    /// Resolves a script global name such as `"KEY_W"` or `"MOUSE_LEFT"`.
    pub fn lookup(name: &str) -> Option<InputCode> {
        script_globals()
            .find(|(global, _)| *global == name)
            .map(|(_, code)| code)
    }
}

const KEY_GLOBALS: &[(&str, KeyCode)] = &[
    ("KEY_A", KeyCode::KeyA),
    ("KEY_B", KeyCode::KeyB),
    ("KEY_C", KeyCode::KeyC),
    ("KEY_D", KeyCode::KeyD),
    ("KEY_E", KeyCode::KeyE),
    ("KEY_F", KeyCode::KeyF),
    ("KEY_G", KeyCode::KeyG),
    ("KEY_H", KeyCode::KeyH),
    ("KEY_I", KeyCode::KeyI),
    ("KEY_J", KeyCode::KeyJ),
    ("KEY_K", KeyCode::KeyK),
    ("KEY_L", KeyCode::KeyL),
    ("KEY_M", KeyCode::KeyM),
    ("KEY_N", KeyCode::KeyN),
    ("KEY_O", KeyCode::KeyO),
    ("KEY_P", KeyCode::KeyP),
    ("KEY_Q", KeyCode::KeyQ),
    ("KEY_R", KeyCode::KeyR),
    ("KEY_S", KeyCode::KeyS),
    ("KEY_T", KeyCode::KeyT),
    ("KEY_U", KeyCode::KeyU),
    ("KEY_V", KeyCode::KeyV),
    ("KEY_W", KeyCode::KeyW),
    ("KEY_X", KeyCode::KeyX),
    ("KEY_Y", KeyCode::KeyY),
    ("KEY_Z", KeyCode::KeyZ),
    ("KEY_1", KeyCode::Digit1),
    ("KEY_2", KeyCode::Digit2),
    ("KEY_3", KeyCode::Digit3),
    ("KEY_4", KeyCode::Digit4),
    ("KEY_5", KeyCode::Digit5),
    ("KEY_6", KeyCode::Digit6),
    ("KEY_7", KeyCode::Digit7),
    ("KEY_8", KeyCode::Digit8),
    ("KEY_9", KeyCode::Digit9),
    ("KEY_0", KeyCode::Digit0),
    ("KEY_MINUS", KeyCode::Minus),
    ("KEY_EQUAL", KeyCode::Equal),
    ("KEY_BACKSPACE", KeyCode::Backspace),
    ("KEY_TAB", KeyCode::Tab),
    ("KEY_HOME", KeyCode::Home),
    ("KEY_LEFT", KeyCode::ArrowLeft),
    ("KEY_UP", KeyCode::ArrowUp),
    ("KEY_RIGHT", KeyCode::ArrowRight),
    ("KEY_DOWN", KeyCode::ArrowDown),
    ("KEY_ESCAPE", KeyCode::Escape),
    ("KEY_ENTER", KeyCode::Enter),
    ("KEY_SPACE", KeyCode::Space),
    ("KEY_LCTRL", KeyCode::ControlLeft),
    ("KEY_RCTRL", KeyCode::ControlRight),
    ("KEY_LSHIFT", KeyCode::ShiftLeft),
    ("KEY_RSHIFT", KeyCode::ShiftRight),
    ("KEY_F1", KeyCode::F1),
    ("KEY_F2", KeyCode::F2),
    ("KEY_F3", KeyCode::F3),
    ("KEY_F4", KeyCode::F4),
    ("KEY_F5", KeyCode::F5),
    ("KEY_F6", KeyCode::F6),
    ("KEY_F7", KeyCode::F7),
    ("KEY_F8", KeyCode::F8),
    ("KEY_F9", KeyCode::F9),
    ("KEY_F10", KeyCode::F10),
    ("KEY_F11", KeyCode::F11),
    ("KEY_F12", KeyCode::F12),
];

const MOUSE_GLOBALS: &[(&str, MouseButton)] = &[
    ("MOUSE_LEFT", MouseButton::Left),
    ("MOUSE_RIGHT", MouseButton::Right),
    ("MOUSE_MIDDLE", MouseButton::Middle),
];

/// Global names a scripting layer should publish, with the code each maps to.
pub fn script_globals() -> impl Iterator<Item = (&'static str, InputCode)> {
    let keys = KEY_GLOBALS
        .iter()
        .map(|&(name, key)| (name, InputCode::Key(key)));
    let buttons = MOUSE_GLOBALS
        .iter()
        .map(|&(name, button)| (name, InputCode::Mouse(button)));
    keys.chain(buttons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_and_release_are_per_frame() {
        let mut input = Input::new();
        input.update_key(KeyCode::KeyW, true);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(input.key_pressed(KeyCode::KeyW));

        input.begin_frame();
        // Auto-repeat does not count as a new press.
        input.update_key(KeyCode::KeyW, true);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_pressed(KeyCode::KeyW));

        input.update_key(KeyCode::KeyW, false);
        assert!(!input.key_down(KeyCode::KeyW));
        assert!(input.key_released(KeyCode::KeyW));
        input.begin_frame();
        assert!(!input.key_released(KeyCode::KeyW));
    }

    #[test]
    fn mouse_buttons_track_like_keys() {
        let mut input = Input::new();
        input.update_mouse_button(MouseButton::Right, true);
        assert!(input.is_down(InputCode::Mouse(MouseButton::Right)));
        assert!(input.pressed(InputCode::Mouse(MouseButton::Right)));
        input.update_mouse_button(MouseButton::Right, false);
        assert!(input.released(InputCode::Mouse(MouseButton::Right)));
    }

    #[test]
    fn mouse_delta_accumulates_until_frame_reset() {
        let mut input = Input::new();
        input.update_mouse_position(IVec2::new(10, 10));
        input.update_mouse_position(IVec2::new(15, 7));
        input.update_mouse_position(IVec2::new(18, 7));
        assert_eq!(input.mouse_position(), IVec2::new(18, 7));
        assert_eq!(input.mouse_delta(), Vec2::new(8.0, -3.0));
        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), IVec2::new(15, 7));
    }

    #[test]
    fn dead_zone_drops_small_movements_per_axis() {
        let mut input = Input::new().with_dead_zone(2.5);
        input.update_mouse_position(IVec2::new(100, 100));
        input.update_mouse_position(IVec2::new(102, 110));
        assert_eq!(input.mouse_delta(), Vec2::new(0.0, 10.0));
        assert_eq!(input.mouse_position(), IVec2::new(102, 110));
    }

    #[test]
    fn first_cursor_sample_after_entering_adds_no_motion() {
        let mut input = Input::new().with_dead_zone(2.5);
        input.update_mouse_position(IVec2::new(640, 360));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), IVec2::new(640, 360));

        input.forget_cursor();
        input.update_mouse_position(IVec2::new(20, 700));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.update_mouse_position(IVec2::new(30, 700));
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn re_enabling_does_not_jump_the_cursor() {
        let mut input = Input::new();
        input.update_mouse_position(IVec2::new(10, 10));
        input.set_enabled(false);
        input.set_enabled(true);
        input.update_mouse_position(IVec2::new(400, 300));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn disabling_releases_held_input_and_ignores_events() {
        let mut input = Input::new();
        input.update_key(KeyCode::KeyA, true);
        input.set_enabled(false);
        assert!(!input.key_down(KeyCode::KeyA));
        assert!(input.key_released(KeyCode::KeyA));
        assert!(!input.is_enabled());
    }

    #[test]
    fn script_names_resolve_to_codes() {
        assert_eq!(Input::lookup("KEY_W"), Some(InputCode::Key(KeyCode::KeyW)));
        assert_eq!(Input::lookup("KEY_LEFT"), Some(InputCode::Key(KeyCode::ArrowLeft)));
        assert_eq!(
            Input::lookup("MOUSE_MIDDLE"),
            Some(InputCode::Mouse(MouseButton::Middle))
        );
        assert_eq!(Input::lookup("KEY_NOPE"), None);

        let names: HashSet<&str> = script_globals().map(|(name, _)| name).collect();
        assert_eq!(names.len(), script_globals().count());
    }

    #[test]
    fn query_by_code_matches_typed_queries() {
        let mut input = Input::new();
        let code = Input::lookup("KEY_SPACE").unwrap();
        input.update_key(KeyCode::Space, true);
        assert!(input.is_down(code));
        assert!(input.pressed(code));
        assert!(!input.released(code));
    }
}
