//! Keyboard and mouse driver for the free-fly [`Camera`].
//!
//! [`FreelookController`] owns no camera state of its own; each frame it reads
//! [`Input`] and pushes rotation and movement into the camera's mutators, so
//! the camera keeps its invariants (pitch clamp, yaw wrap, fresh matrices).
//!
//! # Controls
//!
//! - **Mouse**: look around (only while the look button is held, if one is set)
//! - **W/S**: move forward/backward
//! - **A/D**: strafe left/right
//! - **Space**: move up
//! - **Left Shift**: move down
//!
//! # Example
//!
//! ```
//! use vantage::{Camera, FreelookController, Input, MouseButton};
//!
//! let controller = FreelookController::new()
//!     .speed(10.0)
//!     .look_button(MouseButton::Right);
//! let mut camera = Camera::new();
//! let input = Input::new();
//! controller.update(&mut camera, &input, 1.0 / 60.0);
//! ```

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::camera::Camera;
use crate::input::Input;

/// Translates input into free-fly camera motion.
#[derive(Clone, Debug)]
pub struct FreelookController {
    /// Radians of rotation per pixel of mouse movement.
    pub sensitivity: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Mouse look is active only while this button is held. `None` means always.
    pub look_button: Option<MouseButton>,
}

impl Default for FreelookController {
    fn default() -> Self {
        Self {
            sensitivity: 0.003,
            speed: 5.0,
            look_button: None,
        }
    }
}

impl FreelookController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn look_button(mut self, button: MouseButton) -> Self {
        self.look_button = Some(button);
        self
    }

    /// Apply this frame's input to `camera`.
    pub fn update(&self, camera: &mut Camera, input: &Input, dt: f32) {
        let looking = self.look_button.is_none_or(|button| input.mouse_down(button));
        if looking {
            let delta = input.mouse_delta();
            if delta.x != 0.0 || delta.y != 0.0 {
                // Screen y grows downward and positive pitch looks down.
                camera.rotate(delta.y * self.sensitivity, delta.x * self.sensitivity);
            }
        }

        let step = self.speed * dt;
        let axis = |positive: KeyCode, negative: KeyCode| -> f32 {
            let mut value = 0.0;
            if input.key_down(positive) {
                value += 1.0;
            }
            if input.key_down(negative) {
                value -= 1.0;
            }
            value
        };

        let forward = axis(KeyCode::KeyW, KeyCode::KeyS);
        let right = axis(KeyCode::KeyD, KeyCode::KeyA);
        let up = axis(KeyCode::Space, KeyCode::ShiftLeft);

        if forward != 0.0 {
            camera.move_forward(forward * step);
        }
        if right != 0.0 {
            camera.move_right(right * step);
        }
        if up != 0.0 {
            camera.move_up(up * step);
        }
    }
}
