//! Spatial placement component for scene entities.
//!
//! A [`Transform`] lives in the [`hecs::World`] alongside other components.
//! Systems that only observe an entity's placement (such as
//! [`CameraComponent`](crate::CameraComponent)) hold the entity handle and
//! read the transform through the world each frame.
//!
//! # Example
//!
//! ```
//! use vantage::{Transform, Vec3};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(0.0, 2.0, -5.0))
//!     .rotation(Vec3::new(0.2, 0.0, 0.0))
//!     .uniform_scale(2.0);
//! assert_eq!(transform.scale, Vec3::splat(2.0));
//! ```

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, Euler rotation and scale of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// Euler angles in radians: `x` is pitch, `y` is yaw, `z` is roll.
    ///
    /// Applied roll first, then pitch, then yaw, all about world axes.
    pub rotation: Vec3,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates an identity transform (origin, no rotation, unit scale).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the Euler rotation `(pitch, yaw, roll)` in radians.
    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Offsets the position in place.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Adds Euler angle deltas in place.
    pub fn rotate(&mut self, delta: Vec3) {
        self.rotation += delta;
    }

    /// The rotation as a quaternion, using the same axis order as
    /// [`math::rotation_roll_pitch_yaw`](crate::math::rotation_roll_pitch_yaw).
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        )
    }

    /// Model matrix applying scale, then rotation, then translation.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn orientation_matches_math_convention() {
        let t = Transform::new().rotation(Vec3::new(0.3, 1.2, -0.4));
        let from_quat = Mat4::from_quat(t.orientation());
        let from_math = math::rotation_roll_pitch_yaw(0.3, 1.2, -0.4);
        assert!(from_quat.abs_diff_eq(from_math, 1e-5));
    }

    #[test]
    fn matrix_scales_then_rotates_then_translates() {
        let t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0))
            .rotation(Vec3::new(0.0, FRAC_PI_2, 0.0))
            .uniform_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::Z);
        // +Z scaled to 2, yawed onto +X, then offset by 1.
        assert!(p.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn non_uniform_scale_stretches_each_axis() {
        let t = Transform::new().scale(Vec3::new(0.5, 3.0, 2.0));
        let p = t.matrix().transform_point3(Vec3::ONE);
        assert!(p.abs_diff_eq(Vec3::new(0.5, 3.0, 2.0), 1e-6));
    }

    #[test]
    fn in_place_mutators_accumulate() {
        let mut t = Transform::new();
        t.translate(Vec3::X);
        t.translate(Vec3::Y);
        t.rotate(Vec3::new(0.1, 0.2, 0.0));
        t.rotate(Vec3::new(0.1, 0.0, 0.0));
        assert_eq!(t.position, Vec3::new(1.0, 1.0, 0.0));
        assert!(t.rotation.abs_diff_eq(Vec3::new(0.2, 0.2, 0.0), 1e-6));
        assert_eq!(t.scale, Vec3::ONE);
    }
}
