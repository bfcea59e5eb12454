//! Linear-algebra conventions shared by every spatial computation.
//!
//! All cameras in the crate work in a **left-handed** space: +X is right,
//! +Y is up and +Z points into the screen. Projections map view depth to
//! clip depth in `[0, 1]`, which is what wgpu expects. Matrices are
//! column-major [`glam::Mat4`] and transform column vectors, so a combined
//! view-projection is `projection * view`.
//!
//! Clockwise triangles are front-facing under this convention; see
//! [`crate::rasterizer::Winding`].

use glam::{EulerRot, Mat4, Vec3, Vec4};

use crate::error::ProjectionError;

/// Canonical forward axis (+Z).
pub const FORWARD: Vec3 = Vec3::Z;
/// Canonical right axis (+X).
pub const RIGHT: Vec3 = Vec3::X;
/// Canonical up axis (+Y).
pub const UP: Vec3 = Vec3::Y;

/// Builds a left-handed view matrix looking from `eye` toward `target`.
///
/// The caller must ensure `eye != target`; a zero-length view direction
/// produces NaNs.
pub fn look_at_lh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_lh(eye, target, up)
}

/// Left-handed perspective projection from a vertical field of view in radians.
pub fn perspective_fov_lh(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_lh(fov_y, aspect, near, far)
}

/// Left-handed orthographic projection of a `width` x `height` volume centred
/// on the view axis.
pub fn orthographic_lh(width: f32, height: f32, near: f32, far: f32) -> Mat4 {
    let half_w = width * 0.5;
    let half_h = height * 0.5;
    Mat4::orthographic_lh(-half_w, half_w, -half_h, half_h, near, far)
}

/// Rotation applying roll (Z), then pitch (X), then yaw (Y).
///
/// Positive pitch tilts +Z toward -Y (looking down); positive yaw turns +Z
/// toward +X (turning right).
pub fn rotation_roll_pitch_yaw(pitch: f32, yaw: f32, roll: f32) -> Mat4 {
    Mat4::from_euler(EulerRot::YXZ, yaw, pitch, roll)
}

/// Transforms a point by `m` and divides by the resulting `w`.
pub fn transform_coord(m: &Mat4, v: Vec3) -> Vec3 {
    let p = *m * Vec4::new(v.x, v.y, v.z, 1.0);
    if p.w != 0.0 { p.truncate() / p.w } else { p.truncate() }
}

/// Checks the aspect ratio is strictly positive and finite.
pub fn validate_aspect(aspect: f32) -> Result<(), ProjectionError> {
    if aspect.is_finite() && aspect > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::InvalidAspect(aspect))
    }
}

/// Checks `0 < near < far`, both finite.
pub fn validate_clip_planes(near: f32, far: f32) -> Result<(), ProjectionError> {
    if near.is_finite() && far.is_finite() && near > 0.0 && near < far {
        Ok(())
    } else {
        Err(ProjectionError::InvalidClipPlanes { near, far })
    }
}

/// Checks the vertical field of view lies in `(0, π)` radians.
pub fn validate_fov(fov_y: f32) -> Result<(), ProjectionError> {
    if fov_y > 0.0 && fov_y < std::f32::consts::PI {
        Ok(())
    } else {
        Err(ProjectionError::InvalidFov(fov_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

    const EPS: f32 = 1e-5;

    #[test]
    fn identity_rotation_keeps_canonical_axes() {
        let m = rotation_roll_pitch_yaw(0.0, 0.0, 0.0);
        assert!(m.transform_vector3(FORWARD).abs_diff_eq(FORWARD, EPS));
        assert!(m.transform_vector3(RIGHT).abs_diff_eq(RIGHT, EPS));
        assert!(m.transform_vector3(UP).abs_diff_eq(UP, EPS));
    }

    #[test]
    fn positive_yaw_turns_forward_toward_right() {
        let m = rotation_roll_pitch_yaw(0.0, FRAC_PI_2, 0.0);
        assert!(m.transform_vector3(FORWARD).abs_diff_eq(Vec3::X, EPS));
        assert!(m.transform_vector3(RIGHT).abs_diff_eq(Vec3::NEG_Z, EPS));
    }

    #[test]
    fn positive_pitch_looks_down() {
        let m = rotation_roll_pitch_yaw(FRAC_PI_4, 0.0, 0.0);
        let f = m.transform_vector3(FORWARD);
        let s = FRAC_PI_4.sin();
        assert!(f.abs_diff_eq(Vec3::new(0.0, -s, s), EPS));
    }

    #[test]
    fn look_at_puts_target_on_positive_z() {
        let view = look_at_lh(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO, UP);
        let p = transform_coord(&view, Vec3::ZERO);
        assert!(p.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPS));
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth_range() {
        let proj = perspective_fov_lh(FRAC_PI_4, 1.0, 0.1, 100.0);
        let near = transform_coord(&proj, Vec3::new(0.0, 0.0, 0.1));
        let far = transform_coord(&proj, Vec3::new(0.0, 0.0, 100.0));
        assert!((near.z - 0.0).abs() < EPS);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn orthographic_maps_extent_edges_to_ndc_edges() {
        let proj = orthographic_lh(800.0, 600.0, 0.1, 100.0);
        let p = transform_coord(&proj, Vec3::new(400.0, 300.0, 0.1));
        assert!((p.x - 1.0).abs() < EPS);
        assert!((p.y - 1.0).abs() < EPS);
    }

    #[test]
    fn validation_rejects_degenerate_parameters() {
        assert!(validate_aspect(0.0).is_err());
        assert!(validate_aspect(f32::NAN).is_err());
        assert!(validate_aspect(1.5).is_ok());
        assert!(validate_clip_planes(0.0, 10.0).is_err());
        assert!(validate_clip_planes(10.0, 1.0).is_err());
        assert!(validate_clip_planes(1.0, 1.0).is_err());
        assert!(validate_clip_planes(0.1, 10.0).is_ok());
        assert!(validate_fov(0.0).is_err());
        assert!(validate_fov(std::f32::consts::PI).is_err());
        assert!(validate_fov(FRAC_PI_4).is_ok());
    }
}
