//! A free-flying camera that owns its own position and orientation.
//!
//! [`Camera`] keeps its view and projection matrices eagerly in sync: every
//! mutator recomputes whatever it invalidates before returning, so a reader
//! never observes a stale matrix.
//!
//! # Example
//!
//! ```ignore
//! use vantage::Camera;
//!
//! let mut camera = Camera::new();
//! camera.rotate(0.0, 0.25);
//! camera.move_forward(2.0);
//! camera.on_resize(1280, 720)?;
//!
//! let view_proj = camera.view_projection_matrix();
//! ```

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use glam::{Mat4, Vec3};

use crate::error::{ProjectionError, ResizeError};
use crate::math;
use crate::volatile::{Volatile, require_extent};

/// Largest pitch magnitude, in radians. Keeps the forward vector off the up axis.
pub const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Free-fly camera with pitch/yaw orientation.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    look_at: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    pitch: f32,
    yaw: f32,
    fov_y: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        let position = Vec3::new(0.0, 0.0, -5.0);
        let mut camera = Self {
            position,
            look_at: position + math::FORWARD,
            forward: math::FORWARD,
            right: math::RIGHT,
            up: math::UP,
            pitch: 0.0,
            yaw: 0.0,
            fov_y: FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        camera.update_view_matrix();
        camera.update_projection_matrix();
        camera
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates a rotation. Pitch is clamped to [`PITCH_LIMIT`], yaw wraps into `[0, 2π)`.
    pub fn rotate(&mut self, delta_pitch: f32, delta_yaw: f32) {
        self.pitch = (self.pitch + delta_pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = wrap_yaw(self.yaw + delta_yaw);
        self.update_basis();
        self.update_view_matrix();
    }

    /// Moves along the current forward vector.
    pub fn move_forward(&mut self, distance: f32) {
        self.translate(self.forward * distance);
    }

    /// Moves along the current right vector.
    pub fn move_right(&mut self, distance: f32) {
        self.translate(self.right * distance);
    }

    /// Moves along the current up vector.
    pub fn move_up(&mut self, distance: f32) {
        self.translate(self.up * distance);
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.look_at = self.position + self.forward;
        self.update_view_matrix();
    }

    /// Sets the vertical field of view in degrees.
    pub fn set_fov_degrees(&mut self, degrees: f32) -> Result<(), ProjectionError> {
        self.set_fov_radians(degrees.to_radians())
    }

    /// Sets the vertical field of view in radians.
    pub fn set_fov_radians(&mut self, radians: f32) -> Result<(), ProjectionError> {
        math::validate_fov(radians)?;
        self.fov_y = radians;
        self.update_projection_matrix();
        Ok(())
    }

    pub fn set_aspect_ratio(&mut self, ratio: f32) -> Result<(), ProjectionError> {
        math::validate_aspect(ratio)?;
        self.aspect_ratio = ratio;
        self.update_projection_matrix();
        Ok(())
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<(), ProjectionError> {
        math::validate_clip_planes(near, far)?;
        self.near = near;
        self.far = far;
        self.update_projection_matrix();
        Ok(())
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// The point one unit ahead of the camera along its forward vector.
    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_y
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_y.to_degrees()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Returns `(near, far)`.
    pub fn clip_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Width and height of the frustum cross-section at the far plane.
    pub fn frustum_dimensions(&self) -> (f32, f32) {
        let height = 2.0 * self.far * (self.fov_y * 0.5).tan();
        (height * self.aspect_ratio, height)
    }

    /// Radius of a sphere enclosing the far frustum box.
    ///
    /// Returns infinity if the frustum has no extent.
    pub fn scene_radius(&self) -> f32 {
        let (width, height) = self.frustum_dimensions();
        if width <= 0.0 || height <= 0.0 {
            return f32::INFINITY;
        }
        (width * width + height * height + self.far * self.far).sqrt() * 0.5
    }

    fn translate(&mut self, offset: Vec3) {
        self.position += offset;
        self.look_at = self.position + self.forward;
        self.update_view_matrix();
    }

    fn update_basis(&mut self) {
        let rotation = math::rotation_roll_pitch_yaw(self.pitch, self.yaw, 0.0);
        self.forward = rotation.transform_vector3(math::FORWARD);
        self.right = rotation.transform_vector3(math::RIGHT);
        self.up = rotation.transform_vector3(math::UP);
        self.look_at = self.position + self.forward;
    }

    fn update_view_matrix(&mut self) {
        // Far from the origin the unit forward offset rounds away.
        if self.position == self.look_at {
            log::debug!("camera eye equals look-at {:?}, keeping previous view", self.look_at);
            return;
        }
        let view = math::look_at_lh(self.position, self.look_at, self.up);
        if !view.is_finite() {
            log::debug!("degenerate camera basis at {:?}, keeping previous view", self.position);
            return;
        }
        self.view = view;
    }

    fn update_projection_matrix(&mut self) {
        self.projection =
            math::perspective_fov_lh(self.fov_y, self.aspect_ratio, self.near, self.far);
    }
}

impl Volatile for Camera {
    fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError> {
        require_extent(width, height)?;
        self.set_aspect_ratio(width as f32 / height as f32)?;
        Ok(())
    }
}

/// Wraps an angle into `[0, 2π)`.
pub(crate) fn wrap_yaw(yaw: f32) -> f32 {
    let wrapped = yaw.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::transform_coord;

    const EPS: f32 = 1e-4;

    #[test]
    fn default_camera_looks_at_origin_from_behind() {
        let camera = Camera::new();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, -5.0));
        assert!(camera.forward().abs_diff_eq(Vec3::Z, EPS));

        let origin_in_view = transform_coord(&camera.view_matrix(), Vec3::ZERO);
        assert!(origin_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), EPS));
    }

    #[test]
    fn move_forward_translates_along_forward() {
        let mut camera = Camera::new();
        camera.move_forward(5.0);
        assert!(camera.position().abs_diff_eq(Vec3::ZERO, EPS));
        assert!(camera.look_at().abs_diff_eq(Vec3::Z, EPS));
    }

    #[test]
    fn move_right_translates_along_right() {
        let mut camera = Camera::new();
        camera.move_right(2.0);
        assert!(camera.position().abs_diff_eq(Vec3::new(2.0, 0.0, -5.0), EPS));
    }

    #[test]
    fn rotation_keeps_pitch_and_yaw_in_range() {
        let mut camera = Camera::new();
        let deltas = [
            (1.0, 3.0),
            (2.5, -7.0),
            (-10.0, 0.5),
            (0.3, 100.0),
            (-0.1, -TAU),
            (4.0, -1e-7),
        ];
        for (dp, dy) in deltas {
            camera.rotate(dp, dy);
            assert!(camera.pitch().abs() <= PITCH_LIMIT);
            assert!(camera.pitch().abs() < FRAC_PI_2);
            assert!(camera.yaw() >= 0.0 && camera.yaw() < TAU, "yaw {}", camera.yaw());
        }
    }

    #[test]
    fn rotation_rebuilds_basis_and_view() {
        let mut camera = Camera::new();
        camera.set_position(Vec3::ZERO);
        camera.rotate(0.0, FRAC_PI_2);
        assert!(camera.forward().abs_diff_eq(Vec3::X, EPS));
        assert!(camera.right().abs_diff_eq(Vec3::NEG_Z, EPS));
        assert!(camera.up().abs_diff_eq(Vec3::Y, EPS));
        assert!(camera.look_at().abs_diff_eq(Vec3::X, EPS));

        // A point straight ahead lands on the view +Z axis.
        let ahead = transform_coord(&camera.view_matrix(), Vec3::new(3.0, 0.0, 0.0));
        assert!(ahead.abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), EPS));
    }

    #[test]
    fn view_is_kept_when_position_absorbs_forward() {
        let mut camera = Camera::new();
        let before = camera.view_matrix();

        camera.set_position(Vec3::new(0.0, 0.0, 1.0e9));
        assert_eq!(camera.position(), camera.look_at());
        assert!(camera.view_matrix().is_finite());
        assert_eq!(camera.view_matrix(), before);

        camera.rotate(0.1, 0.2);
        camera.move_forward(1.0);
        assert!(camera.view_matrix().is_finite());
    }

    #[test]
    fn resize_sets_aspect_and_projection() {
        let mut camera = Camera::new();
        camera.on_resize(1920, 1080).unwrap();
        assert_eq!(camera.aspect_ratio(), 1920.0 / 1080.0);

        // A point on the right edge of the frustum at depth d projects to x = 1.
        let d = 10.0;
        let half_h = d * (camera.fov_radians() * 0.5).tan();
        let half_w = half_h * camera.aspect_ratio();
        let ndc = transform_coord(&camera.projection_matrix(), Vec3::new(half_w, half_h, d));
        assert!((ndc.x - 1.0).abs() < EPS);
        assert!((ndc.y - 1.0).abs() < EPS);
    }

    #[test]
    fn zero_height_resize_is_rejected_without_side_effects() {
        let mut camera = Camera::new();
        let before = camera.projection_matrix();
        let err = camera.on_resize(800, 0).unwrap_err();
        assert_eq!(
            err,
            ResizeError::ZeroExtent {
                width: 800,
                height: 0
            }
        );
        assert_eq!(camera.projection_matrix(), before);
        assert_eq!(camera.aspect_ratio(), 16.0 / 9.0);
    }

    #[test]
    fn fov_round_trips_through_degrees() {
        let mut camera = Camera::new();
        camera.set_fov_degrees(70.0).unwrap();
        assert!((camera.fov_degrees() - 70.0).abs() < EPS);
        assert!((camera.fov_radians() - 70f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn invalid_projection_parameters_leave_state_unchanged() {
        let mut camera = Camera::new();
        let before = camera.projection_matrix();
        assert!(camera.set_clip_planes(10.0, 1.0).is_err());
        assert!(camera.set_aspect_ratio(0.0).is_err());
        assert!(camera.set_fov_degrees(0.0).is_err());
        assert_eq!(camera.clip_planes(), (0.1, 1000.0));
        assert_eq!(camera.projection_matrix(), before);
    }

    #[test]
    fn scene_radius_covers_far_frustum() {
        let mut camera = Camera::new();
        camera.set_clip_planes(0.1, 100.0).unwrap();
        let (w, h) = camera.frustum_dimensions();
        assert!(h > 0.0 && w > h);
        let r = camera.scene_radius();
        assert!(r > 50.0);
        assert!((r - (w * w + h * h + 100.0 * 100.0).sqrt() * 0.5).abs() < EPS);
    }

    #[test]
    fn wrap_yaw_stays_below_tau() {
        assert_eq!(wrap_yaw(TAU), 0.0);
        assert!(wrap_yaw(-1e-9) < TAU);
        assert!((wrap_yaw(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPS);
    }
}
