//! A camera attached to a scene entity.
//!
//! Unlike the free-fly [`Camera`](crate::Camera), a [`CameraComponent`] does
//! not own its placement. It is bound, for its whole lifetime, to an entity
//! carrying a [`Transform`] and re-derives its basis vectors and view matrix
//! from that transform once per frame in [`CameraComponent::update`]. The
//! transform itself is only ever read.
//!
//! Projection parameters are owned by the component and can switch between
//! perspective and orthographic at any time. Every setter recomputes the
//! projection before returning.
//!
//! # Example
//!
//! ```ignore
//! use vantage::{CameraComponent, Transform, Vec3, World};
//!
//! let mut world = World::new();
//! let rig = world.spawn((Transform::from_position(Vec3::new(0.0, 2.0, -8.0)),));
//!
//! let mut camera = CameraComponent::new(&world, rig);
//! camera.set_fov_degrees(60.0)?.set_clip_planes(0.1, 500.0)?;
//! camera.set_orthographic(true).set_width_height(20.0, 12.0);
//!
//! // once per frame
//! camera.update(&world)?;
//! ```

use std::f32::consts::FRAC_PI_4;

use glam::{Mat4, Vec3};
use hecs::{Entity, World};

use crate::error::{ComponentError, ProjectionError, ResizeError};
use crate::math;
use crate::transform::Transform;
use crate::volatile::{Volatile, require_extent};

/// Scene-bound camera with perspective and orthographic projection.
#[derive(Clone, Debug)]
pub struct CameraComponent {
    transform: Entity,
    position: Vec3,
    rotation: Vec3,
    look_at: Vec3,
    up: Vec3,
    forward: Vec3,
    right: Vec3,
    fov_y: f32,
    aspect_ratio: f32,
    near: f32,
    far: f32,
    view: Mat4,
    projection: Mat4,
    orthographic: bool,
    width: f32,
    height: f32,
}

impl CameraComponent {
    pub const DEFAULT_WIDTH: f32 = 16.0;
    pub const DEFAULT_HEIGHT: f32 = 9.0;
    pub const DEFAULT_ASPECT: f32 = Self::DEFAULT_WIDTH / Self::DEFAULT_HEIGHT;
    pub const DEFAULT_FOV: f32 = FRAC_PI_4;
    /// Smallest accepted orthographic width or height.
    pub const MIN_EXTENT: f32 = 1.0;

    /// Binds a camera to `transform`.
    ///
    /// # Panics
    ///
    /// Panics if `transform` does not exist or carries no [`Transform`]. A
    /// camera component cannot exist without one.
    pub fn new(world: &World, transform: Entity) -> Self {
        match Self::try_new(world, transform) {
            Ok(camera) => camera,
            Err(e) => panic!("CameraComponent requires a transform: {e}"),
        }
    }

    /// Fallible form of [`CameraComponent::new`].
    pub fn try_new(world: &World, transform: Entity) -> Result<Self, ComponentError> {
        let mut camera = Self {
            transform,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            look_at: math::FORWARD,
            up: math::UP,
            forward: math::FORWARD,
            right: math::RIGHT,
            fov_y: Self::DEFAULT_FOV,
            aspect_ratio: Self::DEFAULT_ASPECT,
            near: 0.01,
            far: 1000.0,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            orthographic: false,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        };
        camera.update(world)?;
        camera.recalculate_projection_matrix();
        Ok(camera)
    }

    /// Refreshes basis vectors and the view matrix from the bound transform.
    ///
    /// Call once per frame. If the transform entity has since been despawned
    /// the previous matrices are kept and an error is returned.
    pub fn update(&mut self, world: &World) -> Result<(), ComponentError> {
        let (position, rotation) = {
            let transform = world
                .get::<&Transform>(self.transform)
                .map_err(|_| ComponentError::MissingTransform(self.transform))?;
            (transform.position, transform.rotation)
        };
        self.position = position;
        self.rotation = rotation;

        self.update_vectors();
        self.recalculate_view_matrix();
        Ok(())
    }

    pub fn set_fov_degrees(&mut self, degrees: f32) -> Result<&mut Self, ProjectionError> {
        self.set_fov_radians(degrees.to_radians())
    }

    pub fn set_fov_radians(&mut self, radians: f32) -> Result<&mut Self, ProjectionError> {
        math::validate_fov(radians)?;
        self.fov_y = radians;
        self.recalculate_projection_matrix();
        Ok(self)
    }

    pub fn set_aspect_ratio(&mut self, aspect: f32) -> Result<&mut Self, ProjectionError> {
        math::validate_aspect(aspect)?;
        self.aspect_ratio = aspect;
        self.recalculate_projection_matrix();
        Ok(self)
    }

    pub fn set_near_plane(&mut self, near: f32) -> Result<&mut Self, ProjectionError> {
        self.set_clip_planes(near, self.far)
    }

    pub fn set_far_plane(&mut self, far: f32) -> Result<&mut Self, ProjectionError> {
        self.set_clip_planes(self.near, far)
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<&mut Self, ProjectionError> {
        math::validate_clip_planes(near, far)?;
        self.near = near;
        self.far = far;
        self.recalculate_projection_matrix();
        Ok(self)
    }

    pub fn set_orthographic(&mut self, orthographic: bool) -> &mut Self {
        self.orthographic = orthographic;
        self.recalculate_projection_matrix();
        self
    }

    /// Sets the orthographic volume width. Values below [`Self::MIN_EXTENT`] are ignored.
    pub fn set_width(&mut self, width: f32) -> &mut Self {
        if !(width >= Self::MIN_EXTENT) {
            return self;
        }
        self.width = width;
        self.recalculate_projection_matrix();
        self
    }

    /// Sets the orthographic volume height. Values below [`Self::MIN_EXTENT`] are ignored.
    pub fn set_height(&mut self, height: f32) -> &mut Self {
        if !(height >= Self::MIN_EXTENT) {
            return self;
        }
        self.height = height;
        self.recalculate_projection_matrix();
        self
    }

    /// Sets both orthographic extents. Ignored unless both are at least [`Self::MIN_EXTENT`].
    pub fn set_width_height(&mut self, width: f32, height: f32) -> &mut Self {
        if !(width >= Self::MIN_EXTENT && height >= Self::MIN_EXTENT) {
            return self;
        }
        self.width = width;
        self.height = height;
        self.recalculate_projection_matrix();
        self
    }

    /// Eye position read from the transform at the last update.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Euler rotation read from the transform at the last update.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
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

    pub fn near_plane(&self) -> f32 {
        self.near
    }

    pub fn far_plane(&self) -> f32 {
        self.far
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

    pub fn is_orthographic(&self) -> bool {
        self.orthographic
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Returns `(width, height)` of the orthographic volume.
    pub fn width_height(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// The entity whose transform this camera follows.
    pub fn transform(&self) -> Entity {
        self.transform
    }

    fn update_vectors(&mut self) {
        let rotation =
            math::rotation_roll_pitch_yaw(self.rotation.x, self.rotation.y, self.rotation.z);
        self.forward = rotation.transform_vector3(math::FORWARD);
        self.right = rotation.transform_vector3(math::RIGHT);
        self.up = rotation.transform_vector3(math::UP);
        self.look_at = self.position + self.forward;
    }

    fn recalculate_view_matrix(&mut self) {
        // Eye and target coincide when the position is large enough to absorb
        // the unit forward offset; look-at would divide by zero.
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

    fn recalculate_projection_matrix(&mut self) {
        self.projection = if self.orthographic {
            math::orthographic_lh(self.width, self.height, self.near, self.far)
        } else {
            math::perspective_fov_lh(self.fov_y, self.aspect_ratio, self.near, self.far)
        };
    }
}

impl Volatile for CameraComponent {
    fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError> {
        require_extent(width, height)?;
        self.set_aspect_ratio(width as f32 / height as f32)?;
        Ok(())
    }
}
