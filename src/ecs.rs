//! ECS components for entity-based rendering.
//!
//! Entities carrying both a [`Transform`](crate::Transform) and a
//! [`RenderMesh`] are drawn by the scene pass each frame.
//!
//! # Example
//!
//! ```ignore
//! let cube = scene.add_mesh(Mesh::cube(&gpu.device));
//! world.spawn((
//!     Transform::from_position(Vec3::new(0.0, 0.5, 0.0)),
//!     RenderMesh::new(cube, [0.9, 0.3, 0.2, 1.0]),
//! ));
//! ```

/// Type-safe handle to a mesh owned by the scene pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Component for rendering a mesh on an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderMesh {
    /// Handle to the mesh geometry.
    pub mesh: MeshId,
    /// Linear RGBA tint.
    pub color: [f32; 4],
}

impl RenderMesh {
    pub fn new(mesh: MeshId, color: [f32; 4]) -> Self {
        Self { mesh, color }
    }
}
