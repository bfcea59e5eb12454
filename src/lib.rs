//! # Vantage
//!
//! **Camera and rasterizer plumbing for a small 3D scene editor.**
//!
//! - [`Camera`]: a free-fly camera that owns its position and pitch/yaw
//! - [`CameraComponent`]: a camera bound to an entity's [`Transform`]
//! - [`RasterizerStates`]: the shared set of fill/cull configurations
//! - [`Volatile`]: the resize contract everything viewport-sized implements
//!
//! Conventions are left-handed: +Z forward, +Y up, +X right, clip depth in
//! `[0, 1]`, clockwise front faces. Positive pitch looks down; positive yaw
//! turns from +Z toward +X.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> Result<(), vantage::EngineError> {
//!     vantage::run(vantage::EditorConfig::new().title("Scene"))
//! }
//! ```

mod app;
mod camera;
mod camera_component;
mod ecs;
mod error;
mod freelook_camera;
mod gpu;
mod input;
pub mod math;
mod mesh;
pub mod rasterizer;
mod scene_pass;
mod transform;
mod volatile;

pub use app::{ActiveCamera, EditorConfig, run};
pub use camera::{Camera, PITCH_LIMIT};
pub use camera_component::CameraComponent;
pub use ecs::{MeshId, RenderMesh};
pub use error::{ComponentError, EngineError, ProjectionError, RasterizerError, ResizeError};
pub use freelook_camera::FreelookController;
pub use gpu::GpuContext;
pub use input::{Input, InputCode, script_globals};
pub use mesh::{Mesh, Vertex3d};
pub use rasterizer::{
    RasterizerDesc, RasterizerDevice, RasterizerState, RasterizerStateKind, RasterizerStates,
};
pub use scene_pass::{DrawItem, ScenePass, SceneView};
pub use transform::Transform;
pub use volatile::{Volatile, resize_all};

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

pub use hecs::{Entity, World};
