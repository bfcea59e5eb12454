//! Error types for the camera, resize, registry and editor layers.

use hecs::Entity;
use thiserror::Error;

use crate::rasterizer::RasterizerStateKind;

/// A projection parameter that would produce a degenerate matrix.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("aspect ratio must be positive and finite, got {0}")]
    InvalidAspect(f32),
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("vertical field of view must lie in (0, pi) radians, got {0}")]
    InvalidFov(f32),
}

/// Failure of a [`Volatile`](crate::Volatile) object to adopt new viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ResizeError {
    #[error("viewport has zero extent ({width}x{height})")]
    ZeroExtent { width: u32, height: u32 },
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// A scene component could not reach the entity state it depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("entity {0:?} has no Transform")]
    MissingTransform(Entity),
}

/// Rasterizer state creation failed; rendering cannot proceed.
#[derive(Debug, Error)]
pub enum RasterizerError {
    #[error("failed to create {kind} rasterizer state: {source}")]
    Creation {
        kind: RasterizerStateKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Fatal errors raised while bringing the editor up.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window creation failed: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface creation failed: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("device creation failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Rasterizer(#[from] RasterizerError),
    #[error("scene setup failed: {0}")]
    Component(#[from] ComponentError),
    #[error("scene setup failed: {0}")]
    Entity(#[from] hecs::NoSuchEntity),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
