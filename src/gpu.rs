//! Core GPU context and device management.
//!
//! [`GpuContext`] owns the wgpu surface, device and queue for the editor
//! window. It is created once at startup and handed by reference to every
//! render pass. On resize it reconfigures the swap chain through
//! [`Volatile`].

use std::sync::Arc;

use winit::window::Window;

use crate::error::{EngineError, ResizeError};
use crate::volatile::{Volatile, require_extent};

/// Optional device features the editor asks for when the adapter has them.
///
/// Wireframe fill needs `POLYGON_MODE_LINE`; turning depth clipping off needs
/// `DEPTH_CLIP_CONTROL`. Rasterizer states that depend on a missing feature
/// fail at creation time instead of at draw time.
pub const OPTIONAL_FEATURES: [wgpu::Features; 2] = [
    wgpu::Features::POLYGON_MODE_LINE,
    wgpu::Features::DEPTH_CLIP_CONTROL,
];

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames to the window.
    pub surface: wgpu::Surface<'static>,
    /// The logical GPU device for creating resources and pipelines.
    pub device: wgpu::Device,
    /// The command queue for submitting work to the GPU.
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Create a new GPU context from a winit window.
    ///
    /// Picks an adapter compatible with the window surface, requests a device
    /// with whichever of [`OPTIONAL_FEATURES`] the adapter supports, and
    /// configures the surface with an sRGB format and Fifo present mode.
    pub fn new(window: Arc<Window>) -> Result<Self, EngineError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let available = adapter.features();
        let mut required_features = wgpu::Features::empty();
        for feature in OPTIONAL_FEATURES {
            if available.contains(feature) {
                required_features = required_features | feature;
            } else {
                log::warn!("adapter lacks {feature:?}; dependent rasterizer states will fail");
            }
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Vantage Device"),
            required_features,
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(EngineError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::debug!(
            "surface configured {}x{} as {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Re-applies the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Returns the current surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Returns the current surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }
}

impl Volatile for GpuContext {
    fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError> {
        require_extent(width, height)?;
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
        Ok(())
    }
}
