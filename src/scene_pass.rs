//! Depth-tested rendering of the ECS scene.
//!
//! [`ScenePass`] draws every entity that has both a [`Transform`] and a
//! [`RenderMesh`]. It bakes one render pipeline per entry of the
//! [`RasterizerStates`] registry, so switching fill or cull mode at runtime is
//! a pipeline lookup rather than a rebuild.
//!
//! # Bind groups
//!
//! - **Group 0**: camera uniforms (view/projection matrices, eye position)
//! - **Group 1**: model uniforms (model matrix, normal matrix, color), one
//!   slot per draw addressed with a dynamic offset
//!
//! # Depth buffer
//!
//! The pass owns a `Depth32Float` target matching the surface. It is
//! recreated through [`Volatile::on_resize`].

use std::collections::HashMap;
use std::num::NonZeroU64;

use glam::{Mat4, Vec3};
use hecs::World;

use crate::ecs::{MeshId, RenderMesh};
use crate::error::ResizeError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};
use crate::rasterizer::{RasterizerState, RasterizerStateKind, RasterizerStates};
use crate::transform::Transform;
use crate::volatile::{Volatile, require_extent};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 3],
    pub _padding: f32,
}

impl CameraUniforms {
    pub fn new(view: Mat4, proj: Mat4, eye: Vec3) -> Self {
        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            camera_pos: eye.to_array(),
            _padding: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ModelUniforms {
    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        // Inverse transpose keeps normals perpendicular under non-uniform scale.
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color,
        }
    }
}

/// A single mesh draw gathered from the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub mesh: MeshId,
    pub model: Mat4,
    pub color: [f32; 4],
}

/// Per-frame camera and rasterizer selection for [`ScenePass::render`].
#[derive(Clone, Copy, Debug)]
pub struct SceneView {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
    pub rasterizer: RasterizerStateKind,
    pub clear_color: wgpu::Color,
}

pub struct ScenePass {
    device: wgpu::Device,
    color_format: wgpu::TextureFormat,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    pipelines: HashMap<RasterizerStateKind, wgpu::RenderPipeline>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    model_capacity: usize,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    meshes: Vec<Mesh>,
    draws: Vec<DrawItem>,
}

impl ScenePass {
    pub fn new(gpu: &GpuContext, states: &RasterizerStates<RasterizerState>) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Camera Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Model Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
                },
                count: None,
            }],
        });

        let model_stride = aligned_stride(
            std::mem::size_of::<ModelUniforms>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let model_capacity = 16;
        let (model_buffer, model_bind_group) =
            create_model_slots(device, &model_layout, model_stride, model_capacity);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&camera_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let depth_view = create_depth_view(device, gpu.width(), gpu.height());

        let mut pass = Self {
            device: device.clone(),
            color_format: gpu.config.format,
            pipeline_layout,
            shader,
            pipelines: HashMap::new(),
            camera_buffer,
            camera_bind_group,
            model_layout,
            model_buffer,
            model_bind_group,
            model_stride,
            model_capacity,
            depth_view,
            depth_size: (gpu.width(), gpu.height()),
            meshes: Vec::new(),
            draws: Vec::new(),
        };
        pass.rebuild_pipelines(states);
        pass
    }

    /// Bakes one pipeline per rasterizer state. Call again after
    /// [`RasterizerStates::rebind`].
    pub fn rebuild_pipelines(&mut self, states: &RasterizerStates<RasterizerState>) {
        self.pipelines = states
            .iter()
            .map(|(kind, state)| (kind, self.create_pipeline(kind, state)))
            .collect();
        log::debug!("built {} scene pipelines", self.pipelines.len());
    }

    fn create_pipeline(
        &self,
        kind: RasterizerStateKind,
        state: &RasterizerState,
    ) -> wgpu::RenderPipeline {
        let label = format!("Scene Pipeline ({kind})");
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs"),
                    buffers: &[Vertex3d::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.color_format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: state.primitive(),
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    /// Takes ownership of a mesh and returns its handle.
    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Records and submits the scene into `target`.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        world: &World,
        states: &RasterizerStates<RasterizerState>,
        scene: &SceneView,
    ) {
        let camera = CameraUniforms::new(scene.view, scene.projection, scene.eye);
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));

        self.draws.clear();
        collect_draws(world, &mut self.draws);
        self.draws.retain(|draw| {
            let known = draw.mesh.0 < self.meshes.len();
            if !known {
                log::warn!("skipping draw with unknown {:?}", draw.mesh);
            }
            known
        });
        self.upload_models(gpu);

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(pipeline) = self.pipelines.get(&scene.rasterizer) else {
            log::warn!("no pipeline for {} rasterizer state", scene.rasterizer);
            return;
        };
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &self.camera_bind_group, &[]);

        if states.get(scene.rasterizer).scissor_enabled() {
            let (x, y, w, h) = scissor_rect(self.depth_size.0, self.depth_size.1);
            render_pass.set_scissor_rect(x, y, w, h);
        }

        for (slot, draw) in self.draws.iter().enumerate() {
            let mesh = &self.meshes[draw.mesh.0];
            let offset = (slot as u64 * self.model_stride) as u32;
            render_pass.set_bind_group(1, &self.model_bind_group, &[offset]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count(), 0, 0..1);
        }
    }

    fn upload_models(&mut self, gpu: &GpuContext) {
        if self.draws.len() > self.model_capacity {
            self.model_capacity = self.draws.len().next_power_of_two();
            let (buffer, bind_group) = create_model_slots(
                &self.device,
                &self.model_layout,
                self.model_stride,
                self.model_capacity,
            );
            self.model_buffer = buffer;
            self.model_bind_group = bind_group;
            log::debug!("grew model uniform slots to {}", self.model_capacity);
        }
        if self.draws.is_empty() {
            return;
        }

        let stride = self.model_stride as usize;
        let mut bytes = vec![0u8; stride * self.draws.len()];
        for (slot, draw) in self.draws.iter().enumerate() {
            let uniforms = ModelUniforms::new(draw.model, draw.color);
            let data = bytemuck::bytes_of(&uniforms);
            bytes[slot * stride..slot * stride + data.len()].copy_from_slice(data);
        }
        gpu.queue.write_buffer(&self.model_buffer, 0, &bytes);
    }
}

impl Volatile for ScenePass {
    fn on_resize(&mut self, width: u32, height: u32) -> Result<(), ResizeError> {
        require_extent(width, height)?;
        if self.depth_size != (width, height) {
            self.depth_view = create_depth_view(&self.device, width, height);
            self.depth_size = (width, height);
        }
        Ok(())
    }
}

/// Gathers every `(Transform, RenderMesh)` entity into `out`.
pub fn collect_draws(world: &World, out: &mut Vec<DrawItem>) {
    let mut query = world.query::<(&Transform, &RenderMesh)>();
    out.extend(query.iter().map(|(_, (transform, render))| DrawItem {
        mesh: render.mesh,
        model: transform.matrix(),
        color: render.color,
    }));
}

/// Rounds `size` up to a multiple of `alignment`.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

/// The centred region, half the viewport in each dimension, that the
/// scissor-test state clips to.
pub fn scissor_rect(width: u32, height: u32) -> (u32, u32, u32, u32) {
    let w = (width / 2).max(1);
    let h = (height / 2).max(1);
    ((width - w) / 2, (height - h) / 2, w, h)
}

fn create_model_slots(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Model Uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Model Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ModelUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layouts_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniforms>(), 208);
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 144);
    }

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(144, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(144, 0), 144);
    }

    #[test]
    fn scissor_is_centred_half_viewport() {
        assert_eq!(scissor_rect(800, 600), (200, 150, 400, 300));
        assert_eq!(scissor_rect(1, 1), (0, 0, 1, 1));
    }

    #[test]
    fn collect_draws_needs_transform_and_mesh() {
        let mut world = World::new();
        let placed = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        world.spawn((placed, RenderMesh::new(MeshId(0), [1.0, 0.0, 0.0, 1.0])));
        world.spawn((Transform::new(),));
        world.spawn((RenderMesh::new(MeshId(1), [0.0; 4]),));

        let mut draws = Vec::new();
        collect_draws(&world, &mut draws);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].mesh, MeshId(0));
        assert_eq!(draws[0].model, placed.matrix());
    }

    #[test]
    fn camera_uniforms_store_proj_times_view() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        let proj = Mat4::from_scale(Vec3::splat(2.0));
        let uniforms = CameraUniforms::new(view, proj, Vec3::ZERO);
        assert_eq!(
            Mat4::from_cols_array_2d(&uniforms.view_proj),
            proj * view
        );
    }

    #[test]
    fn singular_model_falls_back_to_identity_normals() {
        let uniforms = ModelUniforms::new(Mat4::from_scale(Vec3::ZERO), [1.0; 4]);
        assert_eq!(
            Mat4::from_cols_array_2d(&uniforms.normal_matrix),
            Mat4::IDENTITY
        );
    }
}
