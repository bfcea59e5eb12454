//! The editor window: event loop, frame loop and hotkeys.
//!
//! [`run`] opens a window, brings up the GPU context, the rasterizer state
//! registry and the scene pass (in that order; any failure is fatal), fills a
//! small demo world and then drives it until the window closes.
//!
//! Two cameras can look at the world. The *editor* camera is a free-fly
//! [`Camera`] steered with the mouse and WASD. The *scene* camera is a
//! [`CameraComponent`] living on an entity, following that entity's
//! [`Transform`].
//!
//! | Key        | Action                                     |
//! |------------|--------------------------------------------|
//! | F1         | Cycle rasterizer state                     |
//! | F2         | Toggle orthographic on the scene camera    |
//! | Tab        | Switch between editor and scene camera     |
//! | Arrows     | Rotate the scene camera's transform        |
//! | Escape     | Quit                                       |

use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use hecs::{Entity, World};
use winit::application::ApplicationHandler;
use winit::event::{MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::camera_component::CameraComponent;
use crate::ecs::RenderMesh;
use crate::error::EngineError;
use crate::freelook_camera::FreelookController;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::mesh::Mesh;
use crate::rasterizer::{RasterizerState, RasterizerStateKind, RasterizerStates};
use crate::scene_pass::{ScenePass, SceneView};
use crate::transform::Transform;
use crate::volatile::{Volatile, resize_all};

/// Scene camera turn rate for the arrow keys, radians per second.
const ARROW_TURN_RATE: f32 = 1.5;

/// Longest frame step fed to movement; larger gaps (window drags, breakpoints) are clamped.
const MAX_FRAME_DT: f32 = 0.1;

/// Window and startup settings for the editor.
#[derive(Clone, Debug)]
pub struct EditorConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub maximized: bool,
    pub clear_color: wgpu::Color,
    /// Rasterizer state selected at startup.
    pub rasterizer: RasterizerStateKind,
    /// Mouse movement below this many pixels per event is ignored.
    pub mouse_dead_zone: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title: "Vantage".to_string(),
            width: 1280,
            height: 720,
            maximized: false,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.06,
                b: 0.08,
                a: 1.0,
            },
            rasterizer: RasterizerStateKind::DefaultSolid,
            mouse_dead_zone: 2.5,
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn rasterizer(mut self, kind: RasterizerStateKind) -> Self {
        self.rasterizer = kind;
        self
    }

    pub fn mouse_dead_zone(mut self, pixels: f32) -> Self {
        self.mouse_dead_zone = pixels;
        self
    }
}

/// Which camera the frame is rendered through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveCamera {
    Editor,
    Scene,
}

impl ActiveCamera {
    pub fn toggled(self) -> Self {
        match self {
            Self::Editor => Self::Scene,
            Self::Scene => Self::Editor,
        }
    }
}

/// Opens the editor window and runs until it is closed.
///
/// Returns the first fatal error raised during startup, if any.
pub fn run(config: EditorConfig) -> Result<(), EngineError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = EditorApp {
        config,
        editor: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct EditorApp {
    config: EditorConfig,
    editor: Option<Editor>,
    error: Option<EngineError>,
}

struct Editor {
    window: Arc<Window>,
    title: String,
    gpu: GpuContext,
    rasterizer_states: RasterizerStates<RasterizerState>,
    scene: ScenePass,
    world: World,
    editor_camera: Camera,
    controller: FreelookController,
    scene_camera: Entity,
    active: ActiveCamera,
    rasterizer: RasterizerStateKind,
    clear_color: wgpu::Color,
    input: Input,
    last_frame: Instant,
    minimized: bool,
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.editor.is_some() || self.error.is_some() {
            return;
        }
        match Editor::new(event_loop, &self.config) {
            Ok(editor) => {
                log::info!("editor ready");
                editor.window.request_redraw();
                self.editor = Some(editor);
            }
            Err(e) => {
                log::error!("editor startup failed: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };

        editor.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                editor.resize(size.width, size.height);
            }
            WindowEvent::Focused(focused) => {
                log::debug!("window focus changed: {focused}");
                editor.input.set_enabled(focused);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now
                    .duration_since(editor.last_frame)
                    .as_secs_f32()
                    .min(MAX_FRAME_DT);
                editor.last_frame = now;

                if editor.input.key_pressed(KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }

                editor.update(dt);
                if !editor.minimized {
                    editor.render();
                }

                editor.input.begin_frame();
                editor.window.request_redraw();
            }
            _ => {}
        }
    }
}

impl Editor {
    fn new(event_loop: &ActiveEventLoop, config: &EditorConfig) -> Result<Self, EngineError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .with_maximized(config.maximized);
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let gpu = GpuContext::new(window.clone())?;
        let rasterizer_states = RasterizerStates::setup(&gpu.device)?;
        let mut scene = ScenePass::new(&gpu, &rasterizer_states);

        let mut world = World::new();
        populate_world(&mut world, &mut scene, &gpu.device);

        let scene_camera = world.spawn((Transform::from_position(Vec3::new(6.0, 4.0, -6.0))
            .rotation(Vec3::new(0.45, -FRAC_PI_4, 0.0)),));
        let component = CameraComponent::try_new(&world, scene_camera)?;
        world.insert_one(scene_camera, component)?;

        let mut editor = Self {
            window,
            title: config.title.clone(),
            gpu,
            rasterizer_states,
            scene,
            world,
            editor_camera: Camera::new(),
            controller: FreelookController::new().look_button(MouseButton::Right),
            scene_camera,
            active: ActiveCamera::Editor,
            rasterizer: config.rasterizer,
            clear_color: config.clear_color,
            input: Input::new().with_dead_zone(config.mouse_dead_zone),
            last_frame: Instant::now(),
            minimized: false,
        };
        editor.editor_camera.set_position(Vec3::new(0.0, 2.0, -8.0));

        let size = editor.window.inner_size();
        editor.resize(size.width, size.height);
        editor.refresh_title();
        Ok(editor)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::info!("window minimised; skipping resize");
            self.minimized = true;
            return;
        }
        self.minimized = false;

        let mut component = self.world.get::<&mut CameraComponent>(self.scene_camera).ok();
        let mut targets: Vec<&mut dyn Volatile> = Vec::with_capacity(4);
        targets.push(&mut self.gpu);
        targets.push(&mut self.scene);
        targets.push(&mut self.editor_camera);
        if let Some(component) = component.as_deref_mut() {
            targets.push(component);
        }
        if let Err(e) = resize_all(&mut targets, width, height) {
            log::warn!("resize to {width}x{height} incomplete: {e}");
        }
    }

    fn update(&mut self, dt: f32) {
        if self.input.key_pressed(KeyCode::F1) {
            self.rasterizer = self.rasterizer.next();
            log::info!("rasterizer state: {}", self.rasterizer);
            self.refresh_title();
        }
        if self.input.key_pressed(KeyCode::Tab) {
            self.active = self.active.toggled();
            log::info!("active camera: {:?}", self.active);
            self.refresh_title();
        }
        if self.input.key_pressed(KeyCode::F2) {
            if let Ok(mut component) = self.world.get::<&mut CameraComponent>(self.scene_camera) {
                let orthographic = !component.is_orthographic();
                component.set_orthographic(orthographic);
                log::info!("scene camera orthographic: {orthographic}");
            }
        }

        if self.active == ActiveCamera::Editor {
            self.controller
                .update(&mut self.editor_camera, &self.input, dt);
        }

        let turn = arrow_rotation(&self.input) * ARROW_TURN_RATE * dt;
        if turn != Vec3::ZERO {
            if let Ok(mut transform) = self.world.get::<&mut Transform>(self.scene_camera) {
                transform.rotate(turn);
            }
        }

        if let Ok(mut component) = self.world.get::<&mut CameraComponent>(self.scene_camera) {
            if let Err(e) = component.update(&self.world) {
                log::warn!("scene camera not updated: {e}");
            }
        }
    }

    fn render(&mut self) {
        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated; reconfiguring");
                self.gpu.reconfigure();
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };

        let Some(scene_view) = self.scene_view() else {
            log::warn!("active camera unavailable; skipping frame");
            return;
        };

        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Editor Frame Encoder"),
            });

        self.scene.render(
            &self.gpu,
            &mut encoder,
            &target,
            &self.world,
            &self.rasterizer_states,
            &scene_view,
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    fn scene_view(&self) -> Option<SceneView> {
        let (view, projection, eye) = match self.active {
            ActiveCamera::Editor => (
                self.editor_camera.view_matrix(),
                self.editor_camera.projection_matrix(),
                self.editor_camera.position(),
            ),
            ActiveCamera::Scene => {
                let component = self
                    .world
                    .get::<&CameraComponent>(self.scene_camera)
                    .ok()?;
                (
                    component.view_matrix(),
                    component.projection_matrix(),
                    component.position(),
                )
            }
        };
        Some(SceneView {
            view,
            projection,
            eye,
            rasterizer: self.rasterizer,
            clear_color: self.clear_color,
        })
    }

    fn refresh_title(&self) {
        let camera = match self.active {
            ActiveCamera::Editor => "editor camera",
            ActiveCamera::Scene => "scene camera",
        };
        self.window
            .set_title(&format!("{} [{camera} | {}]", self.title, self.rasterizer));
    }
}

/// Ground plane and a few boxes to look at.
fn populate_world(world: &mut World, scene: &mut ScenePass, device: &wgpu::Device) {
    let cube = scene.add_mesh(Mesh::cube(device));
    let plane = scene.add_mesh(Mesh::plane(device, 20.0));

    world.spawn((
        Transform::new(),
        RenderMesh::new(plane, [0.35, 0.38, 0.42, 1.0]),
    ));

    let boxes = [
        (Vec3::new(0.0, 0.5, 0.0), 0.0, [0.85, 0.35, 0.25, 1.0]),
        (Vec3::new(2.5, 0.75, 1.5), 0.6, [0.25, 0.6, 0.85, 1.0]),
        (Vec3::new(-2.0, 0.4, 2.5), -0.3, [0.4, 0.8, 0.35, 1.0]),
        (Vec3::new(-1.5, 1.5, -1.0), 1.1, [0.9, 0.8, 0.3, 1.0]),
    ];
    for (position, yaw, color) in boxes {
        let scale = position.y * 2.0;
        world.spawn((
            Transform::from_position(position)
                .rotation(Vec3::new(0.0, yaw, 0.0))
                .uniform_scale(scale),
            RenderMesh::new(cube, color),
        ));
    }
    world.spawn((
        Transform::from_position(Vec3::new(3.5, 1.5, -2.0)).scale(Vec3::new(0.5, 3.0, 0.5)),
        RenderMesh::new(cube, [0.75, 0.75, 0.8, 1.0]),
    ));
    log::debug!("spawned {} scene entities", world.len());
}

/// Euler delta direction `(pitch, yaw, 0)` from the arrow keys.
fn arrow_rotation(input: &Input) -> Vec3 {
    let mut turn = Vec3::ZERO;
    if input.key_down(KeyCode::ArrowUp) {
        turn.x -= 1.0;
    }
    if input.key_down(KeyCode::ArrowDown) {
        turn.x += 1.0;
    }
    if input.key_down(KeyCode::ArrowLeft) {
        turn.y -= 1.0;
    }
    if input.key_down(KeyCode::ArrowRight) {
        turn.y += 1.0;
    }
    turn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_overrides_defaults() {
        let config = EditorConfig::new()
            .title("Level 3")
            .size(640, 480)
            .maximized(true)
            .rasterizer(RasterizerStateKind::Wireframe)
            .mouse_dead_zone(0.0);
        assert_eq!(config.title, "Level 3");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(config.maximized);
        assert_eq!(config.rasterizer, RasterizerStateKind::Wireframe);
        assert_eq!(config.mouse_dead_zone, 0.0);
    }

    #[test]
    fn default_config_uses_solid_state_and_dead_zone() {
        let config = EditorConfig::default();
        assert_eq!(config.rasterizer, RasterizerStateKind::DefaultSolid);
        assert_eq!(config.mouse_dead_zone, 2.5);
    }

    #[test]
    fn active_camera_toggles_back_and_forth() {
        assert_eq!(ActiveCamera::Editor.toggled(), ActiveCamera::Scene);
        assert_eq!(ActiveCamera::Editor.toggled().toggled(), ActiveCamera::Editor);
    }

    #[test]
    fn arrows_map_to_pitch_and_yaw() {
        let mut input = Input::new();
        assert_eq!(arrow_rotation(&input), Vec3::ZERO);
        input.update_key(KeyCode::ArrowRight, true);
        input.update_key(KeyCode::ArrowDown, true);
        assert_eq!(arrow_rotation(&input), Vec3::new(1.0, 1.0, 0.0));
        input.update_key(KeyCode::ArrowUp, true);
        assert_eq!(arrow_rotation(&input), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn scene_camera_follows_rotated_transform() {
        let mut world = World::new();
        let entity = world.spawn((Transform::new(),));
        let component = CameraComponent::new(&world, entity);
        world.insert_one(entity, component).unwrap();

        world
            .get::<&mut Transform>(entity)
            .unwrap()
            .rotate(Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0));
        {
            let mut component = world.get::<&mut CameraComponent>(entity).unwrap();
            component.update(&world).unwrap();
        }
        let component = world.get::<&CameraComponent>(entity).unwrap();
        assert!(component.forward().abs_diff_eq(Vec3::X, 1e-5));
    }
}
