//! Shared rasterizer configurations.
//!
//! A renderer needs the same handful of rasterizer setups for every draw call:
//! solid geometry, wireframe overlays, double-sided geometry, inverted culling
//! and scissored UI. [`RasterizerStates`] creates all of them once against a
//! device and hands out shared references afterwards. It is an owned value,
//! not a global: the renderer constructs it at init time and passes it where
//! it is needed, and a device change goes through [`RasterizerStates::rebind`].
//!
//! Creation goes through the [`RasterizerDevice`] trait so the registry does
//! not care what a "state handle" is. For wgpu it is a [`RasterizerState`]
//! carrying the [`wgpu::PrimitiveState`] to bake into pipelines plus the
//! scissor flag the render pass must honour.

use std::fmt;

use thiserror::Error;

use crate::error::RasterizerError;

/// How triangles are filled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillMode {
    Solid,
    Wireframe,
}

/// Which triangle faces are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

/// Screen-space winding that marks a triangle as front-facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

/// Description of one rasterizer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RasterizerDesc {
    pub fill_mode: FillMode,
    pub cull_mode: CullMode,
    pub front_face: Winding,
    pub depth_clip: bool,
    pub scissor: bool,
}

impl RasterizerDesc {
    /// Solid fill, back-face culling, clockwise front faces, depth clipping on.
    pub const DEFAULT_SOLID: Self = Self {
        fill_mode: FillMode::Solid,
        cull_mode: CullMode::Back,
        front_face: Winding::Clockwise,
        depth_clip: true,
        scissor: false,
    };
}

impl Default for RasterizerDesc {
    fn default() -> Self {
        Self::DEFAULT_SOLID
    }
}

/// The fixed set of configurations held by [`RasterizerStates`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RasterizerStateKind {
    DefaultSolid,
    Wireframe,
    NoCull,
    CullFront,
    ScissorTest,
}

impl RasterizerStateKind {
    pub const ALL: [Self; 5] = [
        Self::DefaultSolid,
        Self::Wireframe,
        Self::NoCull,
        Self::CullFront,
        Self::ScissorTest,
    ];

    /// The description each kind is created from. All are variations of
    /// [`RasterizerDesc::DEFAULT_SOLID`].
    pub fn desc(self) -> RasterizerDesc {
        let base = RasterizerDesc::DEFAULT_SOLID;
        match self {
            Self::DefaultSolid => base,
            Self::Wireframe => RasterizerDesc {
                fill_mode: FillMode::Wireframe,
                ..base
            },
            Self::NoCull => RasterizerDesc {
                cull_mode: CullMode::None,
                ..base
            },
            Self::CullFront => RasterizerDesc {
                cull_mode: CullMode::Front,
                ..base
            },
            Self::ScissorTest => RasterizerDesc {
                scissor: true,
                ..base
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DefaultSolid => "DefaultSolid",
            Self::Wireframe => "Wireframe",
            Self::NoCull => "NoCull",
            Self::CullFront => "CullFront",
            Self::ScissorTest => "ScissorTest",
        }
    }

    /// The kind after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for RasterizerStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A device able to turn a [`RasterizerDesc`] into a state handle.
pub trait RasterizerDevice {
    type State;
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_rasterizer_state(&self, desc: &RasterizerDesc) -> Result<Self::State, Self::Error>;
}

/// One handle per [`RasterizerStateKind`], created together against a device.
#[derive(Debug)]
pub struct RasterizerStates<S> {
    default_solid: S,
    wireframe: S,
    no_cull: S,
    cull_front: S,
    scissor_test: S,
}

impl<S> RasterizerStates<S> {
    /// Creates every state against `device`.
    ///
    /// Fails on the first state the device cannot create; nothing is returned
    /// in that case, since rendering without the full set is meaningless.
    pub fn setup<D>(device: &D) -> Result<Self, RasterizerError>
    where
        D: RasterizerDevice<State = S>,
    {
        let create = |kind: RasterizerStateKind| {
            device
                .create_rasterizer_state(&kind.desc())
                .map_err(|e| RasterizerError::Creation {
                    kind,
                    source: Box::new(e),
                })
        };

        let states = Self {
            default_solid: create(RasterizerStateKind::DefaultSolid)?,
            wireframe: create(RasterizerStateKind::Wireframe)?,
            no_cull: create(RasterizerStateKind::NoCull)?,
            cull_front: create(RasterizerStateKind::CullFront)?,
            scissor_test: create(RasterizerStateKind::ScissorTest)?,
        };
        log::debug!("created {} rasterizer states", RasterizerStateKind::ALL.len());
        Ok(states)
    }

    /// Recreates the full set against a new device.
    ///
    /// The current handles are replaced only if every creation succeeds.
    pub fn rebind<D>(&mut self, device: &D) -> Result<(), RasterizerError>
    where
        D: RasterizerDevice<State = S>,
    {
        *self = Self::setup(device)?;
        Ok(())
    }

    pub fn get(&self, kind: RasterizerStateKind) -> &S {
        match kind {
            RasterizerStateKind::DefaultSolid => &self.default_solid,
            RasterizerStateKind::Wireframe => &self.wireframe,
            RasterizerStateKind::NoCull => &self.no_cull,
            RasterizerStateKind::CullFront => &self.cull_front,
            RasterizerStateKind::ScissorTest => &self.scissor_test,
        }
    }

    pub fn default_solid(&self) -> &S {
        &self.default_solid
    }

    pub fn wireframe(&self) -> &S {
        &self.wireframe
    }

    pub fn no_cull(&self) -> &S {
        &self.no_cull
    }

    pub fn cull_front(&self) -> &S {
        &self.cull_front
    }

    pub fn scissor_test(&self) -> &S {
        &self.scissor_test
    }

    /// Iterates `(kind, state)` pairs in [`RasterizerStateKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (RasterizerStateKind, &S)> {
        RasterizerStateKind::ALL
            .into_iter()
            .map(move |kind| (kind, self.get(kind)))
    }
}

/// A rasterizer configuration realised for wgpu.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterizerState {
    desc: RasterizerDesc,
    primitive: wgpu::PrimitiveState,
}

impl RasterizerState {
    pub fn desc(&self) -> &RasterizerDesc {
        &self.desc
    }

    /// Primitive state to bake into a render pipeline.
    pub fn primitive(&self) -> wgpu::PrimitiveState {
        self.primitive
    }

    /// Whether draws using this state must clip to a scissor rectangle.
    pub fn scissor_enabled(&self) -> bool {
        self.desc.scissor
    }
}

/// The device lacks a feature a rasterizer description depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("device is missing required feature {0:?}")]
pub struct MissingFeature(pub wgpu::Features);

/// Converts a description for a device exposing `features`.
pub fn primitive_state(
    desc: &RasterizerDesc,
    features: wgpu::Features,
) -> Result<wgpu::PrimitiveState, MissingFeature> {
    let polygon_mode = match desc.fill_mode {
        FillMode::Solid => wgpu::PolygonMode::Fill,
        FillMode::Wireframe => {
            require(features, wgpu::Features::POLYGON_MODE_LINE)?;
            wgpu::PolygonMode::Line
        }
    };
    if !desc.depth_clip {
        require(features, wgpu::Features::DEPTH_CLIP_CONTROL)?;
    }

    Ok(wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: match desc.front_face {
            Winding::Clockwise => wgpu::FrontFace::Cw,
            Winding::CounterClockwise => wgpu::FrontFace::Ccw,
        },
        cull_mode: match desc.cull_mode {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        },
        unclipped_depth: !desc.depth_clip,
        polygon_mode,
        conservative: false,
    })
}

fn require(features: wgpu::Features, needed: wgpu::Features) -> Result<(), MissingFeature> {
    if features.contains(needed) {
        Ok(())
    } else {
        Err(MissingFeature(needed))
    }
}

impl RasterizerDevice for wgpu::Device {
    type State = RasterizerState;
    type Error = MissingFeature;

    fn create_rasterizer_state(&self, desc: &RasterizerDesc) -> Result<RasterizerState, MissingFeature> {
        Ok(RasterizerState {
            desc: *desc,
            primitive: primitive_state(desc, self.features())?,
        })
    }
}
