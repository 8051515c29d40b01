// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! GPU boundary.
//!
//! Renderers speak only in the closed enums below; a backend maps them to
//! native constants once, in its own conversion layer. There is no global
//! binding state: a pass is opened with [`PassScope::begin`] and closed when
//! the scope drops, on every exit path.

use glam::Mat4;
use thiserror::Error;
use voxbrush_geom::ViewportGeometry;

/// Primitive assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Independent triangles.
    TriangleList,
    /// Independent segments.
    LineList,
    /// Connected segments through consecutive vertices.
    LineStrip,
    /// Points.
    PointList,
}

/// Color blending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Overwrite the target.
    Replace,
    /// Standard `src_alpha, 1 - src_alpha`.
    #[default]
    Alpha,
    /// Premultiplied alpha.
    PremultipliedAlpha,
    /// Additive.
    Additive,
}

/// Face culling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Draw both faces.
    #[default]
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    Back,
}

/// Depth comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DepthTest {
    /// No depth testing.
    #[default]
    Disabled,
    /// Pass when closer.
    Less,
    /// Pass when closer or equal.
    LessEqual,
    /// Always pass (depth still written when enabled).
    Always,
}

/// Stencil behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StencilMode {
    /// Stencil untouched.
    #[default]
    Disabled,
    /// Replace stencil with `reference` wherever drawn.
    Write {
        /// Value written.
        reference: u32,
    },
    /// Draw only where stencil equals `reference`.
    Equal {
        /// Value compared against.
        reference: u32,
    },
}

/// Fixed-function state for one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PipelineState {
    /// Blending.
    pub blend: BlendMode,
    /// Culling.
    pub cull: CullMode,
    /// Depth comparison.
    pub depth: DepthTest,
    /// Whether depth is written.
    pub depth_write: bool,
    /// Stencil.
    pub stencil: StencilMode,
}

/// GPU state overrides scoped to a single render call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderParams {
    /// Scissor rectangle; `None` scissors to the viewport.
    pub scissor: Option<ViewportGeometry>,
    /// RGBA clear color; `None` keeps the host's pixels.
    pub clear: Option<[f32; 4]>,
    /// Blend/cull/depth/stencil.
    pub state: PipelineState,
}

impl RenderParams {
    /// Effective scissor for a viewport: the explicit rectangle clipped to the
    /// viewport, or the viewport itself.
    pub fn scissor_for(&self, viewport: ViewportGeometry) -> ViewportGeometry {
        let Some(s) = self.scissor else {
            return viewport;
        };
        let left = s.left.max(viewport.left);
        let bottom = s.bottom.max(viewport.bottom);
        let right = s.left.saturating_add_unsigned(s.width).min(
            viewport.left.saturating_add_unsigned(viewport.width),
        );
        let top = s.bottom.saturating_add_unsigned(s.height).min(
            viewport.bottom.saturating_add_unsigned(viewport.height),
        );
        ViewportGeometry::new(
            left,
            bottom,
            right.saturating_sub(left).max(0).unsigned_abs(),
            top.saturating_sub(bottom).max(0).unsigned_abs(),
        )
    }
}

/// Built-in meshes a program can instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Unit cube spanning `[0, 1]^3`, drawn as triangles.
    UnitCube,
}

/// Everything a backend needs to build a program.
///
/// Shared by every renderer; variants differ only in the values they put here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramSpec {
    /// Debug label.
    pub label: &'static str,
    /// Primitive assembly.
    pub topology: Topology,
    /// When set, vertices are per-instance offsets into this mesh.
    pub mesh: Option<MeshKind>,
}

/// Backend handle to a built program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramId(pub u32);

/// Vertex (or instance) record: uvw position plus RGBA tint.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    /// Position in uvw space.
    pub position: [f32; 3],
    /// Linear RGBA.
    pub color: [f32; 4],
}

/// One draw inside an open pass.
#[derive(Clone, Copy, Debug)]
pub struct DrawCall<'a> {
    /// Program to draw with.
    pub program: ProgramId,
    /// uvw → clip (`world_to_device · uvw_to_world`).
    pub transform: Mat4,
    /// Vertices, or instances when the program has a mesh.
    pub vertices: &'a [ColorVertex],
}

/// Backend failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GpuError {
    /// The program id was never built or was released.
    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramId),
    /// `draw` outside an open pass.
    #[error("draw issued with no active pass")]
    NoActivePass,
    /// `begin_pass` while another pass is open.
    #[error("a pass is already active")]
    PassAlreadyActive,
    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Rendering port implemented by GPU backends (and by test doubles).
pub trait GpuPort {
    /// Builds a program from a shared spec.
    fn build_program(&mut self, spec: &ProgramSpec) -> Result<ProgramId, GpuError>;

    /// Frees a program. Unknown ids are ignored.
    fn release_program(&mut self, program: ProgramId);

    /// Opens a pass: sets the viewport and applies `params`.
    fn begin_pass(
        &mut self,
        viewport: ViewportGeometry,
        params: &RenderParams,
    ) -> Result<(), GpuError>;

    /// Records a draw in the open pass.
    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError>;

    /// Closes the pass and restores whatever `begin_pass` overrode.
    fn end_pass(&mut self);
}

/// An open pass. Dropping it calls [`GpuPort::end_pass`].
pub struct PassScope<'g, G: GpuPort + ?Sized> {
    gpu: &'g mut G,
}

impl<'g, G: GpuPort + ?Sized> PassScope<'g, G> {
    /// Opens a pass on `gpu`.
    pub fn begin(
        gpu: &'g mut G,
        viewport: ViewportGeometry,
        params: &RenderParams,
    ) -> Result<Self, GpuError> {
        gpu.begin_pass(viewport, params)?;
        Ok(Self { gpu })
    }

    /// Records a draw.
    pub fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError> {
        self.gpu.draw(call)
    }
}

impl<G: GpuPort + ?Sized> Drop for PassScope<'_, G> {
    fn drop(&mut self) {
        self.gpu.end_pass();
    }
}
