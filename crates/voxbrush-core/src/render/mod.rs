// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Renderer dispatch.
//!
//! A renderer turns the shared stroke list into draw calls for one viewport.
//! Strategies are siblings behind [`StrokeRenderer`]; none of them touches
//! stroke or camera data, so they can be swapped between frames.

mod boxes;
mod lines;

pub use boxes::BoxRenderer;
pub use lines::LineRenderer;

use glam::{Mat4, Vec3};
use thiserror::Error;
use tracing::info;
use voxbrush_geom::{OrthographicCamera, ViewportGeometry};

use crate::config::OverlayConfig;
use crate::gpu::{GpuError, GpuPort, ProgramId, ProgramSpec, RenderParams};
use crate::stroke::BrushStroke;

/// Everything a renderer receives for one viewport and frame.
#[derive(Clone, Copy, Debug)]
pub struct RenderFrame<'a> {
    /// Every stroke, oldest first.
    pub strokes: &'a [BrushStroke],
    /// Camera derived for this viewport this frame.
    pub camera: &'a OrthographicCamera,
    /// The viewport's uvw→world matrix.
    pub uvw_to_world: Mat4,
    /// Target rectangle.
    pub viewport: ViewportGeometry,
    /// Scoped GPU overrides.
    pub params: &'a RenderParams,
}

impl RenderFrame<'_> {
    /// uvw → clip for this viewport.
    pub fn uvw_to_device(&self) -> Mat4 {
        self.camera.world_to_device() * self.uvw_to_world
    }
}

/// What a render call produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Draw calls issued.
    pub draw_calls: usize,
    /// Vertices or instances submitted.
    pub primitives: usize,
}

/// Render failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The backend refused a call.
    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// A swappable drawing strategy.
pub trait StrokeRenderer {
    /// Display name used for selection.
    fn name(&self) -> &str;

    /// Draws `frame.strokes` into `frame.viewport`.
    fn render(
        &mut self,
        gpu: &mut dyn GpuPort,
        frame: &RenderFrame<'_>,
    ) -> Result<RenderStats, RenderError>;

    /// Frees backend resources held by the renderer.
    fn release(&mut self, gpu: &mut dyn GpuPort);
}

/// Builds `spec` on first use and caches the id.
fn ensure_program(
    slot: &mut Option<ProgramId>,
    gpu: &mut dyn GpuPort,
    spec: &ProgramSpec,
) -> Result<ProgramId, GpuError> {
    if let Some(id) = *slot {
        return Ok(id);
    }
    let id = gpu.build_program(spec)?;
    *slot = Some(id);
    Ok(id)
}

/// Voxel center in uvw space.
fn voxel_center(voxel: glam::IVec3) -> Vec3 {
    voxel.as_vec3() + Vec3::splat(0.5)
}

/// Selection errors.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No renderer with that name.
    #[error("unknown renderer `{0}`")]
    UnknownRenderer(String),
    /// A renderer with that name is already registered.
    #[error("renderer `{0}` is already registered")]
    DuplicateName(String),
}

/// Name → renderer map with exactly one active entry (when non-empty).
#[derive(Default)]
pub struct RendererRegistry {
    entries: Vec<Box<dyn StrokeRenderer>>,
    active: usize,
}

impl core::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("names", &self.names())
            .field("active", &self.active_name())
            .finish()
    }
}

impl RendererRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `boxes` and `lines`, activating `config.default_renderer`
    /// when it names one of them.
    pub fn with_defaults(config: &OverlayConfig) -> Self {
        let mut registry = Self::new();
        registry.entries.push(Box::new(BoxRenderer::new(config.highlight_slice)));
        registry.entries.push(Box::new(LineRenderer::new()));
        if registry.select(&config.default_renderer).is_err() {
            tracing::warn!(
                name = %config.default_renderer,
                "configured renderer not found; using boxes"
            );
        }
        registry
    }

    /// Adds a renderer. The first one registered becomes active.
    pub fn register(&mut self, renderer: Box<dyn StrokeRenderer>) -> Result<(), RegistryError> {
        if self.position(renderer.name()).is_some() {
            return Err(RegistryError::DuplicateName(renderer.name().to_owned()));
        }
        self.entries.push(renderer);
        Ok(())
    }

    /// Makes `name` the active renderer.
    pub fn select(&mut self, name: &str) -> Result<(), RegistryError> {
        let index = self
            .position(name)
            .ok_or_else(|| RegistryError::UnknownRenderer(name.to_owned()))?;
        if index != self.active {
            info!(from = ?self.active_name(), to = name, "renderer switched");
        }
        self.active = index;
        Ok(())
    }

    /// Name of the active renderer.
    pub fn active_name(&self) -> Option<&str> {
        self.entries.get(self.active).map(|r| r.name())
    }

    /// The active renderer.
    pub fn active_mut(&mut self) -> Option<&mut (dyn StrokeRenderer + 'static)> {
        self.entries.get_mut(self.active).map(|r| &mut **r)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|r| r.name()).collect()
    }

    /// Releases every renderer's backend resources.
    pub fn release_all(&mut self, gpu: &mut dyn GpuPort) {
        for renderer in &mut self.entries {
            renderer.release(gpu);
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|r| r.name() == name)
    }
}
