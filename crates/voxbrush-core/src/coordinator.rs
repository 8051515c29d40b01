// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One coordinator per host viewer.
//!
//! Owns a controller per sub-viewport and the renderer registry, fans pointer
//! events out by viewport and draws every stroke into every viewport each
//! frame. A viewport that cannot be drawn is reported and skipped; it never
//! stops the others.

use glam::Vec3;
use tracing::{debug, info, instrument, warn};

use crate::adapter::{HostViewer, ViewportSlot};
use crate::collection::StrokeOwner;
use crate::config::OverlayConfig;
use crate::controller::{PaintError, ViewportController, ViewportError, ViewportId};
use crate::gpu::{GpuPort, RenderParams};
use crate::input::{PaintOutcome, PointerEvent};
use crate::render::{RegistryError, RenderStats, RendererRegistry};
use crate::stroke::BrushStroke;

/// Per-viewport outcome of [`OverlayCoordinator::render_frame`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Renderer used, if any was active.
    pub renderer: Option<String>,
    /// Viewports drawn, with what was submitted.
    pub rendered: Vec<(ViewportId, RenderStats)>,
    /// Viewports whose adapter broke its contract this frame.
    pub skipped: Vec<(ViewportId, ViewportError)>,
    /// Viewports whose backend failed.
    pub failed: Vec<(ViewportId, ViewportError)>,
}

impl FrameReport {
    /// True when every viewport was drawn.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

/// Drives every sub-viewport of one host viewer.
#[derive(Debug)]
pub struct OverlayCoordinator {
    controllers: Vec<ViewportController>,
    config: OverlayConfig,
    params: RenderParams,
    renderers: RendererRegistry,
}

impl OverlayCoordinator {
    /// Coordinator with the built-in renderers and no viewports yet.
    pub fn new(config: OverlayConfig) -> Self {
        let renderers = RendererRegistry::with_defaults(&config);
        Self::with_registry(config, renderers)
    }

    /// Coordinator with a caller-assembled renderer registry.
    pub fn with_registry(config: OverlayConfig, renderers: RendererRegistry) -> Self {
        Self {
            controllers: Vec::new(),
            params: config.render_params(),
            config,
            renderers,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Render params applied to every viewport.
    pub fn render_params(&self) -> &RenderParams {
        &self.params
    }

    /// Replaces the per-call GPU overrides.
    pub fn set_render_params(&mut self, params: RenderParams) {
        self.params = params;
    }

    /// Renderer registry.
    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    /// Renderer registry, for registering custom strategies.
    pub fn renderers_mut(&mut self) -> &mut RendererRegistry {
        &mut self.renderers
    }

    /// Switches the active renderer. Takes effect on the next frame; stroke
    /// and camera data are untouched.
    pub fn select_renderer(&mut self, name: &str) -> Result<(), RegistryError> {
        self.renderers.select(name)
    }

    /// Controllers in layout order.
    pub fn controllers(&self) -> &[ViewportController] {
        &self.controllers
    }

    /// Looks up a controller.
    pub fn controller(&self, id: ViewportId) -> Option<&ViewportController> {
        self.controllers.get(id.0)
    }

    /// Replaces every controller with one per slot.
    ///
    /// Drags in progress are dropped; their strokes stay as painted.
    #[instrument(skip_all, fields(viewports = slots.len()))]
    pub fn rebuild(&mut self, slots: Vec<ViewportSlot>) {
        let config = &self.config;
        self.controllers = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| ViewportController::new(ViewportId(i), slot, config))
            .collect();
        info!("viewport controllers rebuilt");
    }

    /// Rebuilds when the host reports a layout change or its viewport count
    /// no longer matches. Returns whether a rebuild happened.
    pub fn sync_layout(&mut self, host: &mut dyn HostViewer) -> bool {
        let notified = host.take_layout_changed();
        let count = host.viewport_count();
        if !notified && count == self.controllers.len() {
            return false;
        }
        debug!(notified, count, current = self.controllers.len(), "layout changed");
        self.rebuild(host.viewport_slots());
        true
    }

    /// Routes a pointer event to one viewport.
    pub fn handle_pointer(
        &mut self,
        viewport: ViewportId,
        event: &PointerEvent,
        owner: &mut dyn StrokeOwner,
    ) -> Result<PaintOutcome, PaintError> {
        let controller = self
            .controllers
            .get_mut(viewport.0)
            .ok_or(PaintError::UnknownViewport(viewport))?;
        controller.handle_pointer(event, owner)
    }

    /// Draws `strokes` into every viewport with the active renderer.
    #[instrument(skip_all, fields(viewports = self.controllers.len(), strokes = strokes.len()))]
    pub fn render_frame(&mut self, gpu: &mut dyn GpuPort, strokes: &[BrushStroke]) -> FrameReport {
        let mut report = FrameReport {
            renderer: self.renderers.active_name().map(str::to_owned),
            ..FrameReport::default()
        };
        let Some(renderer) = self.renderers.active_mut() else {
            warn!("no renderer registered; frame dropped");
            return report;
        };
        for controller in &mut self.controllers {
            let id = controller.id();
            match controller.render(strokes, renderer, gpu, &self.params) {
                Ok(stats) => report.rendered.push((id, stats)),
                Err(err @ ViewportError::DegenerateGeometry { .. }) => {
                    debug!(viewport = %id, %err, "viewport skipped mid-relayout");
                    report.skipped.push((id, err));
                }
                Err(err) if err.is_contract_violation() => {
                    warn!(viewport = %id, %err, "viewport skipped");
                    report.skipped.push((id, err));
                }
                Err(err) => {
                    warn!(viewport = %id, %err, "viewport render failed");
                    report.failed.push((id, err));
                }
            }
        }
        report
    }

    /// Snaps every viewport that supports it to the stroke's first voxel,
    /// looking along the orientation the stroke was painted with. Returns the
    /// number of viewports that moved.
    pub fn focus_stroke(&mut self, stroke: &BrushStroke) -> usize {
        let first = stroke.first_voxel();
        let position = first.as_vec3() + Vec3::splat(0.5);
        let orientation = stroke.camera_orientation();
        let mut moved = 0;
        for controller in &mut self.controllers {
            if controller.adapter_mut().snap_camera_to(position, orientation) {
                moved += 1;
            }
        }
        debug!(moved, ?first, "focused stroke");
        moved
    }

    /// Releases every renderer's backend resources.
    pub fn release(&mut self, gpu: &mut dyn GpuPort) {
        self.renderers.release_all(gpu);
    }
}
