// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-viewport bridge between a host sub-viewport and the overlay.
//!
//! Each frame the controller re-reads the adapter, derives an orthographic
//! camera that reproduces the host's view of the data, and uses it both to
//! map pointer offsets down to voxels and to hand renderers a camera.

use core::fmt;

use glam::{IVec3, Vec3};
use thiserror::Error;
use tracing::{debug, warn};
use voxbrush_geom::{
    CameraError, OrthographicCamera, TransformError, UvwFrame, ViewVolume, ViewportGeometry,
};

use crate::adapter::{CameraPose, OverlaySurface, ViewportAdapter, ViewportSlot};
use crate::collection::{StrokeId, StrokeOwner};
use crate::config::OverlayConfig;
use crate::gpu::{GpuPort, RenderParams};
use crate::input::{Button, PaintOutcome, PaintState, PointerEvent, PointerKind};
use crate::render::{RenderError, RenderFrame, RenderStats, StrokeRenderer};
use crate::stroke::{voxel_of, BrushStroke, StrokeError};

/// Position of a controller in the current layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewportId(pub usize);

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewport#{}", self.0)
    }
}

/// Why a viewport could not be used this frame.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ViewportError {
    /// Zero width or height; the host is probably relaying out.
    #[error("degenerate viewport geometry {width}x{height}")]
    DegenerateGeometry {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
    /// Zoom is zero, negative or not finite.
    #[error("invalid zoom {0} px/nm")]
    BadZoom(f32),
    /// The uvw→world matrix is not usable.
    #[error(transparent)]
    Transform(#[from] TransformError),
    /// The derived camera is invalid.
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// The pointer maps outside the addressable voxel range.
    #[error(transparent)]
    Voxel(#[from] StrokeError),
    /// The renderer failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ViewportError {
    /// True when the adapter broke its contract (skip the viewport quietly);
    /// false for backend failures.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, Self::Render(_))
    }
}

/// Pointer handling errors surfaced to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PaintError {
    /// No controller with that id in the current layout.
    #[error("unknown {0}")]
    UnknownViewport(ViewportId),
    /// The stroke being painted was removed mid-drag.
    #[error("{0} was removed while painting")]
    StrokeGone(StrokeId),
    /// The stroke rejected the voxel (capacity).
    #[error(transparent)]
    Stroke(#[from] StrokeError),
}

/// Per-frame snapshot of everything derived from the adapter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivedView {
    /// Pixel placement.
    pub geometry: ViewportGeometry,
    /// Validated uvw→world frame.
    pub frame: UvwFrame,
    /// Host camera pose (uvw).
    pub pose: CameraPose,
    /// Orthographic camera reproducing the host view.
    pub camera: OrthographicCamera,
}

impl DerivedView {
    /// Pointer offset → clip space.
    pub fn pointer_to_clip(&self, event: &PointerEvent) -> Vec3 {
        self.geometry
            .offset_to_clip(event.offset)
            .unwrap_or(Vec3::ZERO)
    }

    /// Pointer offset → world space.
    pub fn pointer_to_world(&self, event: &PointerEvent) -> Vec3 {
        self.camera
            .device_to_world()
            .project_point3(self.pointer_to_clip(event))
    }

    /// Pointer offset → uvw space.
    pub fn pointer_to_uvw(&self, event: &PointerEvent) -> Vec3 {
        self.frame.point_to_uvw(self.pointer_to_world(event))
    }
}

/// Controller for one host sub-viewport.
pub struct ViewportController {
    id: ViewportId,
    adapter: Box<dyn ViewportAdapter>,
    surface: Box<dyn OverlaySurface>,
    state: PaintState,
    depth_half_range: f32,
}

impl fmt::Debug for ViewportController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewportController")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("depth_half_range", &self.depth_half_range)
            .finish_non_exhaustive()
    }
}

impl ViewportController {
    /// Wraps a slot.
    pub fn new(id: ViewportId, slot: ViewportSlot, config: &OverlayConfig) -> Self {
        Self {
            id,
            adapter: slot.adapter,
            surface: slot.surface,
            state: PaintState::Idle,
            depth_half_range: config.depth_half_range,
        }
    }

    /// Layout position.
    pub fn id(&self) -> ViewportId {
        self.id
    }

    /// Current paint state.
    pub fn state(&self) -> PaintState {
        self.state
    }

    /// The host adapter.
    pub fn adapter(&self) -> &dyn ViewportAdapter {
        self.adapter.as_ref()
    }

    /// The host adapter, for camera snapping.
    pub fn adapter_mut(&mut self) -> &mut dyn ViewportAdapter {
        self.adapter.as_mut()
    }

    /// Polls the adapter and derives this frame's camera.
    ///
    /// The volume spans `overlay_pixels / zoom` world units on x and y and
    /// `±depth_half_range` (widened to one voxel diagonal) in depth. Position
    /// and orientation are the host pose carried through the uvw→world frame.
    pub fn derive_view(&self) -> Result<DerivedView, ViewportError> {
        let geometry = self.adapter.geometry();
        if geometry.is_degenerate() {
            return Err(ViewportError::DegenerateGeometry {
                width: geometry.width,
                height: geometry.height,
            });
        }
        let zoom = self.adapter.zoom_in_pixels_per_nm();
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(ViewportError::BadZoom(zoom));
        }
        let frame = UvwFrame::try_new(self.adapter.uvw_to_world())?;
        let pose = self.adapter.camera_pose_in_uvw();

        let extent = geometry.size() / zoom;
        let half_depth = self.depth_half_range.max(frame.voxel_diagonal());
        let mut camera =
            OrthographicCamera::new(ViewVolume::symmetric(extent.x * 0.5, extent.y * 0.5, half_depth))?;
        camera.set_pose(
            frame.point_to_world(pose.position_uvw),
            frame.orientation_to_world(pose.orientation_uvw),
        )?;
        debug!(viewport = %self.id, ?geometry, zoom, "camera derived");
        Ok(DerivedView {
            geometry,
            frame,
            pose,
            camera,
        })
    }

    /// Camera for this frame.
    pub fn derive_camera(&self) -> Result<OrthographicCamera, ViewportError> {
        Ok(self.derive_view()?.camera)
    }

    /// Pointer offset → clip space (`z = 0`, y flipped).
    pub fn pointer_to_clip(&self, event: &PointerEvent) -> Result<Vec3, ViewportError> {
        Ok(self.derive_view()?.pointer_to_clip(event))
    }

    /// Pointer offset → world space.
    pub fn pointer_to_world(&self, event: &PointerEvent) -> Result<Vec3, ViewportError> {
        Ok(self.derive_view()?.pointer_to_world(event))
    }

    /// Pointer offset → uvw space.
    pub fn pointer_to_uvw(&self, event: &PointerEvent) -> Result<Vec3, ViewportError> {
        Ok(self.derive_view()?.pointer_to_uvw(event))
    }

    /// Pointer offset → voxel (componentwise floor of uvw).
    pub fn pointer_to_voxel(&self, event: &PointerEvent) -> Result<IVec3, ViewportError> {
        Ok(voxel_of(self.pointer_to_uvw(event)?)?)
    }

    /// Feeds one pointer event through the paint state machine.
    ///
    /// Events on an unusable viewport are ignored (with a diagnostic) rather
    /// than failing; stroke capacity errors are returned.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        owner: &mut dyn StrokeOwner,
    ) -> Result<PaintOutcome, PaintError> {
        match (event.kind, self.state) {
            (PointerKind::Down, state) => {
                if event.button != Button::Primary {
                    return Ok(PaintOutcome::Ignored);
                }
                if let PaintState::Painting { stroke } = state {
                    debug!(viewport = %self.id, %stroke, "pointer-up missed; stroke frozen");
                    self.state = PaintState::Idle;
                }
                let Some(view) = self.usable_view() else {
                    return Ok(PaintOutcome::Ignored);
                };
                let id = owner.begin_stroke(
                    view.pointer_to_uvw(event),
                    view.pose.orientation_uvw,
                )?;
                self.state = PaintState::Painting { stroke: id };
                Ok(PaintOutcome::Started(id))
            }
            (PointerKind::Move, PaintState::Painting { stroke }) => {
                let Some(view) = self.usable_view() else {
                    return Ok(PaintOutcome::Ignored);
                };
                let Some(target) = owner.stroke_mut(stroke) else {
                    self.state = PaintState::Idle;
                    return Err(PaintError::StrokeGone(stroke));
                };
                let appended = target.add_voxel(view.pointer_to_uvw(event)).map_err(|err| {
                    warn!(viewport = %self.id, %stroke, %err, "voxel rejected");
                    err
                })?;
                Ok(PaintOutcome::Extended { stroke, appended })
            }
            (PointerKind::Up, PaintState::Painting { stroke }) => {
                if event.button != Button::Primary {
                    return Ok(PaintOutcome::Ignored);
                }
                self.state = PaintState::Idle;
                Ok(PaintOutcome::Finished(stroke))
            }
            (PointerKind::Move | PointerKind::Up, PaintState::Idle) => Ok(PaintOutcome::Ignored),
        }
    }

    /// Places the overlay element over the viewport and draws every stroke
    /// with `renderer`.
    pub fn render(
        &mut self,
        strokes: &[BrushStroke],
        renderer: &mut dyn StrokeRenderer,
        gpu: &mut dyn GpuPort,
        params: &RenderParams,
    ) -> Result<RenderStats, ViewportError> {
        let view = match self.derive_view() {
            Ok(view) => view,
            Err(err) => {
                self.surface.hide();
                return Err(err);
            }
        };
        let injection = self.adapter.injection_params();
        self.surface.place(view.geometry, injection.as_ref());

        let frame = RenderFrame {
            strokes,
            camera: &view.camera,
            uvw_to_world: view.frame.uvw_to_world(),
            viewport: view.geometry,
            params,
        };
        Ok(renderer.render(gpu, &frame)?)
    }

    fn usable_view(&self) -> Option<DerivedView> {
        match self.derive_view() {
            Ok(view) => Some(view),
            Err(err @ ViewportError::DegenerateGeometry { .. }) => {
                debug!(viewport = %self.id, %err, "pointer ignored");
                None
            }
            Err(err) => {
                warn!(viewport = %self.id, %err, "pointer ignored");
                None
            }
        }
    }
}
