// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Host-facing ports.
//!
//! The overlay never owns the host viewer. It polls these traits once per
//! frame and treats every answer as a read-only snapshot. Concrete adapters
//! (single-panel image viewers, multi-panel slice viewers) live with the host
//! integration and are chosen when the coordinator is built.

use glam::{Mat4, Quat, Vec3};
use voxbrush_geom::ViewportGeometry;

/// Camera pose in the host's uvw space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Camera position (uvw).
    pub position_uvw: Vec3,
    /// Camera orientation (uvw).
    pub orientation_uvw: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position_uvw: Vec3::ZERO,
            orientation_uvw: Quat::IDENTITY,
        }
    }
}

/// Where the host wants the overlay element placed in its z-order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InjectionParams {
    /// Stacking order for the overlay element.
    pub z_index: i32,
    /// Sibling element the overlay should be inserted before, if any.
    pub insert_before: Option<String>,
}

/// One host sub-viewport, as seen by the overlay.
pub trait ViewportAdapter {
    /// Pixel placement inside the tracked host element.
    fn geometry(&self) -> ViewportGeometry;

    /// Camera pose in uvw space.
    fn camera_pose_in_uvw(&self) -> CameraPose;

    /// uvw→world matrix. Must have at least one unit-scale axis.
    fn uvw_to_world(&self) -> Mat4;

    /// Screen pixels per world nanometer. Must be positive.
    fn zoom_in_pixels_per_nm(&self) -> f32;

    /// Moves the host camera. Returns false when the host cannot snap.
    fn snap_camera_to(&mut self, _position_uvw: Vec3, _orientation_uvw: Quat) -> bool {
        false
    }

    /// Optional z-order hint for the overlay element.
    fn injection_params(&self) -> Option<InjectionParams> {
        None
    }
}

/// The input-capturing element laid over one sub-viewport.
pub trait OverlaySurface {
    /// Resizes and repositions the element to cover `geometry` exactly.
    fn place(&mut self, geometry: ViewportGeometry, injection: Option<&InjectionParams>);

    /// Hides the element (degenerate geometry, teardown).
    fn hide(&mut self) {}
}

/// A sub-viewport adapter paired with its overlay element.
pub struct ViewportSlot {
    /// Host viewport.
    pub adapter: Box<dyn ViewportAdapter>,
    /// Overlay element covering it.
    pub surface: Box<dyn OverlaySurface>,
}

impl ViewportSlot {
    /// Pairs an adapter with its surface.
    pub fn new(adapter: Box<dyn ViewportAdapter>, surface: Box<dyn OverlaySurface>) -> Self {
        Self { adapter, surface }
    }
}

/// The host viewer as a whole: a source of sub-viewports.
pub trait HostViewer {
    /// Fresh slots for the current panel layout.
    fn viewport_slots(&mut self) -> Vec<ViewportSlot>;

    /// Number of sub-viewports currently shown.
    fn viewport_count(&self) -> usize;

    /// Layout-change subscription. Hosts that push notifications return true
    /// once per change; the default never reports, so the coordinator falls
    /// back to polling `viewport_count`.
    fn take_layout_changed(&mut self) -> bool {
        false
    }
}
