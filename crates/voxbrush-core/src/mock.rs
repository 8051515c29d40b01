// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Headless doubles for the host and GPU ports.
//!
//! Adapters and surfaces are cheap handles over shared state so a test can
//! keep one copy, give another to the coordinator, and mutate or inspect the
//! host between frames. [`RecordingGpu`] logs every call instead of drawing.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};
use voxbrush_geom::ViewportGeometry;

use crate::adapter::{
    CameraPose, HostViewer, InjectionParams, OverlaySurface, ViewportAdapter, ViewportSlot,
};
use crate::gpu::{ColorVertex, DrawCall, GpuError, GpuPort, ProgramId, ProgramSpec, RenderParams};

/// Everything a [`StaticAdapter`] reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterState {
    /// Reported geometry.
    pub geometry: ViewportGeometry,
    /// Reported camera pose.
    pub pose: CameraPose,
    /// Reported uvw→world matrix.
    pub uvw_to_world: Mat4,
    /// Reported zoom (px/nm).
    pub zoom: f32,
    /// Whether snap requests are honored.
    pub can_snap: bool,
    /// Snap requests received, oldest first.
    pub snaps: Vec<(Vec3, Quat)>,
    /// Reported injection hint.
    pub injection: Option<InjectionParams>,
}

impl Default for AdapterState {
    fn default() -> Self {
        Self {
            geometry: ViewportGeometry::new(0, 0, 100, 100),
            pose: CameraPose::default(),
            uvw_to_world: Mat4::IDENTITY,
            zoom: 10.0,
            can_snap: true,
            snaps: Vec::new(),
            injection: None,
        }
    }
}

/// Adapter reporting whatever its shared [`AdapterState`] holds.
#[derive(Debug, Clone, Default)]
pub struct StaticAdapter {
    state: Rc<RefCell<AdapterState>>,
}

impl StaticAdapter {
    /// Adapter over `state`.
    pub fn new(state: AdapterState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Mutates the shared state.
    pub fn update(&self, f: impl FnOnce(&mut AdapterState)) {
        f(&mut self.state.borrow_mut());
    }

    /// Copy of the shared state.
    pub fn snapshot(&self) -> AdapterState {
        self.state.borrow().clone()
    }
}

impl ViewportAdapter for StaticAdapter {
    fn geometry(&self) -> ViewportGeometry {
        self.state.borrow().geometry
    }

    fn camera_pose_in_uvw(&self) -> CameraPose {
        self.state.borrow().pose
    }

    fn uvw_to_world(&self) -> Mat4 {
        self.state.borrow().uvw_to_world
    }

    fn zoom_in_pixels_per_nm(&self) -> f32 {
        self.state.borrow().zoom
    }

    fn snap_camera_to(&mut self, position_uvw: Vec3, orientation_uvw: Quat) -> bool {
        let mut state = self.state.borrow_mut();
        if !state.can_snap {
            return false;
        }
        state.pose = CameraPose {
            position_uvw,
            orientation_uvw,
        };
        state.snaps.push((position_uvw, orientation_uvw));
        true
    }

    fn injection_params(&self) -> Option<InjectionParams> {
        self.state.borrow().injection.clone()
    }
}

/// Something that happened to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Element placed over a rectangle.
    Placed(ViewportGeometry, Option<InjectionParams>),
    /// Element hidden.
    Hidden,
}

/// Surface that logs placements.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    events: Rc<RefCell<Vec<SurfaceEvent>>>,
}

impl RecordingSurface {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the log.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<SurfaceEvent> {
        self.events.borrow().last().cloned()
    }
}

impl OverlaySurface for RecordingSurface {
    fn place(&mut self, geometry: ViewportGeometry, injection: Option<&InjectionParams>) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Placed(geometry, injection.cloned()));
    }

    fn hide(&mut self) {
        self.events.borrow_mut().push(SurfaceEvent::Hidden);
    }
}

/// Host with a fixed list of viewports that can be changed between frames.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    /// Adapter/surface handles for each viewport.
    pub viewports: Vec<(StaticAdapter, RecordingSurface)>,
    /// Reported once by `take_layout_changed`.
    pub layout_changed: bool,
}

impl StaticHost {
    /// Host with `count` default viewports.
    pub fn with_viewports(count: usize) -> Self {
        Self {
            viewports: (0..count)
                .map(|_| (StaticAdapter::default(), RecordingSurface::new()))
                .collect(),
            layout_changed: false,
        }
    }
}

impl HostViewer for StaticHost {
    fn viewport_slots(&mut self) -> Vec<ViewportSlot> {
        self.viewports
            .iter()
            .map(|(adapter, surface)| {
                ViewportSlot::new(Box::new(adapter.clone()), Box::new(surface.clone()))
            })
            .collect()
    }

    fn viewport_count(&self) -> usize {
        self.viewports.len()
    }

    fn take_layout_changed(&mut self) -> bool {
        core::mem::take(&mut self.layout_changed)
    }
}

/// A draw captured by [`RecordingGpu`].
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    /// Program used.
    pub program: ProgramId,
    /// Viewport of the enclosing pass.
    pub viewport: ViewportGeometry,
    /// Transform passed with the draw.
    pub transform: Mat4,
    /// Copied vertex data.
    pub vertices: Vec<ColorVertex>,
}

/// A call captured by [`RecordingGpu`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuEvent {
    /// `build_program`.
    Build(ProgramId, ProgramSpec),
    /// `release_program`.
    Release(ProgramId),
    /// `begin_pass`.
    Begin(ViewportGeometry, RenderParams),
    /// `draw`.
    Draw(DrawRecord),
    /// `end_pass`.
    End,
}

/// GPU port that records calls and enforces pass discipline.
#[derive(Debug, Default)]
pub struct RecordingGpu {
    /// Every call, in order.
    pub events: Vec<GpuEvent>,
    /// When set, every draw fails with a backend error.
    pub fail_draws: bool,
    live: Vec<ProgramId>,
    next: u32,
    pass: Option<ViewportGeometry>,
}

impl RecordingGpu {
    /// Fresh recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder whose draws all fail with a backend error.
    pub fn failing() -> Self {
        Self {
            fail_draws: true,
            ..Self::default()
        }
    }

    /// Captured draws, in order.
    pub fn draws(&self) -> Vec<&DrawRecord> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GpuEvent::Draw(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Viewports of every pass opened, in order.
    pub fn passes(&self) -> Vec<ViewportGeometry> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GpuEvent::Begin(viewport, _) => Some(*viewport),
                _ => None,
            })
            .collect()
    }

    /// True while a pass is open.
    pub fn in_pass(&self) -> bool {
        self.pass.is_some()
    }

    /// Programs built and not yet released.
    pub fn live_programs(&self) -> &[ProgramId] {
        &self.live
    }

    /// Forgets recorded events; programs stay live.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl GpuPort for RecordingGpu {
    fn build_program(&mut self, spec: &ProgramSpec) -> Result<ProgramId, GpuError> {
        let id = ProgramId(self.next);
        self.next += 1;
        self.live.push(id);
        self.events.push(GpuEvent::Build(id, *spec));
        Ok(id)
    }

    fn release_program(&mut self, program: ProgramId) {
        self.live.retain(|&p| p != program);
        self.events.push(GpuEvent::Release(program));
    }

    fn begin_pass(
        &mut self,
        viewport: ViewportGeometry,
        params: &RenderParams,
    ) -> Result<(), GpuError> {
        if self.pass.is_some() {
            return Err(GpuError::PassAlreadyActive);
        }
        self.pass = Some(viewport);
        self.events.push(GpuEvent::Begin(viewport, *params));
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError> {
        let Some(viewport) = self.pass else {
            return Err(GpuError::NoActivePass);
        };
        if !self.live.contains(&call.program) {
            return Err(GpuError::UnknownProgram(call.program));
        }
        if self.fail_draws {
            return Err(GpuError::Backend("injected draw failure".into()));
        }
        self.events.push(GpuEvent::Draw(DrawRecord {
            program: call.program,
            viewport,
            transform: call.transform,
            vertices: call.vertices.to_vec(),
        }));
        Ok(())
    }

    fn end_pass(&mut self) {
        self.pass = None;
        self.events.push(GpuEvent::End);
    }
}
