// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Multi-viewport behavior: layout sync, per-viewport isolation and renderer
//! swaps.

use glam::{IVec3, Quat, Vec3};
use voxbrush_core::mock::{GpuEvent, RecordingGpu, StaticHost, SurfaceEvent};
use voxbrush_core::{
    BrushStroke, MeshKind, OverlayConfig, OverlayCoordinator, PaintError, PaintOutcome,
    PointerEvent, StrokeCollection, Topology, ViewportError, ViewportId,
};
use voxbrush_geom::ViewportGeometry;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn painted_collection() -> StrokeCollection {
    let mut strokes = StrokeCollection::new("precomputed://cells", Vec3::new(0.0, 1.0, 0.0));
    let a = BrushStroke::new(Vec3::splat(0.5), Vec3::X, Quat::IDENTITY, "u").expect("finite");
    strokes.insert(a);
    let mut b = BrushStroke::new(Vec3::new(3.2, 0.1, 0.9), Vec3::Z, Quat::IDENTITY, "u")
        .expect("finite");
    b.add_voxel(Vec3::new(4.5, 0.5, 0.5)).expect("room");
    b.add_voxel(Vec3::new(5.5, 1.5, 0.5)).expect("room");
    strokes.insert(b);
    strokes
}

fn two_viewport_coordinator() -> (OverlayCoordinator, StaticHost) {
    let mut host = StaticHost::with_viewports(2);
    host.viewports[1]
        .0
        .update(|s| s.geometry = ViewportGeometry::new(100, 0, 100, 100));
    let mut coordinator = OverlayCoordinator::new(OverlayConfig::default());
    assert!(coordinator.sync_layout(&mut host));
    (coordinator, host)
}

#[test]
fn sync_layout_rebuilds_only_on_change() {
    let (mut coordinator, mut host) = two_viewport_coordinator();
    assert_eq!(coordinator.controllers().len(), 2);
    assert!(!coordinator.sync_layout(&mut host));

    host.viewports.pop();
    assert!(coordinator.sync_layout(&mut host));
    assert_eq!(coordinator.controllers().len(), 1);

    host.layout_changed = true;
    assert!(coordinator.sync_layout(&mut host));
    assert!(!coordinator.sync_layout(&mut host));
}

#[test]
fn every_stroke_is_drawn_into_every_viewport() {
    init_tracing();
    let (mut coordinator, _host) = two_viewport_coordinator();
    let strokes = painted_collection();
    let mut gpu = RecordingGpu::new();

    let report = coordinator.render_frame(&mut gpu, strokes.as_slice());
    assert!(report.is_clean());
    assert_eq!(report.renderer.as_deref(), Some("boxes"));
    assert_eq!(report.rendered.len(), 2);
    assert_eq!(
        gpu.passes(),
        vec![
            ViewportGeometry::new(0, 0, 100, 100),
            ViewportGeometry::new(100, 0, 100, 100)
        ]
    );
    let draws = gpu.draws();
    assert_eq!(draws.len(), 2);
    assert!(draws.iter().all(|d| d.vertices.len() == 4));
    assert!(!gpu.in_pass());
}

#[test]
fn zero_width_viewport_is_skipped_without_stopping_siblings() {
    let (mut coordinator, host) = two_viewport_coordinator();
    host.viewports[0].0.update(|s| s.geometry.width = 0);
    let strokes = painted_collection();
    let mut gpu = RecordingGpu::new();

    let report = coordinator.render_frame(&mut gpu, strokes.as_slice());
    assert_eq!(
        report.skipped,
        vec![(
            ViewportId(0),
            ViewportError::DegenerateGeometry {
                width: 0,
                height: 100
            }
        )]
    );
    assert!(report.failed.is_empty());
    assert_eq!(report.rendered.len(), 1);
    assert_eq!(report.rendered[0].0, ViewportId(1));
    assert_eq!(gpu.passes(), vec![ViewportGeometry::new(100, 0, 100, 100)]);
    assert_eq!(host.viewports[0].1.last(), Some(SurfaceEvent::Hidden));

    // Once the host finishes laying out, the viewport comes back.
    host.viewports[0].0.update(|s| s.geometry.width = 100);
    let report = coordinator.render_frame(&mut gpu, strokes.as_slice());
    assert!(report.is_clean());
}

#[test]
fn backend_failure_is_isolated_and_closes_the_pass() {
    let (mut coordinator, _host) = two_viewport_coordinator();
    let strokes = painted_collection();
    let mut gpu = RecordingGpu::failing();

    let report = coordinator.render_frame(&mut gpu, strokes.as_slice());
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|(_, e)| !e.is_contract_violation()));
    assert!(!gpu.in_pass());
    let begins = gpu
        .events
        .iter()
        .filter(|e| matches!(e, GpuEvent::Begin(..)))
        .count();
    let ends = gpu
        .events
        .iter()
        .filter(|e| matches!(e, GpuEvent::End))
        .count();
    assert_eq!((begins, ends), (2, 2));
}

#[test]
fn swapping_renderers_reuses_the_same_strokes() {
    let (mut coordinator, _host) = two_viewport_coordinator();
    let strokes = painted_collection();
    let before = strokes.to_payloads();
    let mut gpu = RecordingGpu::new();

    coordinator.render_frame(&mut gpu, strokes.as_slice());
    let boxes: Vec<_> = gpu.draws()[0]
        .vertices
        .iter()
        .map(|v| Vec3::from(v.position))
        .collect();

    gpu.clear_events();
    coordinator.select_renderer("lines").expect("registered");
    let report = coordinator.render_frame(&mut gpu, strokes.as_slice());
    assert_eq!(report.renderer.as_deref(), Some("lines"));
    // The single-voxel stroke has no segment; the three-voxel one is a strip.
    let lines: Vec<_> = gpu.draws()[0]
        .vertices
        .iter()
        .map(|v| Vec3::from(v.position))
        .collect();
    assert_eq!(gpu.draws().len(), 2);

    // Box instances sit on voxel corners, strip vertices on voxel centers.
    let voxels: Vec<IVec3> = strokes
        .as_slice()
        .iter()
        .flat_map(|s| s.voxels().iter().copied())
        .collect();
    assert_eq!(
        boxes,
        voxels.iter().map(|v| v.as_vec3()).collect::<Vec<_>>()
    );
    assert_eq!(
        lines,
        voxels[1..]
            .iter()
            .map(|v| v.as_vec3() + Vec3::splat(0.5))
            .collect::<Vec<_>>()
    );
    assert_eq!(strokes.to_payloads(), before);

    let built: Vec<_> = gpu
        .events
        .iter()
        .filter_map(|e| match e {
            GpuEvent::Build(_, spec) => Some((spec.topology, spec.mesh)),
            _ => None,
        })
        .collect();
    assert_eq!(built, vec![(Topology::LineStrip, None)]);
    assert!(coordinator.select_renderer("voxels").is_err());
    assert_eq!(coordinator.renderers().active_name(), Some("lines"));
}

#[test]
fn box_program_is_instanced_unit_cube() {
    let (mut coordinator, _host) = two_viewport_coordinator();
    let mut gpu = RecordingGpu::new();
    coordinator.render_frame(&mut gpu, &[]);
    assert!(gpu.events.iter().any(|e| matches!(
        e,
        GpuEvent::Build(_, spec)
            if spec.topology == Topology::TriangleList && spec.mesh == Some(MeshKind::UnitCube)
    )));
    assert!(gpu.draws().is_empty());

    coordinator.release(&mut gpu);
    assert!(gpu.live_programs().is_empty());
}

#[test]
fn pointer_events_route_by_viewport() {
    let (mut coordinator, host) = two_viewport_coordinator();
    host.viewports[1].0.update(|s| {
        s.pose.position_uvw = Vec3::new(20.5, 0.5, 0.5);
    });
    let mut strokes = StrokeCollection::new("u", Vec3::ONE);

    let outcome = coordinator
        .handle_pointer(ViewportId(1), &PointerEvent::down(50.0, 50.0), &mut strokes)
        .expect("known viewport");
    let PaintOutcome::Started(id) = outcome else {
        panic!("expected a new stroke");
    };
    assert_eq!(strokes.get(id).expect("present").first_voxel(), IVec3::new(20, 0, 0));

    assert_eq!(
        coordinator.handle_pointer(ViewportId(7), &PointerEvent::down(0.0, 0.0), &mut strokes),
        Err(PaintError::UnknownViewport(ViewportId(7)))
    );
}

#[test]
fn focus_stroke_snaps_viewports_that_support_it() {
    let (mut coordinator, host) = two_viewport_coordinator();
    host.viewports[1].0.update(|s| s.can_snap = false);
    let orientation = Quat::from_rotation_x(0.4);
    let stroke =
        BrushStroke::new(Vec3::new(7.2, 8.9, 1.0), Vec3::ONE, orientation, "u").expect("finite");

    assert_eq!(coordinator.focus_stroke(&stroke), 1);
    let snapped = host.viewports[0].0.snapshot();
    assert_eq!(snapped.pose.position_uvw, Vec3::new(7.5, 8.5, 1.5));
    assert!(snapped
        .pose
        .orientation_uvw
        .abs_diff_eq(orientation, 1e-6));
    assert!(host.viewports[1].0.snapshot().snaps.is_empty());
}
