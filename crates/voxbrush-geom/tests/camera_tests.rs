// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the orthographic camera pipeline.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use voxbrush_geom::{OrthographicCamera, Quat, Vec3, ViewVolume};

fn scenario_camera() -> OrthographicCamera {
    let mut cam = OrthographicCamera::default();
    cam.reconfigure(-5.0, 5.0, -1.0, 1.0, -5.0, 5.0)
        .expect("valid bounds");
    cam.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), Vec3::Y)
        .expect("valid look_at");
    cam
}

#[test]
fn clip_origin_lands_on_camera_mid_depth_plane() {
    let cam = scenario_camera();
    let world = cam.device_to_world().project_point3(Vec3::ZERO);
    assert_abs_diff_eq!(world.x, 0.0);
    assert_abs_diff_eq!(world.y, 0.0);
    assert_abs_diff_eq!(world.z, 5.0);
}

#[test]
fn clip_corners_reach_volume_bounds() {
    let cam = scenario_camera();
    let world = cam
        .device_to_world()
        .project_point3(Vec3::new(1.0, 1.0, 0.0));
    assert_abs_diff_eq!(world.x, 5.0, epsilon = 1e-5);
    assert_abs_diff_eq!(world.y, 5.0, epsilon = 1e-5);
}

#[test]
fn near_and_far_planes_map_to_clip_depth_extremes() {
    let cam = scenario_camera();
    let to_clip = cam.world_to_device();
    // near = -1 sits one unit behind the camera, far = 1 one unit ahead.
    let near = to_clip.project_point3(Vec3::new(0.0, 0.0, 6.0));
    let far = to_clip.project_point3(Vec3::new(0.0, 0.0, 4.0));
    assert_abs_diff_eq!(near.z, -1.0, epsilon = 1e-5);
    assert_abs_diff_eq!(far.z, 1.0, epsilon = 1e-5);
}

fn finite(range: f32) -> impl Strategy<Value = f32> {
    -range..range
}

proptest! {
    #[test]
    fn device_to_world_inverts_world_to_device(
        px in finite(50.0), py in finite(50.0), pz in finite(50.0),
        cx in finite(20.0), cy in finite(20.0), cz in finite(20.0),
        yaw in finite(3.1), pitch in finite(1.5),
        half_w in 0.5f32..40.0, half_h in 0.5f32..40.0,
    ) {
        let mut cam = OrthographicCamera::new(ViewVolume::symmetric(half_w, half_h, half_w.max(half_h)))
            .expect("valid volume");
        let q = Quat::from_euler(glam::EulerRot::YXZ, yaw, pitch, 0.0);
        cam.set_pose(Vec3::new(cx, cy, cz), q).expect("valid pose");

        let p = Vec3::new(px, py, pz);
        let clip = cam.world_to_device().project_point3(p);
        let back = cam.device_to_world().project_point3(clip);
        prop_assert!(back.abs_diff_eq(p, 5e-3), "{p:?} -> {clip:?} -> {back:?}");
    }
}
