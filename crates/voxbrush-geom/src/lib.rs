// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for voxbrush overlays.

This crate provides:
- An orthographic camera (`OrthographicCamera`) with view/projection matrices
  derived on demand from bounds, position and orientation.
- A validated uvw→world frame (`UvwFrame`) that splits the host's matrix into
  per-axis scale, rotation and translation.
- Sub-viewport placement (`ViewportGeometry`) and pointer→clip mapping.

Conventions:
- Column-major `glam` matrices; `clip = projection · view · world_point`.
- Clip/device space is `[-1, 1]` on every axis (GL depth convention). Backends
  that use a `[0, 1]` depth range remap at their own boundary.
- Float32 throughout. Nothing here caches a derived matrix.
"]

/// Orthographic camera and its errors.
pub mod camera;
/// Decomposition of the host's uvw→world matrix.
pub mod frame;
/// Pixel rectangles and pointer→clip mapping.
pub mod viewport;

pub use camera::{Axis, CameraError, OrthographicCamera, ViewVolume};
pub use frame::{TransformError, UvwFrame};
pub use viewport::ViewportGeometry;

pub use glam::{IVec3, Mat4, Quat, Vec2, Vec3, Vec4};
