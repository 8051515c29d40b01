// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Overlay tuning knobs (serializable, all fields defaulted).

use serde::{Deserialize, Serialize};

use crate::gpu::RenderParams;

/// Default near/far half-range in world units.
///
/// Tunable rather than derived: it must cover a voxel diagonal at any
/// rotation, which is √3 ≈ 1.73 at unit scale. Controllers also widen it to
/// the actual diagonal of anisotropic frames.
pub const DEFAULT_DEPTH_HALF_RANGE: f32 = 2.0;

/// Overlay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Half-range of the near/far planes around the camera, world units.
    pub depth_half_range: f32,
    /// Box renderer lightens voxels on the slicing plane.
    pub highlight_slice: bool,
    /// RGB tint for new strokes, `[0, 1]`.
    pub default_color: [f32; 3],
    /// Renderer active at startup.
    pub default_renderer: String,
    /// Clear color applied before strokes are drawn; `None` leaves host pixels.
    pub clear_color: Option<[f32; 4]>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            depth_half_range: DEFAULT_DEPTH_HALF_RANGE,
            highlight_slice: true,
            default_color: [1.0, 0.0, 0.0],
            default_renderer: "boxes".to_owned(),
            clear_color: None,
        }
    }
}

impl OverlayConfig {
    /// Render params implied by this configuration.
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            clear: self.clear_color,
            ..RenderParams::default()
        }
    }
}
