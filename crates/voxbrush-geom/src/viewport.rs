// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sub-viewport placement in pixel space.

use glam::{Vec2, Vec3};

/// Placement of one sub-viewport inside the tracked host element.
///
/// Bottom-left origin (GPU viewport convention). Re-read from the host every
/// frame; never cache it across frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ViewportGeometry {
    /// Left edge in pixels.
    pub left: i32,
    /// Bottom edge in pixels.
    pub bottom: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ViewportGeometry {
    /// Convenience constructor.
    pub const fn new(left: i32, bottom: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    /// True when either side is zero (the host is mid-relayout).
    pub const fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size in pixels as floats.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Top edge in pixels (`bottom + height`).
    pub fn top(&self) -> i64 {
        i64::from(self.bottom) + i64::from(self.height)
    }

    /// Maps a pointer offset (top-left origin, y down) to clip space.
    ///
    /// The result spans `[-1, 1]` on x and y with y flipped, and sits on the
    /// mid-depth plane (`z = 0`). Returns `None` for degenerate geometry.
    pub fn offset_to_clip(&self, offset: Vec2) -> Option<Vec3> {
        if self.is_degenerate() {
            return None;
        }
        let size = self.size();
        Some(Vec3::new(
            2.0 * offset.x / size.x - 1.0,
            1.0 - 2.0 * offset.y / size.y,
            0.0,
        ))
    }

    /// Pointer offset of the exact center.
    pub fn center_offset(&self) -> Vec2 {
        self.size() * 0.5
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn corners_and_center_map_to_clip_extremes() {
        let g = ViewportGeometry::new(10, 20, 200, 100);
        assert_eq!(g.offset_to_clip(Vec2::ZERO), Some(Vec3::new(-1.0, 1.0, 0.0)));
        assert_eq!(
            g.offset_to_clip(Vec2::new(200.0, 100.0)),
            Some(Vec3::new(1.0, -1.0, 0.0))
        );
        assert_eq!(g.offset_to_clip(g.center_offset()), Some(Vec3::ZERO));
    }

    #[test]
    fn degenerate_geometry_has_no_clip_mapping() {
        let g = ViewportGeometry::new(0, 0, 0, 100);
        assert!(g.is_degenerate());
        assert_eq!(g.offset_to_clip(Vec2::new(1.0, 1.0)), None);
    }
}
