// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Validated uvw→world frames.
//!
//! Hosts hand over a 4×4 matrix mapping their native data ("uvw") space into
//! world space. Overlay math needs its rotation part to orient cameras, so the
//! matrix must be affine with orthogonal axes:
//!
//! `uvw_to_world = T · R · S`, with `S` a positive per-axis scale.
//!
//! Shear and reflection are rejected rather than approximated. At least one
//! axis must have unit scale so that "pixels per voxel" keeps a stable meaning.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use thiserror::Error;

/// Tolerance for orthogonality and unit-axis checks.
const FRAME_EPS: f32 = 1e-4;

/// Reasons a uvw→world matrix is refused.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum TransformError {
    /// A NaN or infinite entry.
    #[error("non-finite uvw→world matrix")]
    NonFinite,
    /// The bottom row is not `(0, 0, 0, 1)`.
    #[error("uvw→world matrix is projective, not affine")]
    Projective,
    /// An axis collapses to zero length.
    #[error("uvw→world matrix is singular")]
    Singular,
    /// Axes are not mutually orthogonal.
    #[error("uvw→world matrix contains shear")]
    Shear,
    /// Negative determinant (mirror image).
    #[error("uvw→world matrix contains a reflection")]
    Reflection,
    /// No axis has unit scale.
    #[error("uvw→world matrix has no unit-scale axis (scale = {scale:?})")]
    NoUnitAxis {
        /// Per-axis scale that was found.
        scale: [f32; 3],
    },
}

/// A uvw→world matrix that passed validation, plus its decomposition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvwFrame {
    uvw_to_world: Mat4,
    world_to_uvw: Mat4,
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
}

impl Default for UvwFrame {
    fn default() -> Self {
        Self {
            uvw_to_world: Mat4::IDENTITY,
            world_to_uvw: Mat4::IDENTITY,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }
}

impl UvwFrame {
    /// Validates and decomposes `uvw_to_world`.
    pub fn try_new(uvw_to_world: Mat4) -> Result<Self, TransformError> {
        if !uvw_to_world.is_finite() {
            return Err(TransformError::NonFinite);
        }
        if !uvw_to_world
            .row(3)
            .abs_diff_eq(Vec4::new(0.0, 0.0, 0.0, 1.0), f32::EPSILON)
        {
            return Err(TransformError::Projective);
        }

        let axes = [
            uvw_to_world.x_axis.truncate(),
            uvw_to_world.y_axis.truncate(),
            uvw_to_world.z_axis.truncate(),
        ];
        let scale = Vec3::new(axes[0].length(), axes[1].length(), axes[2].length());
        if scale.min_element() <= f32::EPSILON {
            return Err(TransformError::Singular);
        }
        let unit = [axes[0] / scale.x, axes[1] / scale.y, axes[2] / scale.z];
        for (a, b) in [(0, 1), (0, 2), (1, 2)] {
            if unit[a].dot(unit[b]).abs() > FRAME_EPS {
                return Err(TransformError::Shear);
            }
        }
        let basis = Mat3::from_cols(unit[0], unit[1], unit[2]);
        if basis.determinant() < 0.0 {
            return Err(TransformError::Reflection);
        }
        if !scale.to_array().iter().any(|s| (s - 1.0).abs() <= FRAME_EPS) {
            return Err(TransformError::NoUnitAxis {
                scale: scale.to_array(),
            });
        }

        let rotation = Quat::from_mat3(&basis).normalize();
        let translation = uvw_to_world.w_axis.truncate();
        let world_to_uvw = Mat4::from_scale(scale.recip())
            * Mat4::from_quat(rotation.conjugate())
            * Mat4::from_translation(-translation);
        Ok(Self {
            uvw_to_world,
            world_to_uvw,
            scale,
            rotation,
            translation,
        })
    }

    /// The validated matrix as supplied.
    pub fn uvw_to_world(&self) -> Mat4 {
        self.uvw_to_world
    }

    /// Inverse of [`Self::uvw_to_world`], rebuilt from the decomposition.
    pub fn world_to_uvw(&self) -> Mat4 {
        self.world_to_uvw
    }

    /// Per-axis scale (world units per uvw unit).
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Rotation part.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Translation part.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Length of one voxel's diagonal in world units.
    pub fn voxel_diagonal(&self) -> f32 {
        self.scale.length()
    }

    /// Maps a uvw point into world space.
    pub fn point_to_world(&self, uvw: Vec3) -> Vec3 {
        self.uvw_to_world.transform_point3(uvw)
    }

    /// Maps a world point into uvw space.
    pub fn point_to_uvw(&self, world: Vec3) -> Vec3 {
        self.world_to_uvw.transform_point3(world)
    }

    /// Re-expresses a uvw-space orientation in world space.
    pub fn orientation_to_world(&self, uvw: Quat) -> Quat {
        (self.rotation * uvw).normalize()
    }

    /// Re-expresses a world-space orientation in uvw space.
    pub fn orientation_to_uvw(&self, world: Quat) -> Quat {
        (self.rotation.conjugate() * world).normalize()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn anisotropic_rotation_translation_decomposes() {
        let rot = Quat::from_rotation_z(FRAC_PI_2);
        let m = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, 4.0, 40.0),
            rot,
            Vec3::new(10.0, -2.0, 3.0),
        );
        let frame = UvwFrame::try_new(m).unwrap();
        assert!(frame.rotation().abs_diff_eq(rot, 1e-5));
        assert!(frame.scale().abs_diff_eq(Vec3::new(1.0, 4.0, 40.0), 1e-4));
        let p = Vec3::new(1.5, -2.0, 0.25);
        assert!(frame
            .point_to_uvw(frame.point_to_world(p))
            .abs_diff_eq(p, 1e-4));
    }

    #[test]
    fn shear_is_rejected() {
        let mut m = Mat4::IDENTITY;
        m.y_axis = Vec4::new(0.5, 1.0, 0.0, 0.0);
        assert_eq!(UvwFrame::try_new(m), Err(TransformError::Shear));
    }

    #[test]
    fn reflection_is_rejected() {
        let m = Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0));
        assert_eq!(UvwFrame::try_new(m), Err(TransformError::Reflection));
    }

    #[test]
    fn missing_unit_axis_is_rejected() {
        let m = Mat4::from_scale(Vec3::new(2.0, 3.0, 4.0));
        assert!(matches!(
            UvwFrame::try_new(m),
            Err(TransformError::NoUnitAxis { .. })
        ));
    }

    #[test]
    fn singular_and_projective_are_rejected() {
        let m = Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(UvwFrame::try_new(m), Err(TransformError::Singular));
        let mut p = Mat4::IDENTITY;
        p.x_axis.w = 0.3;
        assert_eq!(UvwFrame::try_new(p), Err(TransformError::Projective));
    }

    #[test]
    fn orientation_round_trips() {
        let frame =
            UvwFrame::try_new(Mat4::from_quat(Quat::from_rotation_x(0.7))).unwrap();
        let q = Quat::from_rotation_y(-1.1);
        let back = frame.orientation_to_uvw(frame.orientation_to_world(q));
        assert!(back.abs_diff_eq(q, 1e-5));
    }
}
