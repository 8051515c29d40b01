// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Orthographic camera math.
//!
//! The camera stores only its view volume, a world position and a unit
//! orientation. Every matrix is rebuilt on request.

use core::fmt;

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use thiserror::Error;

/// Squared-length threshold below which a direction counts as zero.
const DEGENERATE_EPS: f32 = 1e-12;

/// Axis of the view volume, used to report invalid bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// `left`/`right`.
    Horizontal,
    /// `bottom`/`top`.
    Vertical,
    /// `near`/`far`.
    Depth,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Horizontal => "left/right",
            Self::Vertical => "bottom/top",
            Self::Depth => "near/far",
        };
        f.write_str(name)
    }
}

/// Configuration errors. The camera keeps its previous state when one is returned.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CameraError {
    /// A bound pair is empty or inverted (`max <= min`).
    #[error("invalid {axis} bounds: {min} must be less than {max}")]
    InvalidBounds {
        /// Offending axis.
        axis: Axis,
        /// Lower bound as supplied.
        min: f32,
        /// Upper bound as supplied.
        max: f32,
    },
    /// `look_at` target coincides with the position.
    #[error("look_at target equals position; forward direction is undefined")]
    DegenerateForward,
    /// `look_at` up vector is zero or parallel to the forward direction.
    #[error("look_at up vector is parallel to forward; right axis is undefined")]
    DegenerateUp,
    /// A NaN or infinite component was supplied.
    #[error("non-finite camera input")]
    NonFinite,
    /// The orientation quaternion has (near) zero length.
    #[error("camera orientation has zero length")]
    DegenerateOrientation,
}

/// The six planes of an orthographic view volume, in view-space units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewVolume {
    /// Left plane.
    pub left: f32,
    /// Right plane.
    pub right: f32,
    /// Bottom plane.
    pub bottom: f32,
    /// Top plane.
    pub top: f32,
    /// Near plane (distance along -Z).
    pub near: f32,
    /// Far plane (distance along -Z).
    pub far: f32,
}

impl ViewVolume {
    /// Symmetric volume with the given half extents.
    pub fn symmetric(half_width: f32, half_height: f32, half_depth: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
            near: -half_depth,
            far: half_depth,
        }
    }

    /// Checks `right > left`, `top > bottom`, `far > near` and finiteness.
    pub fn validate(&self) -> Result<(), CameraError> {
        let all = [
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(CameraError::NonFinite);
        }
        for (axis, min, max) in [
            (Axis::Horizontal, self.left, self.right),
            (Axis::Vertical, self.bottom, self.top),
            (Axis::Depth, self.near, self.far),
        ] {
            if max <= min {
                return Err(CameraError::InvalidBounds { axis, min, max });
            }
        }
        Ok(())
    }

    /// Width of the volume (`right - left`).
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the volume (`top - bottom`).
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Depth of the volume (`far - near`).
    pub fn depth(&self) -> f32 {
        self.far - self.near
    }
}

impl Default for ViewVolume {
    fn default() -> Self {
        Self::symmetric(1.0, 1.0, 1.0)
    }
}

/// Orthographic camera: a view volume placed in world space.
///
/// Invariants: the volume is valid (see [`ViewVolume::validate`]) and the
/// orientation is unit length. Mutators that would break either return an
/// error and leave the camera untouched.
///
/// The camera looks down its local -Z axis with +Y up, matching
/// `Mat4::look_at_rh`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthographicCamera {
    volume: ViewVolume,
    position: Vec3,
    orientation: Quat,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self {
            volume: ViewVolume::default(),
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl OrthographicCamera {
    /// Creates a camera at the origin with identity orientation.
    pub fn new(volume: ViewVolume) -> Result<Self, CameraError> {
        volume.validate()?;
        Ok(Self {
            volume,
            ..Self::default()
        })
    }

    /// Replaces the view volume. Argument order follows the overlay's
    /// historical call sites: horizontal, depth, then vertical bounds.
    pub fn reconfigure(
        &mut self,
        left: f32,
        right: f32,
        near: f32,
        far: f32,
        bottom: f32,
        top: f32,
    ) -> Result<(), CameraError> {
        self.set_volume(ViewVolume {
            left,
            right,
            bottom,
            top,
            near,
            far,
        })
    }

    /// Replaces the view volume from a struct.
    pub fn set_volume(&mut self, volume: ViewVolume) -> Result<(), CameraError> {
        volume.validate()?;
        self.volume = volume;
        Ok(())
    }

    /// Sets position and orientation directly. The orientation is normalized.
    pub fn set_pose(&mut self, position: Vec3, orientation: Quat) -> Result<(), CameraError> {
        if !position.is_finite() || !orientation.is_finite() {
            return Err(CameraError::NonFinite);
        }
        if orientation.length_squared() < DEGENERATE_EPS {
            return Err(CameraError::DegenerateOrientation);
        }
        self.position = position;
        self.orientation = orientation.normalize();
        Ok(())
    }

    /// Moves the camera to `position` and aims its forward axis at `target`.
    ///
    /// `up` only disambiguates roll; it need not be orthogonal to forward.
    pub fn look_at(&mut self, target: Vec3, position: Vec3, up: Vec3) -> Result<(), CameraError> {
        if !target.is_finite() || !position.is_finite() || !up.is_finite() {
            return Err(CameraError::NonFinite);
        }
        let forward = target - position;
        if forward.length_squared() < DEGENERATE_EPS {
            return Err(CameraError::DegenerateForward);
        }
        let forward = forward.normalize();
        let up = up.normalize_or_zero();
        let right = forward.cross(up);
        if right.length_squared() < 1e-10 {
            return Err(CameraError::DegenerateUp);
        }
        let right = right.normalize();
        let true_up = right.cross(forward);
        let basis = Mat3::from_cols(right, true_up, -forward);
        self.position = position;
        self.orientation = Quat::from_mat3(&basis).normalize();
        Ok(())
    }

    /// Current view volume.
    pub fn volume(&self) -> ViewVolume {
        self.volume
    }

    /// World-space position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// World-space orientation (unit quaternion).
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Unit forward direction in world space (local -Z).
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    /// View → world (the camera's model matrix).
    pub fn view_to_world(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// World → view.
    pub fn world_to_view(&self) -> Mat4 {
        Mat4::from_quat(self.orientation.conjugate()) * Mat4::from_translation(-self.position)
    }

    /// View → clip (the projection matrix).
    pub fn view_to_device(&self) -> Mat4 {
        let v = self.volume;
        Mat4::orthographic_rh_gl(v.left, v.right, v.bottom, v.top, v.near, v.far)
    }

    /// Clip → view, built from the bounds rather than a general inverse.
    pub fn device_to_view(&self) -> Mat4 {
        let v = self.volume;
        Mat4::from_cols(
            Vec4::new(v.width() * 0.5, 0.0, 0.0, 0.0),
            Vec4::new(0.0, v.height() * 0.5, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -v.depth() * 0.5, 0.0),
            Vec4::new(
                (v.right + v.left) * 0.5,
                (v.top + v.bottom) * 0.5,
                -(v.far + v.near) * 0.5,
                1.0,
            ),
        )
    }

    /// World → clip (`projection · view`).
    pub fn world_to_device(&self) -> Mat4 {
        self.view_to_device() * self.world_to_view()
    }

    /// Clip → world.
    pub fn device_to_world(&self) -> Mat4 {
        self.view_to_world() * self.device_to_view()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn reconfigure_rejects_inverted_bounds_and_keeps_state() {
        let mut cam = OrthographicCamera::default();
        let before = cam.volume();
        let err = cam.reconfigure(1.0, -1.0, -1.0, 1.0, -1.0, 1.0);
        assert_eq!(
            err,
            Err(CameraError::InvalidBounds {
                axis: Axis::Horizontal,
                min: 1.0,
                max: -1.0
            })
        );
        assert_eq!(cam.volume(), before);

        let err = cam.reconfigure(-1.0, 1.0, 2.0, 2.0, -1.0, 1.0);
        assert!(matches!(
            err,
            Err(CameraError::InvalidBounds {
                axis: Axis::Depth,
                ..
            })
        ));
        let err = cam.reconfigure(-1.0, 1.0, -1.0, 1.0, 3.0, 1.0);
        assert!(matches!(
            err,
            Err(CameraError::InvalidBounds {
                axis: Axis::Vertical,
                ..
            })
        ));
    }

    #[test]
    fn reconfigure_rejects_nan() {
        let mut cam = OrthographicCamera::default();
        assert_eq!(
            cam.reconfigure(f32::NAN, 1.0, -1.0, 1.0, -1.0, 1.0),
            Err(CameraError::NonFinite)
        );
    }

    #[test]
    fn look_at_degenerate_inputs_are_rejected() {
        let mut cam = OrthographicCamera::default();
        cam.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), Vec3::Y)
            .unwrap();
        let before = cam;

        assert_eq!(
            cam.look_at(Vec3::ONE, Vec3::ONE, Vec3::Y),
            Err(CameraError::DegenerateForward)
        );
        assert_eq!(
            cam.look_at(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0), Vec3::Y),
            Err(CameraError::DegenerateUp)
        );
        assert_eq!(
            cam.look_at(Vec3::ZERO, Vec3::X, Vec3::ZERO),
            Err(CameraError::DegenerateUp)
        );
        assert_eq!(cam, before);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut cam = OrthographicCamera::default();
        cam.look_at(Vec3::new(3.0, 0.0, 0.0), Vec3::ZERO, Vec3::Z)
            .unwrap();
        assert!(cam.forward().abs_diff_eq(Vec3::X, 1e-6));
        assert!((cam.orientation().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn look_at_down_negative_z_is_identity() {
        let mut cam = OrthographicCamera::default();
        cam.look_at(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0), Vec3::Y)
            .unwrap();
        assert!(cam.orientation().abs_diff_eq(Quat::IDENTITY, 1e-6));
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn device_to_view_inverts_projection() {
        let cam = OrthographicCamera::new(ViewVolume {
            left: -3.0,
            right: 7.0,
            bottom: -2.0,
            top: 4.0,
            near: 0.5,
            far: 9.0,
        })
        .unwrap();
        let product = cam.device_to_view() * cam.view_to_device();
        assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
    }

    #[test]
    fn set_pose_normalizes_orientation() {
        let mut cam = OrthographicCamera::default();
        cam.set_pose(Vec3::ONE, Quat::from_xyzw(0.0, 0.0, 0.0, 4.0))
            .unwrap();
        assert!(cam.orientation().is_normalized());
        assert_eq!(
            cam.set_pose(Vec3::ONE, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)),
            Err(CameraError::DegenerateOrientation)
        );
        assert_eq!(
            cam.set_pose(Vec3::ONE, Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0)),
            Err(CameraError::NonFinite)
        );
        assert!(cam.orientation().abs_diff_eq(Quat::IDENTITY, 1e-6));
    }
}
