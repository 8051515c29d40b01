// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! JSON-compatible stroke payloads.
//!
//! Shape:
//!
//! ```json
//! { "voxels": [{"x": 1, "y": 2, "z": -1}],
//!   "color": {"r": 255, "g": 0, "b": 0},
//!   "raw_data": {"url": "precomputed://..."},
//!   "camera_orientation": [0.0, 0.0, 0.0, 1.0] }
//! ```
//!
//! `camera_orientation` is `[x, y, z, w]` and may be absent in older payloads,
//! in which case it decodes as identity.

use glam::{IVec3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stroke::{BrushStroke, StrokeError, VOXEL_CAPACITY};

/// Reasons a payload cannot become a stroke. Raised before any stroke exists.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The JSON itself is malformed or has the wrong shape.
    #[error("malformed stroke payload: {0}")]
    Json(#[from] serde_json::Error),
    /// The payload lists no voxels.
    #[error("stroke payload has no voxels")]
    Empty,
    /// The orientation has a NaN/infinite component or zero length.
    #[error("stroke payload has an invalid camera orientation {0:?}")]
    Orientation([f32; 4]),
    /// The voxels do not fit a stroke (more distinct voxels than its capacity).
    #[error("stroke payload rejected: {0}")]
    Stroke(#[from] StrokeError),
}

/// One voxel coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelPayload {
    /// X index.
    pub x: i32,
    /// Y index.
    pub y: i32,
    /// Z index.
    pub z: i32,
}

impl From<IVec3> for VoxelPayload {
    fn from(v: IVec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<VoxelPayload> for IVec3 {
    fn from(v: VoxelPayload) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPayload {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ColorPayload {
    /// Scales `[0, 1]` float channels to `0..=255`, rounding to nearest.
    #[allow(clippy::cast_sign_loss)]
    pub fn from_unit(color: Vec3) -> Self {
        let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        Self {
            r: c.x as u8,
            g: c.y as u8,
            b: c.z as u8,
        }
    }

    /// Back to `[0, 1]` float channels.
    pub fn to_unit(self) -> Vec3 {
        Vec3::new(
            f32::from(self.r),
            f32::from(self.g),
            f32::from(self.b),
        ) / 255.0
    }
}

/// Reference to the annotated data volume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDataPayload {
    /// Source url of the volume.
    pub url: String,
}

/// Serialized [`BrushStroke`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokePayload {
    /// Voxels in paint order.
    pub voxels: Vec<VoxelPayload>,
    /// Tint.
    pub color: ColorPayload,
    /// Source volume.
    pub raw_data: RawDataPayload,
    /// `[x, y, z, w]`; absent in payloads written before orientation was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_orientation: Option<[f32; 4]>,
}

impl StrokePayload {
    /// Parses a payload from JSON text.
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Renders the payload as compact JSON.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl BrushStroke {
    /// Serializable snapshot of this stroke.
    pub fn to_payload(&self) -> StrokePayload {
        StrokePayload {
            voxels: self.voxels().iter().copied().map(VoxelPayload::from).collect(),
            color: ColorPayload::from_unit(self.color()),
            raw_data: RawDataPayload {
                url: self.source_data_url().to_owned(),
            },
            camera_orientation: Some(self.camera_orientation().to_array()),
        }
    }

    /// Rebuilds a stroke voxel by voxel through [`BrushStroke::add_voxel_index`],
    /// so payloads with consecutive duplicates come back deduplicated.
    pub fn from_payload(payload: &StrokePayload) -> Result<Self, PayloadError> {
        let (first, rest) = payload.voxels.split_first().ok_or(PayloadError::Empty)?;
        let orientation = match payload.camera_orientation {
            None => Quat::IDENTITY,
            Some(raw) => {
                let q = Quat::from_array(raw);
                if !q.is_finite() || q.length_squared() <= 1e-12 {
                    return Err(PayloadError::Orientation(raw));
                }
                q.normalize()
            }
        };
        let mut stroke = Self::from_voxel_index(
            IVec3::from(*first),
            payload.color.to_unit(),
            orientation,
            payload.raw_data.url.clone(),
            VOXEL_CAPACITY,
        )?;
        for voxel in rest {
            stroke.add_voxel_index(IVec3::from(*voxel))?;
        }
        Ok(stroke)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn missing_orientation_defaults_to_identity() {
        let text = r#"{
            "voxels": [{"x": 1, "y": 2, "z": 3}],
            "color": {"r": 255, "g": 128, "b": 0},
            "raw_data": {"url": "precomputed://a"}
        }"#;
        let payload = StrokePayload::from_json(text).expect("valid json");
        let stroke = BrushStroke::from_payload(&payload).expect("valid payload");
        assert_eq!(stroke.camera_orientation(), Quat::IDENTITY);
        assert_eq!(stroke.voxels(), &[IVec3::new(1, 2, 3)]);
        assert_eq!(stroke.source_data_url(), "precomputed://a");
    }

    #[test]
    fn duplicated_voxels_collapse_on_load() {
        let payload = StrokePayload {
            voxels: vec![
                VoxelPayload { x: 0, y: 0, z: 0 },
                VoxelPayload { x: 0, y: 0, z: 0 },
                VoxelPayload { x: 1, y: 0, z: 0 },
            ],
            color: ColorPayload { r: 0, g: 0, b: 0 },
            raw_data: RawDataPayload { url: "u".into() },
            camera_orientation: None,
        };
        let stroke = BrushStroke::from_payload(&payload).expect("valid payload");
        assert_eq!(stroke.len(), 2);
    }

    #[test]
    fn indices_past_f32_precision_decode_exactly() {
        let payload = StrokePayload {
            voxels: [16_777_216, 16_777_217, 16_777_219]
                .into_iter()
                .map(|x| VoxelPayload { x, y: 0, z: i32::MIN })
                .collect(),
            color: ColorPayload { r: 0, g: 0, b: 0 },
            raw_data: RawDataPayload { url: "u".into() },
            camera_orientation: None,
        };
        let stroke = BrushStroke::from_payload(&payload).expect("valid payload");
        assert_eq!(
            stroke.voxels(),
            &[
                IVec3::new(16_777_216, 0, i32::MIN),
                IVec3::new(16_777_217, 0, i32::MIN),
                IVec3::new(16_777_219, 0, i32::MIN),
            ]
        );
        assert_eq!(stroke.to_payload().voxels, payload.voxels);
    }

    #[test]
    fn malformed_payloads_fail_fast() {
        assert!(matches!(
            StrokePayload::from_json(r#"{"voxels": []}"#),
            Err(PayloadError::Json(_))
        ));
        assert!(matches!(
            StrokePayload::from_json(
                r#"{"voxels":[{"x":0,"y":0,"z":0}],"color":{"r":300,"g":0,"b":0},"raw_data":{"url":""}}"#
            ),
            Err(PayloadError::Json(_))
        ));

        let empty = StrokePayload {
            voxels: vec![],
            color: ColorPayload { r: 0, g: 0, b: 0 },
            raw_data: RawDataPayload { url: "u".into() },
            camera_orientation: None,
        };
        assert!(matches!(
            BrushStroke::from_payload(&empty),
            Err(PayloadError::Empty)
        ));

        let bad_q = StrokePayload {
            voxels: vec![VoxelPayload { x: 0, y: 0, z: 0 }],
            camera_orientation: Some([0.0; 4]),
            ..empty
        };
        assert!(matches!(
            BrushStroke::from_payload(&bad_q),
            Err(PayloadError::Orientation(_))
        ));
    }

    #[test]
    fn color_channels_scale_to_bytes() {
        let c = ColorPayload::from_unit(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(c, ColorPayload { r: 255, g: 128, b: 0 });
    }
}
