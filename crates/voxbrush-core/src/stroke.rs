// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Brush strokes: append-only, deduplicated voxel runs.

use glam::{IVec3, Quat, Vec3};
use thiserror::Error;
use tracing::trace;

/// Upper bound on voxels per stroke.
pub const VOXEL_CAPACITY: usize = 1024;

/// Errors raised while growing a stroke. The stroke keeps its last valid state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum StrokeError {
    /// The fixed voxel buffer is full.
    #[error("stroke voxel buffer is full ({capacity} voxels)")]
    Capacity {
        /// Buffer capacity.
        capacity: usize,
    },
    /// A NaN or infinite position was supplied.
    #[error("non-finite voxel position")]
    NonFinite,
    /// The position floors to a voxel index outside the `i32` range.
    #[error("voxel position outside the addressable range")]
    OutOfRange,
}

/// Fixed-capacity voxel storage owned by exactly one stroke.
///
/// The backing allocation is made once, at full capacity, and never grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelBuffer {
    voxels: Vec<IVec3>,
    capacity: usize,
}

impl VoxelBuffer {
    /// Allocates an empty buffer holding at most `capacity` voxels.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            voxels: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a voxel, failing when the buffer is full.
    pub fn push(&mut self, voxel: IVec3) -> Result<(), StrokeError> {
        if self.voxels.len() >= self.capacity {
            return Err(StrokeError::Capacity {
                capacity: self.capacity,
            });
        }
        self.voxels.push(voxel);
        Ok(())
    }

    /// Stored voxels in insertion order.
    pub fn as_slice(&self) -> &[IVec3] {
        &self.voxels
    }

    /// Number of stored voxels.
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Maximum number of voxels.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recently stored voxel.
    pub fn last(&self) -> Option<IVec3> {
        self.voxels.last().copied()
    }
}

/// 2^31: the first floored coordinate `i32` cannot hold.
const INDEX_LIMIT: f32 = 2_147_483_648.0;

/// Floors a uvw position to the voxel containing it.
///
/// Positions whose floor does not fit an `i32` are rejected rather than
/// saturated.
pub fn voxel_of(position_uvw: Vec3) -> Result<IVec3, StrokeError> {
    if !position_uvw.is_finite() {
        return Err(StrokeError::NonFinite);
    }
    let floored = position_uvw.floor();
    if floored.cmplt(Vec3::splat(-INDEX_LIMIT)).any()
        || floored.cmpge(Vec3::splat(INDEX_LIMIT)).any()
    {
        return Err(StrokeError::OutOfRange);
    }
    Ok(floored.as_ivec3())
}

/// One continuous paint drag: voxels, tint and the camera orientation it
/// started under.
///
/// Always holds at least one voxel. Consecutive duplicates are suppressed, so
/// repeated pointer samples inside one voxel never grow the stroke.
#[derive(Clone, Debug, PartialEq)]
pub struct BrushStroke {
    voxels: VoxelBuffer,
    color: Vec3,
    camera_orientation: Quat,
    source_data_url: String,
}

impl BrushStroke {
    /// Starts a stroke at the voxel containing `start_position_uvw`.
    ///
    /// `color` is clamped to `[0, 1]`; `camera_orientation_uvw` is normalized
    /// (identity when degenerate).
    pub fn new(
        start_position_uvw: Vec3,
        color: Vec3,
        camera_orientation_uvw: Quat,
        source_data_url: impl Into<String>,
    ) -> Result<Self, StrokeError> {
        Self::with_capacity(
            start_position_uvw,
            color,
            camera_orientation_uvw,
            source_data_url,
            VOXEL_CAPACITY,
        )
    }

    /// As [`BrushStroke::new`] with a custom buffer capacity (at least one).
    pub fn with_capacity(
        start_position_uvw: Vec3,
        color: Vec3,
        camera_orientation_uvw: Quat,
        source_data_url: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, StrokeError> {
        Self::from_voxel_index(
            voxel_of(start_position_uvw)?,
            color,
            camera_orientation_uvw,
            source_data_url,
            capacity,
        )
    }

    /// Starts a stroke on an already-indexed voxel.
    pub fn from_voxel_index(
        start: IVec3,
        color: Vec3,
        camera_orientation_uvw: Quat,
        source_data_url: impl Into<String>,
        capacity: usize,
    ) -> Result<Self, StrokeError> {
        let mut voxels = VoxelBuffer::with_capacity(capacity.max(1));
        voxels.push(start)?;
        Ok(Self {
            voxels,
            color: color.clamp(Vec3::ZERO, Vec3::ONE),
            camera_orientation: normalize_or_identity(camera_orientation_uvw),
            source_data_url: source_data_url.into(),
        })
    }

    /// Floors `position_uvw` and appends it unless it repeats the last voxel.
    ///
    /// Returns `Ok(true)` when a voxel was appended, `Ok(false)` for a repeat.
    pub fn add_voxel(&mut self, position_uvw: Vec3) -> Result<bool, StrokeError> {
        self.add_voxel_index(voxel_of(position_uvw)?)
    }

    /// Appends `voxel` unless it repeats the last one.
    pub fn add_voxel_index(&mut self, voxel: IVec3) -> Result<bool, StrokeError> {
        if self.voxels.last() == Some(voxel) {
            return Ok(false);
        }
        self.voxels.push(voxel)?;
        trace!(?voxel, len = self.voxels.len(), "stroke grew");
        Ok(true)
    }

    /// Voxels in paint order.
    pub fn voxels(&self) -> &[IVec3] {
        self.voxels.as_slice()
    }

    /// Number of stored voxels (never zero).
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.voxels.capacity()
    }

    /// Voxel the stroke started on.
    pub fn first_voxel(&self) -> IVec3 {
        self.voxels.as_slice().first().copied().unwrap_or(IVec3::ZERO)
    }

    /// RGB tint in `[0, 1]`.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Camera orientation (uvw space) when the stroke began.
    pub fn camera_orientation(&self) -> Quat {
        self.camera_orientation
    }

    /// Identifier of the annotated data volume.
    pub fn source_data_url(&self) -> &str {
        &self.source_data_url
    }

    /// Releases the backing buffer. Consuming `self` rules out a second call.
    pub fn destroy(self) {
        trace!(
            voxels = self.voxels.len(),
            url = %self.source_data_url,
            "stroke destroyed"
        );
        drop(self.voxels);
    }
}

pub(crate) fn normalize_or_identity(q: Quat) -> Quat {
    if q.is_finite() && q.length_squared() > 1e-12 {
        q.normalize()
    } else {
        Quat::IDENTITY
    }
}
