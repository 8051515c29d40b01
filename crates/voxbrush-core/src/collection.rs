// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stroke ownership.
//!
//! Strokes belong to a collection, never to a viewport. Viewports only read
//! them at render time; pointer handlers grow the one stroke they started.

use core::fmt;

use glam::{Quat, Vec3};
use tracing::debug;

use crate::payload::{PayloadError, StrokePayload};
use crate::stroke::{BrushStroke, StrokeError};

/// Stable handle to a stroke inside a [`StrokeCollection`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrokeId(pub u64);

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stroke#{}", self.0)
    }
}

/// Anything that can hand out and grow strokes for pointer handlers.
pub trait StrokeOwner {
    /// Creates a stroke at `start_uvw` with the owner's current tint and source.
    fn begin_stroke(
        &mut self,
        start_uvw: Vec3,
        camera_orientation_uvw: Quat,
    ) -> Result<StrokeId, StrokeError>;

    /// Mutable access to a live stroke.
    fn stroke_mut(&mut self, id: StrokeId) -> Option<&mut BrushStroke>;
}

/// Ordered set of strokes for one annotated volume.
///
/// Ids and strokes are stored side by side so renderers get a plain slice.
#[derive(Debug, Default)]
pub struct StrokeCollection {
    ids: Vec<StrokeId>,
    strokes: Vec<BrushStroke>,
    next_id: u64,
    color: Vec3,
    source_url: String,
}

impl StrokeCollection {
    /// Empty collection painting `color` onto `source_url`.
    pub fn new(source_url: impl Into<String>, color: Vec3) -> Self {
        Self {
            source_url: source_url.into(),
            color,
            ..Self::default()
        }
    }

    /// Tint applied to strokes started from now on.
    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    /// Current tint.
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Source url applied to strokes started from now on.
    pub fn set_source_url(&mut self, url: impl Into<String>) {
        self.source_url = url.into();
    }

    /// Current source url.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Number of strokes.
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    /// True when there are no strokes.
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// All strokes, oldest first.
    pub fn as_slice(&self) -> &[BrushStroke] {
        &self.strokes
    }

    /// `(id, stroke)` pairs, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (StrokeId, &BrushStroke)> + '_ {
        self.ids.iter().copied().zip(self.strokes.iter())
    }

    /// Looks up a stroke.
    pub fn get(&self, id: StrokeId) -> Option<&BrushStroke> {
        self.index_of(id).map(|i| &self.strokes[i])
    }

    /// Inserts an already-built stroke.
    pub fn insert(&mut self, stroke: BrushStroke) -> StrokeId {
        let id = StrokeId(self.next_id);
        self.next_id += 1;
        self.ids.push(id);
        self.strokes.push(stroke);
        id
    }

    /// Removes and destroys a stroke. Returns false if it was not present.
    pub fn remove(&mut self, id: StrokeId) -> bool {
        let Some(i) = self.index_of(id) else {
            return false;
        };
        self.ids.remove(i);
        self.strokes.remove(i).destroy();
        debug!(%id, remaining = self.strokes.len(), "stroke removed");
        true
    }

    /// Destroys every stroke.
    pub fn clear(&mut self) {
        self.ids.clear();
        for stroke in self.strokes.drain(..) {
            stroke.destroy();
        }
    }

    /// Serializable snapshots of every stroke, oldest first.
    pub fn to_payloads(&self) -> Vec<StrokePayload> {
        self.strokes.iter().map(BrushStroke::to_payload).collect()
    }

    /// JSON array of every stroke.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(&self.to_payloads())?)
    }

    /// Adds strokes from payloads. Either all are added or none are.
    pub fn load_payloads(
        &mut self,
        payloads: &[StrokePayload],
    ) -> Result<Vec<StrokeId>, PayloadError> {
        let strokes = payloads
            .iter()
            .map(BrushStroke::from_payload)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(strokes.into_iter().map(|s| self.insert(s)).collect())
    }

    /// Adds strokes from a JSON array. Either all are added or none are.
    pub fn load_json(&mut self, text: &str) -> Result<Vec<StrokeId>, PayloadError> {
        let payloads: Vec<StrokePayload> = serde_json::from_str(text)?;
        self.load_payloads(&payloads)
    }

    fn index_of(&self, id: StrokeId) -> Option<usize> {
        self.ids.iter().position(|&candidate| candidate == id)
    }
}

impl StrokeOwner for StrokeCollection {
    fn begin_stroke(
        &mut self,
        start_uvw: Vec3,
        camera_orientation_uvw: Quat,
    ) -> Result<StrokeId, StrokeError> {
        let stroke = BrushStroke::new(
            start_uvw,
            self.color,
            camera_orientation_uvw,
            self.source_url.clone(),
        )?;
        let id = self.insert(stroke);
        debug!(%id, "stroke started");
        Ok(id)
    }

    fn stroke_mut(&mut self, id: StrokeId) -> Option<&mut BrushStroke> {
        self.index_of(id).map(|i| &mut self.strokes[i])
    }
}
