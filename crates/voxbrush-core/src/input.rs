// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pointer events and the per-viewport paint state machine.
//!
//! `Idle --down--> Painting(stroke) --move--> Painting(stroke) --up--> Idle`
//!
//! Releasing the pointer is the only way out of `Painting`; there is no
//! timeout.

use glam::Vec2;

use crate::collection::StrokeId;

/// Phase of a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
}

/// Mouse button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Button {
    /// Left button or single touch. Only this one paints.
    #[default]
    Primary,
    /// Middle button.
    Middle,
    /// Right button.
    Secondary,
}

/// A pointer event in the overlay element's local pixel space
/// (top-left origin, y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Phase.
    pub kind: PointerKind,
    /// Button involved.
    pub button: Button,
    /// Offset within the overlay element, pixels.
    pub offset: Vec2,
}

impl PointerEvent {
    /// Primary-button press at `(x, y)`.
    pub fn down(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Down,
            button: Button::Primary,
            offset: Vec2::new(x, y),
        }
    }

    /// Primary-button move to `(x, y)`.
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            button: Button::Primary,
            offset: Vec2::new(x, y),
        }
    }

    /// Primary-button release at `(x, y)`.
    pub fn up(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Up,
            button: Button::Primary,
            offset: Vec2::new(x, y),
        }
    }

    /// Same event with a different button.
    pub fn with_button(self, button: Button) -> Self {
        Self { button, ..self }
    }
}

/// Paint state of one viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PaintState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A drag is growing `stroke`.
    Painting {
        /// Stroke started by the paired pointer-down.
        stroke: StrokeId,
    },
}

/// Result of feeding one pointer event to a viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintOutcome {
    /// Nothing happened (wrong button, idle move, unusable viewport).
    Ignored,
    /// A new stroke began.
    Started(StrokeId),
    /// The active stroke saw a move; `appended` is false for a repeat voxel.
    Extended {
        /// Active stroke.
        stroke: StrokeId,
        /// Whether a voxel was appended.
        appended: bool,
    },
    /// The active stroke was released and is now frozen.
    Finished(StrokeId),
}
