// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Voxel brush strokes painted over a host image viewer.
//!
//! The host owns the data, the cameras and the panel layout. This crate lays
//! an input-capturing surface over each host sub-viewport, derives an
//! orthographic camera that reproduces the host's view every frame, turns
//! pointer drags into voxel strokes in the host's uvw space and draws those
//! strokes back with a swappable renderer.
//!
//! Layering, leaf first:
//! - [`stroke`], [`payload`], [`collection`]: stroke data and its wire form.
//! - [`adapter`], [`gpu`]: the host and GPU ports.
//! - [`render`]: drawing strategies behind [`render::StrokeRenderer`].
//! - [`controller`], [`coordinator`]: per-viewport and per-host drivers.
//!
//! [`mock`] holds headless doubles for every port.

pub mod adapter;
pub mod collection;
pub mod config;
pub mod controller;
pub mod coordinator;
pub mod gpu;
pub mod input;
pub mod mock;
pub mod payload;
pub mod render;
pub mod stroke;

pub use adapter::{
    CameraPose, HostViewer, InjectionParams, OverlaySurface, ViewportAdapter, ViewportSlot,
};
pub use collection::{StrokeCollection, StrokeId, StrokeOwner};
pub use config::{OverlayConfig, DEFAULT_DEPTH_HALF_RANGE};
pub use controller::{DerivedView, PaintError, ViewportController, ViewportError, ViewportId};
pub use coordinator::{FrameReport, OverlayCoordinator};
pub use gpu::{
    BlendMode, ColorVertex, CullMode, DepthTest, DrawCall, GpuError, GpuPort, MeshKind,
    PassScope, PipelineState, ProgramId, ProgramSpec, RenderParams, StencilMode, Topology,
};
pub use input::{Button, PaintOutcome, PaintState, PointerEvent, PointerKind};
pub use payload::{ColorPayload, PayloadError, RawDataPayload, StrokePayload, VoxelPayload};
pub use render::{
    BoxRenderer, LineRenderer, RegistryError, RenderError, RenderFrame, RenderStats,
    RendererRegistry, StrokeRenderer,
};
pub use stroke::{voxel_of, BrushStroke, StrokeError, VoxelBuffer, VOXEL_CAPACITY};
