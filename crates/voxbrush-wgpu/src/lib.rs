// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! wgpu backend for the voxbrush GPU port.
//!
//! The host hands over its device, queue and the color view the overlay
//! should draw into; [`WgpuPort`] does the rest. Overlay clip space uses the
//! GL depth convention, which is remapped to wgpu's `[0, 1]` here and nowhere
//! else.

mod convert;
mod mesh;
mod port;

pub use port::WgpuPort;
