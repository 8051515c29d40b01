// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The only place overlay enums meet wgpu constants.

use glam::{Mat4, Vec4};
use voxbrush_core::{BlendMode, CullMode, DepthTest, PipelineState, StencilMode, Topology};
use voxbrush_geom::ViewportGeometry;

/// Depth/stencil attachment format used by every pipeline.
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Maps GL clip depth `[-1, 1]` onto wgpu's `[0, 1]`.
pub fn gl_to_wgpu_clip() -> Mat4 {
    Mat4::from_cols(
        Vec4::X,
        Vec4::Y,
        Vec4::new(0.0, 0.0, 0.5, 0.0),
        Vec4::new(0.0, 0.0, 0.5, 1.0),
    )
}

pub fn topology(t: Topology) -> wgpu::PrimitiveTopology {
    match t {
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
    }
}

pub fn blend(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Replace => wgpu::BlendState::REPLACE,
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::PremultipliedAlpha => wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
        BlendMode::Additive => {
            let add = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: add,
                alpha: add,
            }
        }
    }
}

pub fn cull(mode: CullMode) -> Option<wgpu::Face> {
    match mode {
        CullMode::None => None,
        CullMode::Front => Some(wgpu::Face::Front),
        CullMode::Back => Some(wgpu::Face::Back),
    }
}

pub fn depth_compare(test: DepthTest) -> wgpu::CompareFunction {
    match test {
        DepthTest::Disabled | DepthTest::Always => wgpu::CompareFunction::Always,
        DepthTest::Less => wgpu::CompareFunction::Less,
        DepthTest::LessEqual => wgpu::CompareFunction::LessEqual,
    }
}

fn stencil_face(mode: StencilMode) -> wgpu::StencilFaceState {
    match mode {
        StencilMode::Disabled => wgpu::StencilFaceState::IGNORE,
        StencilMode::Write { .. } => wgpu::StencilFaceState {
            compare: wgpu::CompareFunction::Always,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op: wgpu::StencilOperation::Replace,
        },
        StencilMode::Equal { .. } => wgpu::StencilFaceState {
            compare: wgpu::CompareFunction::Equal,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op: wgpu::StencilOperation::Keep,
        },
    }
}

/// Reference value to set for a pass using `mode`.
pub fn stencil_reference(mode: StencilMode) -> u32 {
    match mode {
        StencilMode::Disabled => 0,
        StencilMode::Write { reference } | StencilMode::Equal { reference } => reference,
    }
}

pub fn depth_stencil(state: &PipelineState) -> wgpu::DepthStencilState {
    let face = stencil_face(state.stencil);
    let (read_mask, write_mask) = match state.stencil {
        StencilMode::Disabled => (0, 0),
        StencilMode::Write { .. } => (0xff, 0xff),
        StencilMode::Equal { .. } => (0xff, 0),
    };
    wgpu::DepthStencilState {
        format: DEPTH_STENCIL_FORMAT,
        depth_write_enabled: state.depth_write && state.depth != DepthTest::Disabled,
        depth_compare: depth_compare(state.depth),
        stencil: wgpu::StencilState {
            front: face,
            back: face,
            read_mask,
            write_mask,
        },
        bias: wgpu::DepthBiasState::default(),
    }
}

/// Fits a bottom-left-origin viewport into the target.
///
/// wgpu rejects viewports that leave the attachment, so the rectangle is
/// clipped and the returned matrix re-maps clip x/y from the full viewport
/// onto the clipped one. `None` when the viewport misses the target.
pub fn fit_viewport(
    geometry: ViewportGeometry,
    target_width: u32,
    target_height: u32,
) -> Option<([f32; 4], Mat4)> {
    let [cx, cy, cw, ch] = scissor_rect(geometry, target_width, target_height)?.map(|v| v as f32);
    let fx = geometry.left as f32;
    let fy = (i64::from(target_height) - geometry.top()) as f32;
    let (fw, fh) = (geometry.width as f32, geometry.height as f32);

    let sx = fw / cw;
    let tx = (2.0 * (fx - cx) + fw) / cw - 1.0;
    let sy = fh / ch;
    let ty = 1.0 - (2.0 * (fy - cy) + fh) / ch;
    let correction = Mat4::from_cols(
        Vec4::new(sx, 0.0, 0.0, 0.0),
        Vec4::new(0.0, sy, 0.0, 0.0),
        Vec4::Z,
        Vec4::new(tx, ty, 0.0, 1.0),
    );
    Some(([cx, cy, cw, ch], correction))
}

/// Bottom-left-origin rectangle clipped to the target, as a top-left scissor
/// `[x, y, w, h]`. `None` when nothing is left.
pub fn scissor_rect(
    geometry: ViewportGeometry,
    target_width: u32,
    target_height: u32,
) -> Option<[u32; 4]> {
    let (tw, th) = (i64::from(target_width), i64::from(target_height));
    let x0 = i64::from(geometry.left).clamp(0, tw);
    let x1 = (i64::from(geometry.left) + i64::from(geometry.width)).clamp(0, tw);
    let y0 = i64::from(geometry.bottom).clamp(0, th);
    let y1 = geometry.top().clamp(0, th);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    let rect = [x0, th - y1, x1 - x0, y1 - y0].map(|v| u32::try_from(v).unwrap_or(0));
    Some(rect)
}
