// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Line strips through voxel centers.
//!
//! A strip needs two vertices, so a stroke stays invisible under this
//! renderer until its second voxel lands. Use the box renderer to see single
//! clicks.

use tracing::{debug, trace};

use super::{ensure_program, voxel_center, RenderError, RenderFrame, RenderStats, StrokeRenderer};
use crate::gpu::{ColorVertex, DrawCall, GpuPort, PassScope, ProgramId, ProgramSpec, Topology};

const PROGRAM: ProgramSpec = ProgramSpec {
    label: "stroke-lines",
    topology: Topology::LineStrip,
    mesh: None,
};

/// Draws each stroke as one connected strip through its voxel centers.
///
/// Single-voxel strokes have no segment and are skipped.
#[derive(Debug, Default)]
pub struct LineRenderer {
    program: Option<ProgramId>,
    vertices: Vec<ColorVertex>,
}

impl LineRenderer {
    /// Creates the renderer; the program is built on first render.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StrokeRenderer for LineRenderer {
    fn name(&self) -> &str {
        "lines"
    }

    fn render(
        &mut self,
        gpu: &mut dyn GpuPort,
        frame: &RenderFrame<'_>,
    ) -> Result<RenderStats, RenderError> {
        let program = ensure_program(&mut self.program, gpu, &PROGRAM)?;
        let transform = frame.uvw_to_device();

        let mut pass = PassScope::begin(gpu, frame.viewport, frame.params)?;
        let mut stats = RenderStats::default();
        for stroke in frame.strokes {
            if stroke.len() < 2 {
                trace!("single-voxel stroke has no segment");
                continue;
            }
            let color = stroke.color().extend(1.0).to_array();
            self.vertices.clear();
            self.vertices.extend(stroke.voxels().iter().map(|&v| ColorVertex {
                position: voxel_center(v).to_array(),
                color,
            }));
            pass.draw(&DrawCall {
                program,
                transform,
                vertices: &self.vertices,
            })?;
            stats.draw_calls += 1;
            stats.primitives += self.vertices.len();
        }
        debug!(strips = stats.draw_calls, "lines rendered");
        Ok(stats)
    }

    fn release(&mut self, gpu: &mut dyn GpuPort) {
        if let Some(program) = self.program.take() {
            gpu.release_program(program);
        }
    }
}
