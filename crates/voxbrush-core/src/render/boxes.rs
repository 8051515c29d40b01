// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instanced unit boxes, one per stored voxel.

use glam::Vec3;
use tracing::debug;

use super::{ensure_program, voxel_center, RenderError, RenderFrame, RenderStats, StrokeRenderer};
use crate::gpu::{
    ColorVertex, DrawCall, GpuPort, MeshKind, PassScope, ProgramId, ProgramSpec, Topology,
};

const PROGRAM: ProgramSpec = ProgramSpec {
    label: "stroke-boxes",
    topology: Topology::TriangleList,
    mesh: Some(MeshKind::UnitCube),
};

/// Alpha of voxels away from the slicing plane.
const BODY_ALPHA: f32 = 0.6;

/// Draws every voxel of every stroke as a solid box in one instanced call.
///
/// With `highlight_slice`, voxels cut by the camera's mid-depth plane are
/// drawn opaque and lightened so the current slice stands out.
#[derive(Debug)]
pub struct BoxRenderer {
    program: Option<ProgramId>,
    highlight_slice: bool,
    instances: Vec<ColorVertex>,
}

impl BoxRenderer {
    /// Creates the renderer; the program is built on first render.
    pub fn new(highlight_slice: bool) -> Self {
        Self {
            program: None,
            highlight_slice,
            instances: Vec::new(),
        }
    }

    fn collect_instances(&mut self, frame: &RenderFrame<'_>) -> usize {
        self.instances.clear();
        let forward = frame.camera.forward();
        let origin = frame.camera.position();
        // Half the thickness of one voxel measured along the view direction.
        let half_extent = 0.5
            * [
                frame.uvw_to_world.x_axis,
                frame.uvw_to_world.y_axis,
                frame.uvw_to_world.z_axis,
            ]
            .iter()
            .map(|axis| axis.truncate().dot(forward).abs())
            .sum::<f32>();

        let mut highlighted = 0;
        for stroke in frame.strokes {
            let tint = stroke.color();
            for &voxel in stroke.voxels() {
                let on_plane = self.highlight_slice && {
                    let center = frame.uvw_to_world.transform_point3(voxel_center(voxel));
                    (center - origin).dot(forward).abs() <= half_extent
                };
                let color = if on_plane {
                    highlighted += 1;
                    tint.lerp(Vec3::ONE, 0.5).extend(1.0)
                } else {
                    tint.extend(BODY_ALPHA)
                };
                self.instances.push(ColorVertex {
                    position: voxel.as_vec3().to_array(),
                    color: color.to_array(),
                });
            }
        }
        highlighted
    }
}

impl StrokeRenderer for BoxRenderer {
    fn name(&self) -> &str {
        "boxes"
    }

    fn render(
        &mut self,
        gpu: &mut dyn GpuPort,
        frame: &RenderFrame<'_>,
    ) -> Result<RenderStats, RenderError> {
        let program = ensure_program(&mut self.program, gpu, &PROGRAM)?;
        let highlighted = self.collect_instances(frame);

        let mut pass = PassScope::begin(gpu, frame.viewport, frame.params)?;
        let mut stats = RenderStats::default();
        if !self.instances.is_empty() {
            pass.draw(&DrawCall {
                program,
                transform: frame.uvw_to_device(),
                vertices: &self.instances,
            })?;
            stats.draw_calls = 1;
            stats.primitives = self.instances.len();
        }
        debug!(instances = stats.primitives, highlighted, "boxes rendered");
        Ok(stats)
    }

    fn release(&mut self, gpu: &mut dyn GpuPort) {
        if let Some(program) = self.program.take() {
            gpu.release_program(program);
        }
    }
}
