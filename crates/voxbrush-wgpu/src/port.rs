// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! [`GpuPort`] on top of a wgpu device.

use std::collections::HashMap;

use glam::Mat4;
use tracing::{debug, trace, warn};
use voxbrush_core::{
    BlendMode, ColorVertex, DepthTest, DrawCall, GpuError, GpuPort, MeshKind, PipelineState,
    ProgramId, ProgramSpec, RenderParams, Topology,
};
use voxbrush_geom::ViewportGeometry;
use wgpu::util::DeviceExt;

use crate::convert;
use crate::mesh::{self, Mesh};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    transform: [[f32; 4]; 4],
    clear_color: [f32; 4],
}

const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_VERTEX_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32x4];

/// Everything that varies between pipelines.
struct PipelineDesc<'a> {
    label: &'static str,
    entry_point: &'static str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: Topology,
    state: PipelineState,
}

#[derive(Debug)]
struct Target {
    color: wgpu::TextureView,
    depth: wgpu::TextureView,
    width: u32,
    height: u32,
}

#[derive(Debug)]
struct PendingDraw {
    program: ProgramId,
    globals: wgpu::BindGroup,
    vertices: wgpu::Buffer,
    count: u32,
}

/// Draws are buffered between `begin_pass` and `end_pass` and encoded into a
/// single render pass on close.
#[derive(Debug)]
struct PendingPass {
    params: RenderParams,
    /// `None` when the viewport misses the target; draws are dropped.
    placement: Option<([f32; 4], Mat4)>,
    scissor: Option<[u32; 4]>,
    clear: Option<wgpu::BindGroup>,
    draws: Vec<PendingDraw>,
}

/// wgpu implementation of the overlay's GPU port.
///
/// Renders into whatever color view was last given to
/// [`WgpuPort::set_target`]; the port owns a matching depth/stencil texture.
/// Pipelines are built lazily per `(program, pipeline state)`.
#[derive(Debug)]
pub struct WgpuPort {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    globals_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    cube: Mesh,
    target: Option<Target>,
    programs: HashMap<ProgramId, ProgramSpec>,
    pipelines: HashMap<(ProgramId, PipelineState), wgpu::RenderPipeline>,
    clear_pipeline: Option<wgpu::RenderPipeline>,
    next_program: u32,
    pass: Option<PendingPass>,
}

impl WgpuPort {
    /// Creates the port for color targets of `format`.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("voxbrush_globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("voxbrush_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });
        let cube = mesh::unit_cube(&device);
        Self {
            device,
            queue,
            format,
            shader,
            globals_layout,
            pipeline_layout,
            cube,
            target: None,
            programs: HashMap::new(),
            pipelines: HashMap::new(),
            clear_pipeline: None,
            next_program: 0,
            pass: None,
        }
    }

    /// Points subsequent passes at `color`, a `width × height` view of the
    /// format given to [`WgpuPort::new`].
    pub fn set_target(&mut self, color: wgpu::TextureView, width: u32, height: u32) {
        let depth = match self.target.take() {
            Some(t) if t.width == width && t.height == height => t.depth,
            _ => create_depth_stencil(&self.device, width, height),
        };
        self.target = Some(Target {
            color,
            depth,
            width,
            height,
        });
    }

    /// Number of pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len() + usize::from(self.clear_pipeline.is_some())
    }

    fn build_pipeline(&self, desc: &PipelineDesc<'_>) -> wgpu::RenderPipeline {
        debug!(label = desc.label, state = ?desc.state, "building pipeline");
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some(desc.entry_point),
                    compilation_options: Default::default(),
                    buffers: desc.buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(convert::blend(desc.state.blend)),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: convert::topology(desc.topology),
                    cull_mode: convert::cull(desc.state.cull),
                    ..Default::default()
                },
                depth_stencil: Some(convert::depth_stencil(&desc.state)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
    }

    fn ensure_program_pipeline(&mut self, program: ProgramId, spec: &ProgramSpec, state: PipelineState) {
        if self.pipelines.contains_key(&(program, state)) {
            return;
        }
        let corner = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &CORNER_ATTRS,
        };
        let per_vertex = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_VERTEX_ATTRS,
        };
        let per_instance = wgpu::VertexBufferLayout {
            step_mode: wgpu::VertexStepMode::Instance,
            ..per_vertex.clone()
        };
        let pipeline = match spec.mesh {
            Some(MeshKind::UnitCube) => self.build_pipeline(&PipelineDesc {
                label: spec.label,
                entry_point: "vs_instanced",
                buffers: &[corner, per_instance],
                topology: spec.topology,
                state,
            }),
            None => self.build_pipeline(&PipelineDesc {
                label: spec.label,
                entry_point: "vs_plain",
                buffers: &[per_vertex],
                topology: spec.topology,
                state,
            }),
        };
        self.pipelines.insert((program, state), pipeline);
    }

    fn ensure_clear_pipeline(&mut self) {
        if self.clear_pipeline.is_some() {
            return;
        }
        let pipeline = self.build_pipeline(&PipelineDesc {
            label: "voxbrush_clear",
            entry_point: "vs_clear",
            buffers: &[],
            topology: Topology::TriangleList,
            state: PipelineState {
                blend: BlendMode::Replace,
                depth: DepthTest::Disabled,
                ..PipelineState::default()
            },
        });
        self.clear_pipeline = Some(pipeline);
    }

    fn globals(&self, transform: Mat4, clear_color: [f32; 4]) -> wgpu::BindGroup {
        let globals = Globals {
            transform: transform.to_cols_array_2d(),
            clear_color,
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("voxbrush_globals"),
                contents: bytemuck::bytes_of(&globals),
                usage: wgpu::BufferUsages::UNIFORM,
            });
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("voxbrush_globals_bg"),
            layout: &self.globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }

    fn encode(&self, target: &Target, pass: &PendingPass) -> Option<wgpu::CommandBuffer> {
        let ([x, y, w, h], _) = pass.placement?;
        let [sx, sy, sw, sh] = pass.scissor?;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("voxbrush_pass"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("voxbrush_overlay"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(0),
                        store: wgpu::StoreOp::Discard,
                    }),
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
            rpass.set_scissor_rect(sx, sy, sw, sh);
            rpass.set_stencil_reference(convert::stencil_reference(pass.params.state.stencil));

            if let (Some(pipeline), Some(bind_group)) = (&self.clear_pipeline, &pass.clear) {
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, bind_group, &[]);
                rpass.draw(0..3, 0..1);
            }
            for draw in &pass.draws {
                let (Some(pipeline), Some(spec)) = (
                    self.pipelines.get(&(draw.program, pass.params.state)),
                    self.programs.get(&draw.program),
                ) else {
                    continue;
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &draw.globals, &[]);
                match spec.mesh {
                    Some(MeshKind::UnitCube) => {
                        rpass.set_vertex_buffer(0, self.cube.vbuf.slice(..));
                        rpass.set_vertex_buffer(1, draw.vertices.slice(..));
                        rpass.set_index_buffer(self.cube.ibuf.slice(..), wgpu::IndexFormat::Uint16);
                        rpass.draw_indexed(0..self.cube.count, 0, 0..draw.count);
                    }
                    None => {
                        rpass.set_vertex_buffer(0, draw.vertices.slice(..));
                        rpass.draw(0..draw.count, 0..1);
                    }
                }
            }
        }
        Some(encoder.finish())
    }
}

impl GpuPort for WgpuPort {
    fn build_program(&mut self, spec: &ProgramSpec) -> Result<ProgramId, GpuError> {
        let id = ProgramId(self.next_program);
        self.next_program = self
            .next_program
            .checked_add(1)
            .ok_or_else(|| GpuError::Backend("program ids exhausted".into()))?;
        self.programs.insert(id, *spec);
        debug!(label = spec.label, ?id, "program registered");
        Ok(id)
    }

    fn release_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.pipelines.retain(|(id, _), _| *id != program);
    }

    fn begin_pass(
        &mut self,
        viewport: ViewportGeometry,
        params: &RenderParams,
    ) -> Result<(), GpuError> {
        if self.pass.is_some() {
            return Err(GpuError::PassAlreadyActive);
        }
        let Some(target) = &self.target else {
            return Err(GpuError::Backend("no render target set".into()));
        };
        let placement = convert::fit_viewport(viewport, target.width, target.height);
        let scissor =
            convert::scissor_rect(params.scissor_for(viewport), target.width, target.height);
        if placement.is_none() || scissor.is_none() {
            trace!(?viewport, "viewport misses the render target");
        }
        let clear = params.clear.map(|color| {
            self.ensure_clear_pipeline();
            self.globals(Mat4::IDENTITY, color)
        });
        self.pass = Some(PendingPass {
            params: *params,
            placement,
            scissor,
            clear,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), GpuError> {
        let Some(pass) = &self.pass else {
            return Err(GpuError::NoActivePass);
        };
        let spec = *self
            .programs
            .get(&call.program)
            .ok_or(GpuError::UnknownProgram(call.program))?;
        let (state, placement) = (pass.params.state, pass.placement);
        let Some((_, correction)) = placement else {
            return Ok(());
        };
        if call.vertices.is_empty() {
            return Ok(());
        }
        let count = u32::try_from(call.vertices.len())
            .map_err(|_| GpuError::Backend("too many vertices in one draw".into()))?;

        self.ensure_program_pipeline(call.program, &spec, state);
        let globals = self.globals(
            correction * convert::gl_to_wgpu_clip() * call.transform,
            [0.0; 4],
        );
        let vertices = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(spec.label),
                contents: bytemuck::cast_slice(call.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        if let Some(pass) = self.pass.as_mut() {
            pass.draws.push(PendingDraw {
                program: call.program,
                globals,
                vertices,
                count,
            });
        }
        Ok(())
    }

    fn end_pass(&mut self) {
        let Some(pass) = self.pass.take() else {
            return;
        };
        let Some(target) = &self.target else {
            warn!("render target dropped while a pass was open");
            return;
        };
        if let Some(commands) = self.encode(target, &pass) {
            self.queue.submit(std::iter::once(commands));
            trace!(draws = pass.draws.len(), "pass submitted");
        }
    }
}

fn create_depth_stencil(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("voxbrush_depth_stencil"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: convert::DEPTH_STENCIL_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}
