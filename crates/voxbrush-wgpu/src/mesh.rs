// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in instance meshes.

use wgpu::util::DeviceExt;

#[derive(Debug)]
pub struct Mesh {
    pub vbuf: wgpu::Buffer,
    pub ibuf: wgpu::Buffer,
    pub count: u32,
}

const CUBE_CORNERS: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

// Counter-clockwise seen from outside.
const CUBE_INDICES: [u16; 36] = [
    0, 3, 2, 2, 1, 0, // -z
    4, 5, 6, 6, 7, 4, // +z
    0, 4, 7, 7, 3, 0, // -x
    1, 2, 6, 6, 5, 1, // +x
    0, 1, 5, 5, 4, 0, // -y
    3, 7, 6, 6, 2, 3, // +y
];

/// Unit cube spanning `[0, 1]^3`.
pub fn unit_cube(device: &wgpu::Device) -> Mesh {
    let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("unit_cube_vb"),
        contents: bytemuck::cast_slice(&CUBE_CORNERS),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ibuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("unit_cube_ib"),
        contents: bytemuck::cast_slice(&CUBE_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });
    Mesh {
        vbuf,
        ibuf,
        count: CUBE_INDICES.len() as u32,
    }
}
