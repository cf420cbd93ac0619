use std::ops::Range;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const fn v(x: f32, y: f32) -> Vertex {
    Vertex {
        position: [x, y, 0.0],
    }
}

pub const VERTICES: &[Vertex] = &[
    // head
    v(-0.4, 0.2),
    v(-0.4, -0.2),
    v(-0.7, -0.2),
    v(-0.7, 0.2),
    // left ear
    v(-0.7, 0.6),
    v(-0.5, 0.4),
    // right ear
    v(-0.7, 0.2),
    v(-0.4, 0.5),
    v(-0.4, 0.2),
    // body
    v(-0.4, -0.6),
    v(-0.4, 0.0),
    v(0.0, 0.0),
    v(0.0, 0.0),
    v(-0.3, -0.3),
    v(0.3, -0.3),
    v(0.0, 0.0),
    v(0.4, -0.6),
    v(0.4, 0.0),
    // tail
    v(0.5, 0.3),
    v(0.8, 0.5),
    v(0.7, 0.2),
    v(0.4, 0.0),
];

pub const INDICES: &[u32] = &[0, 1, 3, 1, 2, 3, 18, 19, 20, 18, 21, 20];

/// Index range of the indexed draw.
pub const INDEXED_DRAW: Range<u32> = 0..12;

/// Vertex range of the non-indexed draw (head included again, then ears, body
/// and legs). Overlaps the vertices used by `INDEXED_DRAW`.
pub const DIRECT_DRAW: Range<u32> = 0..18;
