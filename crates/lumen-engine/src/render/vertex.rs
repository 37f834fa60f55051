use bytemuck::{Pod, Zeroable};

/// Textured vertex in window pixel space.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3], // px, px, depth
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // pos
        1 => Float32x2  // uv
    ];

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self { pos: [x, y, z], uv: [u, v] }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Two triangles covering `(x, y)`..`(x + w, y + h)` at depth `z`.
///
/// Order: top-left, bottom-right, top-right, top-left, bottom-left, bottom-right.
/// UVs span `(0, 0)`..`(1, 1)` with `v` growing downwards.
pub fn quad_vertices(x: i32, y: i32, w: u16, h: u16, z: i32) -> [Vertex; 6] {
    let x0 = x as f32;
    let y0 = y as f32;
    let x1 = x0 + f32::from(w);
    let y1 = y0 + f32::from(h);
    let z = z as f32;

    [
        Vertex::new(x0, y0, z, 0.0, 0.0),
        Vertex::new(x1, y1, z, 1.0, 1.0),
        Vertex::new(x1, y0, z, 1.0, 0.0),
        Vertex::new(x0, y0, z, 0.0, 0.0),
        Vertex::new(x0, y1, z, 0.0, 1.0),
        Vertex::new(x1, y1, z, 1.0, 1.0),
    ]
}
