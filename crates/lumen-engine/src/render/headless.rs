use super::backend::{Backend, TextureDesc, Uniform};
use super::Vertex;

/// Handle issued by [`HeadlessBackend`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HeadlessTexture(pub u32);

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateTexture { texture: HeadlessTexture, desc: TextureDesc, bytes: usize },
    DestroyTexture(HeadlessTexture),
    BindTexture(HeadlessTexture),
    UploadPixels { texture: HeadlessTexture, width: u16, height: u16, pixels: Vec<u8> },
    UploadVertices(Vec<Vertex>),
    SetUniform(Uniform),
    DrawTriangles(u32),
}

/// Backend that records every call instead of touching a GPU.
///
/// Useful for tests and for checking what a frame would submit.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    calls: Vec<BackendCall>,
    next_texture: u32,
    live_textures: usize,
    frames: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Returns recorded calls and starts a fresh log.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Textures created and not yet destroyed.
    #[inline]
    pub fn live_textures(&self) -> usize {
        self.live_textures
    }

    /// Vertex uploads that were followed by a draw, in submission order.
    pub fn drawn_quads(&self) -> Vec<Vec<Vertex>> {
        let mut last_upload: Option<&Vec<Vertex>> = None;
        let mut out = Vec::new();
        for call in &self.calls {
            match call {
                BackendCall::UploadVertices(v) => last_upload = Some(v),
                BackendCall::DrawTriangles(_) => {
                    if let Some(v) = last_upload {
                        out.push(v.clone());
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Frames started through [`Backend::begin_frame`].
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Backend for HeadlessBackend {
    type Texture = HeadlessTexture;

    fn begin_frame(&mut self) {
        self.frames += 1;
    }

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> HeadlessTexture {
        let texture = HeadlessTexture(self.next_texture);
        self.next_texture = self.next_texture.wrapping_add(1);
        self.live_textures += 1;
        self.calls.push(BackendCall::CreateTexture {
            texture,
            desc: *desc,
            bytes: pixels.len(),
        });
        texture
    }

    fn destroy_texture(&mut self, texture: HeadlessTexture) {
        self.live_textures = self.live_textures.saturating_sub(1);
        self.calls.push(BackendCall::DestroyTexture(texture));
    }

    fn bind_texture(&mut self, texture: &HeadlessTexture) {
        self.calls.push(BackendCall::BindTexture(*texture));
    }

    fn upload_pixels(&mut self, texture: &HeadlessTexture, width: u16, height: u16, pixels: &[u8]) {
        self.calls.push(BackendCall::UploadPixels {
            texture: *texture,
            width,
            height,
            pixels: pixels.to_vec(),
        });
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.calls.push(BackendCall::UploadVertices(vertices.to_vec()));
    }

    fn set_uniform(&mut self, uniform: Uniform) {
        self.calls.push(BackendCall::SetUniform(uniform));
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        self.calls.push(BackendCall::DrawTriangles(vertex_count));
    }
}
