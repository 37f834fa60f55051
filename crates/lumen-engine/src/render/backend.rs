use super::{Mat4, Vertex};

/// Parameters for a new RGBA8 image texture.
///
/// Image textures are always sampled pixel-exact: nearest filtering, edges
/// clamped.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureDesc {
    pub width: u16,
    pub height: u16,
}

impl TextureDesc {
    #[inline]
    pub const fn pixel_exact(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Values the image shader reads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Uniform {
    /// Pixel-to-clip-space matrix (`proj_matrix`).
    Projection(Mat4),
    /// Texture unit the sampler reads from.
    TextureUnit(u32),
}

/// Graphics capabilities consumed by the image core.
///
/// Calls are made on the thread that owns the context. Failures below this
/// layer are not reported back; implementations log and carry on.
pub trait Backend {
    /// Opaque texture handle. Owned by exactly one image.
    type Texture;

    /// Called once before the draws of a frame. Work staged by an earlier
    /// frame that was never submitted is discarded.
    fn begin_frame(&mut self) {}

    fn create_texture(&mut self, desc: &TextureDesc, pixels: &[u8]) -> Self::Texture;

    /// Releases a texture. Called exactly once per handle.
    fn destroy_texture(&mut self, texture: Self::Texture);

    fn bind_texture(&mut self, texture: &Self::Texture);

    /// Replaces the full contents of `texture` with `pixels` (RGBA8).
    fn upload_pixels(&mut self, texture: &Self::Texture, width: u16, height: u16, pixels: &[u8]);

    fn upload_vertices(&mut self, vertices: &[Vertex]);

    fn set_uniform(&mut self, uniform: Uniform);

    /// Draws `vertex_count` vertices from the last upload as a triangle list.
    fn draw_triangles(&mut self, vertex_count: u32);
}
