use crate::render::Vertex;

/// Backend resources owned by one image: its texture and a reusable
/// six-vertex scratch buffer rebuilt for every drawn instance.
///
/// The texture handle is never cloned out; it leaves the binding only through
/// [`into_texture`](Self::into_texture) when the image is destroyed.
#[derive(Debug)]
pub struct ImageBinding<T> {
    texture: T,
    pub(crate) vertices: [Vertex; 6],
}

impl<T> ImageBinding<T> {
    #[inline]
    pub fn new(texture: T) -> Self {
        Self {
            texture,
            vertices: [Vertex::default(); 6],
        }
    }

    #[inline]
    pub fn texture(&self) -> &T {
        &self.texture
    }

    /// Vertices written by the last draw of this image.
    #[inline]
    pub fn vertices(&self) -> &[Vertex; 6] {
        &self.vertices
    }

    #[inline]
    pub fn into_texture(self) -> T {
        self.texture
    }
}
