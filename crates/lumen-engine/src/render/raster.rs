use log::warn;

use crate::coords::Viewport;
use crate::image::{Image, ImageRegistry, Instance, RenderQueue};

use super::backend::{Backend, Uniform};
use super::{ortho_projection, quad_vertices, Mat4};

/// Texture unit image textures are bound to.
pub const IMAGE_TEXTURE_UNIT: u32 = 0;

/// Vertices per drawn instance (two triangles).
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Draws one instance of `image`.
///
/// Rebuilds the image's scratch vertices, re-uploads the full pixel buffer,
/// sets the shader uniforms and submits a single six-vertex draw.
pub fn draw_instance<B: Backend>(
    backend: &mut B,
    projection: &Mat4,
    image: &mut Image<B::Texture>,
    instance: Instance,
) {
    let (w, h) = (image.width(), image.height());
    image.binding_mut().vertices = quad_vertices(instance.x, instance.y, w, h, instance.z);

    let binding = image.binding();
    backend.bind_texture(binding.texture());
    backend.upload_pixels(binding.texture(), w, h, image.pixels());
    backend.upload_vertices(binding.vertices());
    backend.set_uniform(Uniform::Projection(*projection));
    backend.set_uniform(Uniform::TextureUnit(IMAGE_TEXTURE_UNIT));
    backend.draw_triangles(QUAD_VERTEX_COUNT);
}

/// Starts a backend frame and draws every queued instance in queue order.
/// Returns the number of draws.
pub fn draw_queue<B: Backend>(
    backend: &mut B,
    viewport: Viewport,
    images: &mut ImageRegistry<B::Texture>,
    queue: &RenderQueue,
) -> usize {
    backend.begin_frame();

    let projection = ortho_projection(viewport);
    let mut drawn = 0;

    for entry in queue.iter() {
        let Some(image) = images.get_mut(entry.image) else {
            warn!("render queue references missing image {:?}, skipping", entry.image);
            continue;
        };
        let Some(&instance) = image.instance(entry.instance) else {
            warn!("image {:?} has no instance {:?}, skipping", entry.image, entry.instance);
            continue;
        };
        draw_instance(backend, &projection, image, instance);
        drawn += 1;
    }

    drawn
}
