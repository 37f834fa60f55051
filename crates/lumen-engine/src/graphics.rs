//! Image context: the public surface of the image core.
//!
//! A [`Graphics`] owns a backend, every image created through it, and the
//! render queue of the window it draws into. All calls happen on the thread
//! that owns the backend.

use log::{debug, error, trace};

use crate::coords::Viewport;
use crate::error::{GraphicsError, Result};
use crate::image::{
    Image, ImageBinding, ImageId, ImageRegistry, Instance, InstanceId, PIXEL_BYTES, QueueEntry,
    RenderQueue,
};
use crate::render::{draw_queue, Backend, RenderTarget, TextureDesc, WgpuBackend};

/// Caps on host allocations. Reaching one fails exactly like a failed
/// reservation; unset caps never trigger.
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct AllocLimits {
    pub pixel_bytes: Option<usize>,
    pub images: Option<usize>,
    pub instances: Option<usize>,
}

impl AllocLimits {
    fn exceeded(cap: Option<usize>, wanted: usize) -> bool {
        cap.is_some_and(|max| wanted > max)
    }
}

pub struct Graphics<B: Backend> {
    backend: B,
    images: ImageRegistry<B::Texture>,
    queue: RenderQueue,
    window: Viewport,
    last_error: Option<GraphicsError>,
    limits: AllocLimits,
}

impl<B: Backend> Graphics<B> {
    /// Creates an empty context drawing into a window of `window` pixels.
    pub fn new(backend: B, window: Viewport) -> Self {
        Self {
            backend,
            images: ImageRegistry::new(),
            queue: RenderQueue::new(),
            window,
            last_error: None,
            limits: AllocLimits::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_limits(mut self, limits: AllocLimits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn window_size(&self) -> Viewport {
        self.window
    }

    /// Updates the window size used by the next [`draw_all`](Self::draw_all).
    #[inline]
    pub fn set_window_size(&mut self, window: Viewport) {
        self.window = window;
    }

    // ── images ────────────────────────────────────────────────────────────

    /// Creates a zeroed `width` x `height` image with its backend texture and
    /// registers it after every existing image.
    ///
    /// On allocation failure nothing is registered and no texture is created.
    pub fn create_image(&mut self, width: u16, height: u16) -> Result<ImageId> {
        let pixels = match self.reserve_image(width, height) {
            Ok(p) => p,
            Err(err) => return Err(self.report(err)),
        };

        let texture = self
            .backend
            .create_texture(&TextureDesc::pixel_exact(width, height), &pixels);
        let image = Image::new(width, height, pixels, ImageBinding::new(texture));
        let id = self.images.insert(image);

        debug!("created image {id:?} ({width}x{height})");
        Ok(id)
    }

    /// Allocates the blank pixel buffer and a registry slot. The buffer is
    /// dropped again if the slot cannot be reserved.
    fn reserve_image(&mut self, width: u16, height: u16) -> Result<Vec<u8>> {
        let bytes = usize::from(width) * usize::from(height) * PIXEL_BYTES;
        if AllocLimits::exceeded(self.limits.pixel_bytes, bytes) {
            return Err(GraphicsError::alloc("pixel buffer"));
        }
        let pixels = Image::<B::Texture>::alloc_pixels(width, height)?;

        if AllocLimits::exceeded(self.limits.images, self.images.len() + 1) {
            return Err(GraphicsError::alloc("image registry"));
        }
        self.images.reserve()?;
        Ok(pixels)
    }

    /// Destroys an image: unregisters it, drops its queue entries and releases
    /// its texture and host buffers.
    ///
    /// Unknown or already deleted handles are ignored. Returns whether an image
    /// was deleted.
    pub fn delete_image(&mut self, id: ImageId) -> bool {
        if self.images.is_empty() {
            return false;
        }
        let Some(image) = self.images.remove(id) else {
            return false;
        };

        let purged = self.queue.purge_image(id);
        self.backend.destroy_texture(image.into_binding().into_texture());

        debug!("deleted image {id:?} ({purged} queued instances dropped)");
        true
    }

    /// Destroys every image in creation order and empties the render queue.
    pub fn clear_images(&mut self) {
        self.queue.clear();
        for (id, image) in self.images.drain() {
            self.backend.destroy_texture(image.into_binding().into_texture());
            trace!("released image {id:?}");
        }
    }

    #[inline]
    pub fn image(&self, id: ImageId) -> Option<&Image<B::Texture>> {
        self.images.get(id)
    }

    /// Mutable access, e.g. to write pixels between frames.
    #[inline]
    pub fn image_mut(&mut self, id: ImageId) -> Option<&mut Image<B::Texture>> {
        self.images.get_mut(id)
    }

    /// Live images in creation order.
    pub fn images(&self) -> impl Iterator<Item = (ImageId, &Image<B::Texture>)> {
        self.images.iter()
    }

    #[inline]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    // ── instances ─────────────────────────────────────────────────────────

    /// Places another instance of `id` at `(x, y)` (depth 0) and queues it
    /// for drawing after everything queued so far.
    ///
    /// On failure neither the image's instances nor the queue change.
    pub fn attach_image(&mut self, id: ImageId, x: i32, y: i32) -> Result<InstanceId> {
        let limit = self.limits.instances;
        let Some(image) = self.images.get_mut(id) else {
            debug!("attach to unknown image {id:?}");
            return Err(GraphicsError::UnknownImage(id));
        };

        let reserved = if AllocLimits::exceeded(limit, image.count() + 1) {
            Err(GraphicsError::alloc("instance store"))
        } else {
            image.reserve_instance()
        }
        .and_then(|()| self.queue.reserve());

        if let Err(err) = reserved {
            return Err(self.report(err));
        }

        let instance = image.push_instance(Instance::new(x, y, 0));
        self.queue.push(QueueEntry { image: id, instance });

        trace!("attached {id:?} at ({x}, {y}) as {instance:?}");
        Ok(instance)
    }

    /// Queue entries in draw order.
    #[inline]
    pub fn render_queue(&self) -> &RenderQueue {
        &self.queue
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Draws every queued instance, in queue order. Call once per frame.
    ///
    /// Each call starts a new backend frame. Deferred backends drop draws a
    /// previous call staged but never submitted; with [`WgpuBackend`] use
    /// [`render`](Graphics::render), which also submits them.
    ///
    /// Returns the number of draw calls submitted.
    pub fn draw_all(&mut self) -> usize {
        draw_queue(&mut self.backend, self.window, &mut self.images, &self.queue)
    }

    // ── errors ────────────────────────────────────────────────────────────

    /// Most recent allocation failure. Never cleared implicitly.
    #[inline]
    pub fn last_error(&self) -> Option<&GraphicsError> {
        self.last_error.as_ref()
    }

    /// Returns and clears the most recent allocation failure.
    #[inline]
    pub fn take_last_error(&mut self) -> Option<GraphicsError> {
        self.last_error.take()
    }

    fn report(&mut self, err: GraphicsError) -> GraphicsError {
        error!("{err}");
        self.last_error = Some(err.clone());
        err
    }
}

impl Graphics<WgpuBackend> {
    /// Draws every queued instance into `target`. Returns the number of draws.
    pub fn render(&mut self, target: &mut RenderTarget<'_>) -> usize {
        let drawn = self.draw_all();
        self.backend.flush(target);
        drawn
    }
}

impl<B: Backend> Drop for Graphics<B> {
    fn drop(&mut self) {
        self.clear_images();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BackendCall, HeadlessBackend, Uniform, Vertex, ortho_projection};

    fn graphics() -> Graphics<HeadlessBackend> {
        Graphics::new(HeadlessBackend::new(), Viewport::new(800, 600))
    }

    fn positions(quad: &[Vertex]) -> Vec<[f32; 2]> {
        quad.iter().map(|v| [v.pos[0], v.pos[1]]).collect()
    }

    // ── create ────────────────────────────────────────────────────────────

    #[test]
    fn create_yields_zeroed_buffer_and_registers() {
        let mut gfx = graphics();
        let id = gfx.create_image(4, 3).unwrap();

        let img = gfx.image(id).unwrap();
        assert_eq!((img.width(), img.height()), (4, 3));
        assert_eq!(img.pixels().len(), 4 * 3 * 4);
        assert!(img.pixels().iter().all(|&b| b == 0));
        assert_eq!(img.count(), 0);
        assert!(gfx.images().any(|(i, _)| i == id));
    }

    #[test]
    fn create_makes_pixel_exact_texture() {
        let mut gfx = graphics();
        gfx.create_image(2, 5).unwrap();

        match &gfx.backend().calls()[0] {
            BackendCall::CreateTexture { desc, bytes, .. } => {
                assert_eq!(*desc, TextureDesc::pixel_exact(2, 5));
                assert_eq!(*bytes, 2 * 5 * 4);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert_eq!(gfx.backend().live_textures(), 1);
    }

    fn assert_create_rolled_back(gfx: &Graphics<HeadlessBackend>, err: &GraphicsError) {
        assert!(err.is_allocation_failure());
        assert_eq!(gfx.image_count(), 0);
        assert_eq!(gfx.backend().live_textures(), 0);
        assert!(
            !gfx.backend().calls().iter().any(|c| matches!(c, BackendCall::CreateTexture { .. }))
        );
        assert_eq!(gfx.last_error(), Some(err));
    }

    #[test]
    fn create_fails_cleanly_when_pixel_buffer_cannot_grow() {
        let mut gfx =
            graphics().with_limits(AllocLimits { pixel_bytes: Some(1024), ..Default::default() });
        let err = gfx.create_image(64, 64).unwrap_err();

        assert_eq!(err, GraphicsError::AllocationFailure { what: "pixel buffer" });
        assert_create_rolled_back(&gfx, &err);

        // 16x16 is exactly at the cap.
        gfx.create_image(16, 16).unwrap();
        assert_eq!(gfx.image_count(), 1);
    }

    #[test]
    fn create_fails_cleanly_when_registry_cannot_grow() {
        let mut gfx = graphics().with_limits(AllocLimits { images: Some(0), ..Default::default() });
        let err = gfx.create_image(8, 8).unwrap_err();

        assert_eq!(err, GraphicsError::AllocationFailure { what: "image registry" });
        assert_create_rolled_back(&gfx, &err);
    }

    #[test]
    fn create_failure_keeps_existing_images() {
        let mut gfx = graphics().with_limits(AllocLimits { images: Some(1), ..Default::default() });
        let first = gfx.create_image(2, 2).unwrap();
        assert!(gfx.create_image(2, 2).is_err());

        assert_eq!(gfx.images().map(|(id, _)| id).collect::<Vec<_>>(), vec![first]);
        assert_eq!(gfx.backend().live_textures(), 1);
        assert!(gfx.last_error().is_some());
    }

    // ── attach ────────────────────────────────────────────────────────────

    #[test]
    fn attach_appends_instances_and_queue_entries() {
        let mut gfx = graphics();
        let id = gfx.create_image(2, 2).unwrap();
        let a = gfx.attach_image(id, 10, 20).unwrap();
        let b = gfx.attach_image(id, 30, 40).unwrap();

        let img = gfx.image(id).unwrap();
        assert_eq!(img.count(), 2);
        assert_eq!(img.instances(), &[Instance::new(10, 20, 0), Instance::new(30, 40, 0)]);

        let entries = gfx.render_queue().entries();
        assert_eq!(
            entries,
            &[
                QueueEntry { image: id, instance: a },
                QueueEntry { image: id, instance: b },
            ]
        );
    }

    #[test]
    fn attach_keeps_earlier_instances_in_place() {
        let mut gfx = graphics();
        let id = gfx.create_image(1, 1).unwrap();
        let first = gfx.attach_image(id, 7, 9).unwrap();
        for i in 0..64 {
            gfx.attach_image(id, i, -i).unwrap();
        }
        assert_eq!(gfx.image(id).unwrap().instance(first), Some(&Instance::new(7, 9, 0)));
        assert_eq!(gfx.image(id).unwrap().count(), 65);
    }

    #[test]
    fn attach_to_unknown_image_is_an_error() {
        let mut gfx = graphics();
        let id = gfx.create_image(1, 1).unwrap();
        gfx.delete_image(id);
        assert_eq!(gfx.attach_image(id, 0, 0), Err(GraphicsError::UnknownImage(id)));
        assert!(gfx.render_queue().is_empty());
        assert!(gfx.last_error().is_none());
    }

    #[test]
    fn failed_attach_leaves_state_untouched() {
        let mut gfx = graphics().with_limits(AllocLimits { instances: Some(2), ..Default::default() });
        let id = gfx.create_image(2, 2).unwrap();
        gfx.attach_image(id, 1, 1).unwrap();
        gfx.attach_image(id, 2, 2).unwrap();

        let before: Vec<Instance> = gfx.image(id).unwrap().instances().to_vec();
        let err = gfx.attach_image(id, 3, 3).unwrap_err();

        assert!(err.is_allocation_failure());
        assert_eq!(gfx.image(id).unwrap().count(), 2);
        assert_eq!(gfx.image(id).unwrap().instances(), before.as_slice());
        assert_eq!(gfx.render_queue().len(), 2);
        assert_eq!(gfx.last_error(), Some(&err));
    }

    #[test]
    fn last_error_persists_until_taken() {
        let mut gfx = graphics().with_limits(AllocLimits { instances: Some(0), ..Default::default() });
        let id = gfx.create_image(1, 1).unwrap();
        assert!(gfx.attach_image(id, 0, 0).is_err());

        // A later success does not clear it.
        gfx.create_image(1, 1).unwrap();
        assert!(gfx.last_error().is_some());

        assert!(gfx.take_last_error().unwrap().is_allocation_failure());
        assert!(gfx.last_error().is_none());
    }

    // ── delete ────────────────────────────────────────────────────────────

    #[test]
    fn delete_unregisters_and_releases_texture() {
        let mut gfx = graphics();
        let id = gfx.create_image(3, 3).unwrap();
        assert!(gfx.delete_image(id));

        assert!(gfx.image(id).is_none());
        assert_eq!(gfx.images().count(), 0);
        assert_eq!(gfx.backend().live_textures(), 0);
    }

    #[test]
    fn delete_twice_is_noop() {
        let mut gfx = graphics();
        let keep = gfx.create_image(1, 1).unwrap();
        let id = gfx.create_image(1, 1).unwrap();
        assert!(gfx.delete_image(id));
        assert!(!gfx.delete_image(id));

        let destroys = gfx
            .backend()
            .calls()
            .iter()
            .filter(|c| matches!(c, BackendCall::DestroyTexture(_)))
            .count();
        assert_eq!(destroys, 1);
        assert!(gfx.image(keep).is_some());
    }

    #[test]
    fn delete_on_empty_registry_is_noop() {
        let mut gfx = graphics();
        let id = gfx.create_image(1, 1).unwrap();
        gfx.delete_image(id);
        assert!(!gfx.delete_image(id));
        assert!(gfx.last_error().is_none());
    }

    #[test]
    fn delete_head_interior_tail_keeps_relative_order() {
        for victim in 0..3 {
            let mut gfx = graphics();
            let ids: Vec<ImageId> = (1..=3).map(|w| gfx.create_image(w, 1).unwrap()).collect();
            gfx.delete_image(ids[victim]);

            let remaining: Vec<ImageId> = gfx.images().map(|(id, _)| id).collect();
            let expected: Vec<ImageId> =
                ids.iter().enumerate().filter(|&(i, _)| i != victim).map(|(_, &id)| id).collect();
            assert_eq!(remaining, expected, "deleting index {victim}");
        }
    }

    #[test]
    fn delete_purges_queue_entries() {
        let mut gfx = graphics();
        let a = gfx.create_image(1, 1).unwrap();
        let b = gfx.create_image(1, 1).unwrap();
        gfx.attach_image(a, 0, 0).unwrap();
        gfx.attach_image(b, 1, 1).unwrap();
        gfx.attach_image(a, 2, 2).unwrap();

        gfx.delete_image(a);

        assert_eq!(gfx.render_queue().len(), 1);
        assert!(gfx.render_queue().iter().all(|e| e.image == b));
        gfx.backend_mut().take_calls();
        assert_eq!(gfx.draw_all(), 1);
    }

    #[test]
    fn clear_releases_every_texture() {
        let mut gfx = graphics();
        let id = gfx.create_image(2, 2).unwrap();
        gfx.create_image(2, 2).unwrap();
        gfx.create_image(2, 2).unwrap();
        gfx.attach_image(id, 0, 0).unwrap();

        gfx.clear_images();

        assert_eq!(gfx.backend().live_textures(), 0);
        assert_eq!(gfx.image_count(), 0);
        assert!(gfx.render_queue().is_empty());
        assert_eq!(gfx.draw_all(), 0);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_emits_one_call_per_instance_in_queue_order() {
        let mut gfx = graphics();
        let a = gfx.create_image(2, 2).unwrap();
        let b = gfx.create_image(4, 1).unwrap();
        gfx.attach_image(a, 10, 20).unwrap();
        gfx.attach_image(b, 0, 0).unwrap();
        gfx.attach_image(a, 30, 40).unwrap();
        gfx.backend_mut().take_calls();

        assert_eq!(gfx.draw_all(), 3);
        let quads = gfx.backend().drawn_quads();
        assert_eq!(quads.len(), 3);
        assert_eq!(
            positions(&quads[0]),
            vec![[10.0, 20.0], [12.0, 22.0], [12.0, 20.0], [10.0, 20.0], [10.0, 22.0], [12.0, 22.0]]
        );
        assert_eq!(positions(&quads[1])[1], [4.0, 1.0]);
        assert_eq!(positions(&quads[2])[0], [30.0, 40.0]);
    }

    #[test]
    fn draw_uploads_pixels_and_uniforms_per_instance() {
        let mut gfx = graphics();
        let id = gfx.create_image(1, 1).unwrap();
        gfx.attach_image(id, 0, 0).unwrap();
        gfx.image_mut(id).unwrap().put_pixel(0, 0, 0xFF0000FF);
        gfx.backend_mut().take_calls();

        gfx.draw_all();
        let calls = gfx.backend().calls();

        assert!(matches!(calls[0], BackendCall::BindTexture(_)));
        match &calls[1] {
            BackendCall::UploadPixels { pixels, width, height, .. } => {
                assert_eq!((*width, *height), (1, 1));
                assert_eq!(pixels, &vec![0xFF, 0x00, 0x00, 0xFF]);
            }
            other => panic!("unexpected call {other:?}"),
        }
        assert!(matches!(&calls[2], BackendCall::UploadVertices(v) if v.len() == 6));
        assert_eq!(
            calls[3],
            BackendCall::SetUniform(Uniform::Projection(ortho_projection(Viewport::new(800, 600))))
        );
        assert_eq!(calls[4], BackendCall::SetUniform(Uniform::TextureUnit(0)));
        assert_eq!(calls[5], BackendCall::DrawTriangles(6));
        assert_eq!(calls.len(), 6);
    }

    #[test]
    fn draw_uses_current_window_size() {
        let mut gfx = graphics();
        let id = gfx.create_image(1, 1).unwrap();
        gfx.attach_image(id, 0, 0).unwrap();
        gfx.set_window_size(Viewport::new(320, 200));
        gfx.backend_mut().take_calls();

        gfx.draw_all();
        let expected = Uniform::Projection(ortho_projection(Viewport::new(320, 200)));
        assert!(gfx.backend().calls().contains(&BackendCall::SetUniform(expected)));
    }

    #[test]
    fn draw_refreshes_scratch_vertices() {
        let mut gfx = graphics();
        let id = gfx.create_image(2, 2).unwrap();
        gfx.attach_image(id, 5, 5).unwrap();
        gfx.draw_all();

        let verts = gfx.image(id).unwrap().binding().vertices();
        assert_eq!(verts[0].pos, [5.0, 5.0, 0.0]);
        assert_eq!(verts[5].pos, [7.0, 7.0, 0.0]);
    }

    #[test]
    fn every_draw_starts_a_backend_frame() {
        let mut gfx = graphics();
        let id = gfx.create_image(1, 1).unwrap();
        gfx.attach_image(id, 0, 0).unwrap();

        gfx.draw_all();
        gfx.draw_all();
        gfx.delete_image(id);
        gfx.draw_all();
        assert_eq!(gfx.backend().frames(), 3);
    }

    #[test]
    fn empty_queue_draws_nothing() {
        let mut gfx = graphics();
        gfx.create_image(2, 2).unwrap();
        gfx.backend_mut().take_calls();
        assert_eq!(gfx.draw_all(), 0);
        assert!(gfx.backend().calls().is_empty());
    }
}
