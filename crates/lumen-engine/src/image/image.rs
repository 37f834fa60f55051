use crate::error::{GraphicsError, Result};

use super::{ImageBinding, Instance, InstanceId};

/// Bytes per RGBA8 pixel.
pub const PIXEL_BYTES: usize = 4;

/// A fixed-size RGBA8 pixel buffer backed by a GPU texture.
///
/// `width` and `height` are set once at construction; there is no way to
/// change them afterwards. Pixels may be written freely between frames and
/// are re-uploaded every time an instance of the image is drawn.
#[derive(Debug)]
pub struct Image<T> {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    instances: Vec<Instance>,
    binding: ImageBinding<T>,
}

impl<T> Image<T> {
    /// Builds an image around an already allocated, zeroed pixel buffer.
    pub(crate) fn new(width: u16, height: u16, pixels: Vec<u8>, binding: ImageBinding<T>) -> Self {
        debug_assert_eq!(pixels.len(), usize::from(width) * usize::from(height) * PIXEL_BYTES);
        Self {
            width,
            height,
            pixels,
            instances: Vec::new(),
            binding,
        }
    }

    /// Allocates a zeroed `width * height` RGBA8 buffer without aborting on OOM.
    pub(crate) fn alloc_pixels(width: u16, height: u16) -> Result<Vec<u8>> {
        let len = usize::from(width)
            .checked_mul(usize::from(height))
            .and_then(|n| n.checked_mul(PIXEL_BYTES))
            .ok_or(GraphicsError::alloc("pixel buffer"))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(len)
            .map_err(|_| GraphicsError::alloc("pixel buffer"))?;
        pixels.resize(len, 0);
        Ok(pixels)
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major, top row first.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Writes one pixel. `color` is packed as `0xRRGGBBAA`.
    ///
    /// Returns `false` (and writes nothing) when `(x, y)` is outside the image.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: u32) -> bool {
        if x >= u32::from(self.width) || y >= u32::from(self.height) {
            return false;
        }
        let offset = (y as usize * usize::from(self.width) + x as usize) * PIXEL_BYTES;
        self.pixels[offset..offset + PIXEL_BYTES].copy_from_slice(&color.to_be_bytes());
        true
    }

    /// Reads one pixel packed as `0xRRGGBBAA`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= u32::from(self.width) || y >= u32::from(self.height) {
            return None;
        }
        let offset = (y as usize * usize::from(self.width) + x as usize) * PIXEL_BYTES;
        let mut bytes = [0u8; PIXEL_BYTES];
        bytes.copy_from_slice(&self.pixels[offset..offset + PIXEL_BYTES]);
        Some(u32::from_be_bytes(bytes))
    }

    /// Placements in attach order.
    #[inline]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    #[inline]
    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(id.index())
    }

    /// Number of attached instances. Always `instances().len()`.
    #[inline]
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    #[inline]
    pub fn binding(&self) -> &ImageBinding<T> {
        &self.binding
    }

    #[inline]
    pub(crate) fn binding_mut(&mut self) -> &mut ImageBinding<T> {
        &mut self.binding
    }

    /// Makes room for one more instance. On failure the instance list is untouched.
    pub(crate) fn reserve_instance(&mut self) -> Result<()> {
        if self.instances.len() >= u32::MAX as usize {
            return Err(GraphicsError::alloc("instance store"));
        }
        self.instances
            .try_reserve(1)
            .map_err(|_| GraphicsError::alloc("instance store"))
    }

    /// Appends an instance. Callers reserve first so this never reallocates
    /// on a path that could fail.
    pub(crate) fn push_instance(&mut self, instance: Instance) -> InstanceId {
        let id = InstanceId(self.instances.len() as u32);
        self.instances.push(instance);
        id
    }

    /// Splits the image into its backend binding, dropping host storage.
    pub(crate) fn into_binding(self) -> ImageBinding<T> {
        self.binding
    }
}
