use slotmap::SlotMap;

use crate::error::{GraphicsError, Result};

use super::{Image, ImageId};

/// All live images of one graphics context.
///
/// Storage is a slot map, so lookups are O(1) and stale handles resolve to
/// nothing. A separate key list keeps creation order for traversal; removing
/// an image preserves the relative order of the rest.
#[derive(Debug)]
pub struct ImageRegistry<T> {
    slots: SlotMap<ImageId, Image<T>>,
    order: Vec<ImageId>,
}

impl<T> Default for ImageRegistry<T> {
    fn default() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

impl<T> ImageRegistry<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: ImageId) -> bool {
        self.slots.contains_key(id)
    }

    #[inline]
    pub fn get(&self, id: ImageId) -> Option<&Image<T>> {
        self.slots.get(id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ImageId) -> Option<&mut Image<T>> {
        self.slots.get_mut(id)
    }

    /// Handles in creation order.
    #[inline]
    pub fn ids(&self) -> &[ImageId] {
        &self.order
    }

    /// Iterates images in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageId, &Image<T>)> {
        self.order.iter().filter_map(|&id| self.slots.get(id).map(|img| (id, img)))
    }

    /// Makes room for one more image so that [`insert`](Self::insert) cannot
    /// fail halfway through registration.
    pub(crate) fn reserve(&mut self) -> Result<()> {
        self.order
            .try_reserve(1)
            .map_err(|_| GraphicsError::alloc("image registry"))?;
        self.slots.reserve(1);
        Ok(())
    }

    /// Registers `image` at the tail.
    pub(crate) fn insert(&mut self, image: Image<T>) -> ImageId {
        let id = self.slots.insert(image);
        self.order.push(id);
        id
    }

    /// Unregisters and returns the image, or `None` for an unknown/stale id.
    pub(crate) fn remove(&mut self, id: ImageId) -> Option<Image<T>> {
        let image = self.slots.remove(id)?;
        if let Some(pos) = self.order.iter().position(|&k| k == id) {
            self.order.remove(pos);
        }
        Some(image)
    }

    /// Removes every image, returning them in creation order.
    pub(crate) fn drain(&mut self) -> Vec<(ImageId, Image<T>)> {
        let order = std::mem::take(&mut self.order);
        let drained = order
            .into_iter()
            .filter_map(|id| self.slots.remove(id).map(|img| (id, img)))
            .collect();
        self.slots.clear();
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageBinding;

    fn image(tag: u8) -> Image<u8> {
        let pixels = Image::<u8>::alloc_pixels(1, 1).unwrap();
        Image::new(1, 1, pixels, ImageBinding::new(tag))
    }

    fn registry_of_three() -> (ImageRegistry<u8>, [ImageId; 3]) {
        let mut reg = ImageRegistry::new();
        let a = reg.insert(image(0));
        let b = reg.insert(image(1));
        let c = reg.insert(image(2));
        (reg, [a, b, c])
    }

    fn tags(reg: &ImageRegistry<u8>) -> Vec<u8> {
        reg.iter().map(|(_, img)| *img.binding().texture()).collect()
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn iterates_in_creation_order() {
        let (reg, ids) = registry_of_three();
        assert_eq!(tags(&reg), vec![0, 1, 2]);
        assert_eq!(reg.ids(), &ids);
    }

    #[test]
    fn removing_head_keeps_order() {
        let (mut reg, [a, ..]) = registry_of_three();
        assert!(reg.remove(a).is_some());
        assert_eq!(tags(&reg), vec![1, 2]);
    }

    #[test]
    fn removing_interior_keeps_order() {
        let (mut reg, [_, b, _]) = registry_of_three();
        assert!(reg.remove(b).is_some());
        assert_eq!(tags(&reg), vec![0, 2]);
    }

    #[test]
    fn removing_tail_keeps_order() {
        let (mut reg, [.., c]) = registry_of_three();
        assert!(reg.remove(c).is_some());
        assert_eq!(tags(&reg), vec![0, 1]);
    }

    // ── stale handles ─────────────────────────────────────────────────────

    #[test]
    fn removing_twice_is_noop() {
        let (mut reg, [a, ..]) = registry_of_three();
        assert!(reg.remove(a).is_some());
        assert!(reg.remove(a).is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn stale_handle_does_not_resolve_to_reused_slot() {
        let mut reg = ImageRegistry::new();
        let a = reg.insert(image(7));
        reg.remove(a);
        let b = reg.insert(image(8));
        assert_ne!(a, b);
        assert!(reg.get(a).is_none());
        assert!(reg.contains(b));
    }

    #[test]
    fn drain_empties_in_order() {
        let (mut reg, _) = registry_of_three();
        let drained: Vec<u8> =
            reg.drain().into_iter().map(|(_, img)| *img.binding().texture()).collect();
        assert_eq!(drained, vec![0, 1, 2]);
        assert!(reg.is_empty());
    }
}
