use crate::error::{GraphicsError, Result};

use super::{ImageId, InstanceId};

/// One thing to draw: an image and one of its instances.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct QueueEntry {
    pub image: ImageId,
    pub instance: InstanceId,
}

/// Draw order for a window.
///
/// Entries are drawn in insertion order; later entries paint over earlier
/// ones. Entries reference instances by id, never by address, so growing an
/// image's instance list cannot invalidate them.
#[derive(Debug, Default)]
pub struct RenderQueue {
    entries: Vec<QueueEntry>,
}

impl RenderQueue {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in draw order.
    #[inline]
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub(crate) fn reserve(&mut self) -> Result<()> {
        self.entries
            .try_reserve(1)
            .map_err(|_| GraphicsError::alloc("render queue"))
    }

    #[inline]
    pub(crate) fn push(&mut self, entry: QueueEntry) {
        self.entries.push(entry);
    }

    /// Drops every entry that references `image`. Returns how many were removed.
    pub(crate) fn purge_image(&mut self, image: ImageId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.image != image);
        before - self.entries.len()
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use slotmap::SlotMap;

    use super::*;

    fn ids(n: usize) -> Vec<ImageId> {
        let mut map: SlotMap<ImageId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    fn entry(image: ImageId, i: u32) -> QueueEntry {
        QueueEntry { image, instance: InstanceId(i) }
    }

    #[test]
    fn keeps_insertion_order_across_images() {
        let ids = ids(2);
        let mut q = RenderQueue::new();
        q.push(entry(ids[0], 0));
        q.push(entry(ids[1], 0));
        q.push(entry(ids[0], 1));

        let got: Vec<_> = q.iter().map(|e| (e.image, e.instance.index())).collect();
        assert_eq!(got, vec![(ids[0], 0), (ids[1], 0), (ids[0], 1)]);
    }

    #[test]
    fn purge_removes_only_matching_image() {
        let ids = ids(2);
        let mut q = RenderQueue::new();
        q.push(entry(ids[0], 0));
        q.push(entry(ids[1], 0));
        q.push(entry(ids[0], 1));
        q.push(entry(ids[1], 1));

        assert_eq!(q.purge_image(ids[0]), 2);
        assert_eq!(q.entries(), &[entry(ids[1], 0), entry(ids[1], 1)]);
        assert_eq!(q.purge_image(ids[0]), 0);
    }
}
