use std::ops::Range;

use super::Vertex;

/// One recorded draw: a texture binding and a range of staged vertices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StagedDraw<G> {
    pub binding: G,
    pub vertices: Range<u32>,
}

/// CPU side of a deferred frame.
///
/// `G` is whatever selects a texture at draw time (a bind group under wgpu),
/// `T` the texture type retired by `destroy_texture`. Retired textures are
/// handed back only by [`begin`](Self::begin), after every draw that could
/// reference them has been dropped from the stage.
#[derive(Debug)]
pub(crate) struct FrameStaging<G, T> {
    vertices: Vec<Vertex>,
    last_upload: Range<u32>,
    bound: Option<G>,
    draws: Vec<StagedDraw<G>>,
    retired: Vec<T>,
}

impl<G, T> Default for FrameStaging<G, T> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            last_upload: 0..0,
            bound: None,
            draws: Vec::new(),
            retired: Vec::new(),
        }
    }
}

impl<G: Clone, T> FrameStaging<G, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a frame: discards anything staged and not flushed, and returns
    /// the textures retired since the last call.
    pub fn begin(&mut self) -> Vec<T> {
        if !self.draws.is_empty() {
            log::debug!("discarding {} unflushed image draws", self.draws.len());
        }
        self.reset();
        std::mem::take(&mut self.retired)
    }

    /// Clears the stage after its draws were recorded. Retired textures stay.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.draws.clear();
        self.last_upload = 0..0;
        self.bound = None;
    }

    pub fn retire(&mut self, texture: T) {
        self.retired.push(texture);
    }

    pub fn bind(&mut self, binding: G) {
        self.bound = Some(binding);
    }

    pub fn upload(&mut self, vertices: &[Vertex]) {
        let start = self.vertices.len() as u32;
        self.vertices.extend_from_slice(vertices);
        self.last_upload = start..self.vertices.len() as u32;
    }

    /// Records a draw of the first `count` vertices of the last upload with
    /// the bound texture. Returns `false` when nothing is bound.
    pub fn draw(&mut self, count: u32) -> bool {
        let Some(binding) = self.bound.clone() else {
            return false;
        };
        let start = self.last_upload.start;
        let end = start.saturating_add(count).min(self.last_upload.end);
        self.draws.push(StagedDraw { binding, vertices: start..end });
        true
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn draws(&self) -> &[StagedDraw<G>] {
        &self.draws
    }

    #[cfg(test)]
    pub fn retired(&self) -> usize {
        self.retired.len()
    }
}
