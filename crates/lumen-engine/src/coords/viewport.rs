/// Window drawable size in pixels.
///
/// Image coordinates map 1:1 onto this space: `(0, 0)` is the top-left pixel,
/// `(width, height)` the bottom-right corner.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True while the window is minimized or collapsed to a line.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size as floats with each axis clamped to at least 1.
    #[inline]
    pub fn clamped(self) -> (f32, f32) {
        (self.width.max(1) as f32, self.height.max(1) as f32)
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Viewport {
    #[inline]
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}
