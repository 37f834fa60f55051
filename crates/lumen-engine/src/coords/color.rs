/// Background color a frame is cleared to before images are drawn.
///
/// Channels are `0.0..=1.0`. The surface is not sRGB by default, so the
/// values reach the screen as written, like image pixels do.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// From a packed `0xRRGGBBAA` value, the same layout `Image::put_pixel`
    /// takes.
    pub fn from_rgba8(color: u32) -> Self {
        let [r, g, b, a] = color.to_be_bytes().map(|c| f32::from(c) / 255.0);
        Self { r, g, b, a }
    }
}

impl From<ClearColor> for wgpu::Color {
    fn from(c: ClearColor) -> Self {
        wgpu::Color {
            r: f64::from(c.r),
            g: f64::from(c.g),
            b: f64::from(c.b),
            a: f64::from(c.a),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_channels_are_big_endian() {
        let c = ClearColor::from_rgba8(0xFF00_33FF);
        assert_eq!(c.r, 1.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.2).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn converts_to_wgpu_color() {
        let c: wgpu::Color = ClearColor::BLACK.into();
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 0.0, 0.0, 1.0));
    }
}
