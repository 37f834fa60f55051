use crate::coords::Viewport;

/// Near/far planes of the orthographic depth range.
pub const DEPTH_NEAR: f32 = -1000.0;
pub const DEPTH_FAR: f32 = 1000.0;

/// Column-major 4x4 matrix, as uploaded to the shader.
pub type Mat4 = [[f32; 4]; 4];

/// Orthographic projection mapping window pixels to clip space.
///
/// Pixel `(0, 0)` lands on NDC `(-1, 1)` and `(width, height)` on `(1, -1)`.
/// Depth is scaled linearly over `[DEPTH_NEAR, DEPTH_FAR]`; `w` stays 1.
/// A zero-sized viewport is treated as 1x1.
pub fn ortho_projection(viewport: Viewport) -> Mat4 {
    let (w, h) = viewport.clamped();
    let depth = DEPTH_FAR - DEPTH_NEAR;

    [
        [2.0 / w, 0.0, 0.0, 0.0],
        [0.0, -2.0 / h, 0.0, 0.0],
        [0.0, 0.0, -2.0 / depth, 0.0],
        [-1.0, 1.0, -(DEPTH_FAR + DEPTH_NEAR) / depth, 1.0],
    ]
}

/// Applies `m` to a point (`w = 1`).
pub fn transform_point(m: &Mat4, p: [f32; 3]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for (row, o) in out.iter_mut().enumerate() {
        *o = m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndc(vp: Viewport, x: f32, y: f32) -> (f32, f32) {
        let p = transform_point(&ortho_projection(vp), [x, y, 0.0]);
        (p[0] / p[3], p[1] / p[3])
    }

    fn assert_near(got: (f32, f32), want: (f32, f32)) {
        assert!(
            (got.0 - want.0).abs() < 1e-5 && (got.1 - want.1).abs() < 1e-5,
            "got {got:?}, want {want:?}"
        );
    }

    #[test]
    fn origin_maps_to_top_left() {
        assert_near(ndc(Viewport::new(800, 600), 0.0, 0.0), (-1.0, 1.0));
    }

    #[test]
    fn far_corner_maps_to_bottom_right() {
        assert_near(ndc(Viewport::new(800, 600), 800.0, 600.0), (1.0, -1.0));
    }

    #[test]
    fn center_maps_to_origin() {
        assert_near(ndc(Viewport::new(640, 480), 320.0, 240.0), (0.0, 0.0));
    }

    #[test]
    fn follows_window_resize() {
        assert_near(ndc(Viewport::new(100, 50), 100.0, 50.0), (1.0, -1.0));
        assert_near(ndc(Viewport::new(200, 100), 100.0, 50.0), (0.0, 0.0));
    }

    #[test]
    fn depth_is_linear_and_symmetric() {
        let m = ortho_projection(Viewport::new(10, 10));
        assert_eq!(transform_point(&m, [0.0, 0.0, 0.0])[2], 0.0);
        assert!((transform_point(&m, [0.0, 0.0, DEPTH_FAR])[2] + 1.0).abs() < 1e-5);
        assert!((transform_point(&m, [0.0, 0.0, DEPTH_NEAR])[2] - 1.0).abs() < 1e-5);
        assert_eq!(transform_point(&m, [3.0, 4.0, 5.0])[3], 1.0);
    }

    #[test]
    fn zero_viewport_does_not_divide_by_zero() {
        let m = ortho_projection(Viewport::new(0, 0));
        assert!(m.iter().flatten().all(|v| v.is_finite()));
    }
}
