//! Screen-space geometry shared by painting and hit-testing.

use eframe::egui::{Pos2, Rect, pos2};

use crate::config::INTERACTION;

/// Minimum horizontal padding either side of a fib band, in pixels.
const FIB_MIN_PAD_PX: f32 = 30.0;
/// Fib band padding as a share of the anchor span.
const FIB_PAD_RATIO: f32 = 0.25;

/// Distance from `p` to the closed segment `a..b`.
pub fn point_to_segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Where a ray from `p1` through `p2` leaves `viewport`.
///
/// Near-vertical rays go straight to the top or bottom edge. The result never
/// stops short of `p2`.
pub fn ray_end(p1: Pos2, p2: Pos2, viewport: Rect) -> Pos2 {
    let d = p2 - p1;

    if d.x.abs() < INTERACTION.ray_vertical_epsilon_px {
        if d.y == 0.0 {
            return p2;
        }
        let y = if d.y > 0.0 {
            viewport.bottom().max(p2.y)
        } else {
            viewport.top().min(p2.y)
        };
        return pos2(p2.x, y);
    }

    let tx = if d.x > 0.0 {
        (viewport.right() - p1.x) / d.x
    } else {
        (viewport.left() - p1.x) / d.x
    };
    let ty = if d.y > 0.0 {
        (viewport.bottom() - p1.y) / d.y
    } else if d.y < 0.0 {
        (viewport.top() - p1.y) / d.y
    } else {
        f32::INFINITY
    };

    let t = tx.min(ty).max(1.0);
    p1 + d * t
}

/// Horizontal extent of a fib band: the anchor span plus padding, clamped to
/// the viewport. Full width when either anchor time is off the axis.
pub fn fib_band_span(x1: Option<f32>, x2: Option<f32>, viewport: Rect) -> (f32, f32) {
    match (x1, x2) {
        (Some(a), Some(b)) => {
            let (min_x, max_x) = (a.min(b), a.max(b));
            let pad = ((max_x - min_x) * FIB_PAD_RATIO).max(FIB_MIN_PAD_PX);
            (
                (min_x - pad).max(viewport.left()),
                (max_x + pad).min(viewport.right()),
            )
        }
        _ => (viewport.left(), viewport.right()),
    }
}

/// Distance from `p` to `rect`, zero anywhere inside it.
pub fn rect_distance(p: Pos2, rect: Rect) -> f32 {
    rect.distance_to_pos(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 400.0))
    }

    #[test]
    fn test_segment_distance() {
        let a = pos2(0.0, 0.0);
        let b = pos2(10.0, 0.0);
        assert_eq!(point_to_segment_distance(pos2(5.0, 3.0), a, b), 3.0);
        assert_eq!(point_to_segment_distance(pos2(13.0, 4.0), a, b), 5.0);
        assert_eq!(point_to_segment_distance(pos2(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_ray_exit_point() {
        // Slope -0.5 reaches the top edge before the right edge.
        let end = ray_end(pos2(100.0, 300.0), pos2(200.0, 250.0), viewport());
        assert!((end.x - 700.0).abs() < 1e-3);
        assert!(end.y.abs() < 1e-3);

        let flat = ray_end(pos2(100.0, 200.0), pos2(200.0, 200.0), viewport());
        assert_eq!(flat, pos2(800.0, 200.0));

        let left = ray_end(pos2(500.0, 200.0), pos2(400.0, 200.0), viewport());
        assert_eq!(left, pos2(0.0, 200.0));
    }

    #[test]
    fn test_near_vertical_ray() {
        let end = ray_end(pos2(100.0, 300.0), pos2(100.2, 250.0), viewport());
        assert_eq!(end, pos2(100.2, 0.0));
        let down = ray_end(pos2(100.0, 100.0), pos2(100.0, 150.0), viewport());
        assert_eq!(down, pos2(100.0, 400.0));
        assert_eq!(ray_end(pos2(5.0, 5.0), pos2(5.0, 5.0), viewport()), pos2(5.0, 5.0));
    }

    #[test]
    fn test_fib_band_padding() {
        assert_eq!(fib_band_span(Some(300.0), Some(500.0), viewport()), (250.0, 550.0));
        assert_eq!(fib_band_span(Some(300.0), Some(320.0), viewport()), (270.0, 350.0));
        assert_eq!(fib_band_span(Some(10.0), Some(790.0), viewport()), (0.0, 800.0));
        assert_eq!(fib_band_span(None, Some(20.0), viewport()), (0.0, 800.0));
    }

    #[test]
    fn test_rect_distance() {
        let r = Rect::from_min_max(pos2(10.0, 10.0), pos2(20.0, 20.0));
        assert_eq!(rect_distance(pos2(15.0, 15.0), r), 0.0);
        assert_eq!(rect_distance(pos2(25.0, 15.0), r), 5.0);
    }
}
