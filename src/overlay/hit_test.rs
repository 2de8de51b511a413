//! Pixel-proximity queries for selection, hover and drag.
//!
//! Drawings are tested back to front so the most recently added one wins.
//! Anything the mapper cannot place this frame is skipped.

use eframe::egui::{Pos2, Rect};

use crate::{
    models::{Drawing, DrawingId, DrawingShape, Handle, Position, PositionField, PositionId},
    overlay::{
        geometry::{fib_band_span, point_to_segment_distance, ray_end, rect_distance},
        mapper::CoordinateMapper,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingHit {
    pub id: DrawingId,
    pub handle: Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionLineHit {
    pub id: PositionId,
    pub field: PositionField,
}

/// Pixel distance from `pos` to the drawn geometry, `None` if the drawing is
/// not on screen.
pub fn drawing_distance(drawing: &Drawing, mapper: &dyn CoordinateMapper, pos: Pos2) -> Option<f32> {
    match drawing.shape {
        DrawingShape::Horizontal { price } => Some((pos.y - mapper.price_to_y(price)?).abs()),
        DrawingShape::Trendline { p1, p2 } => {
            let a = mapper.to_screen(p1)?;
            let b = mapper.to_screen(p2)?;
            Some(point_to_segment_distance(pos, a, b))
        }
        DrawingShape::Ray { p1, p2 } => {
            let a = mapper.to_screen(p1)?;
            let b = mapper.to_screen(p2)?;
            let end = ray_end(a, b, mapper.viewport());
            Some(point_to_segment_distance(pos, a, end))
        }
        DrawingShape::Fib { p1, p2 } => {
            let (left, right) = fib_band_span(
                mapper.time_to_x(p1.time),
                mapper.time_to_x(p2.time),
                mapper.viewport(),
            );
            if pos.x < left || pos.x > right {
                return None;
            }
            drawing
                .fib_levels()?
                .iter()
                .filter_map(|&(_, price)| mapper.price_to_y(price))
                .map(|y| (pos.y - y).abs())
                .min_by(f32::total_cmp)
        }
        DrawingShape::Rectangle { p1, p2 } => {
            let a = mapper.to_screen(p1)?;
            let b = mapper.to_screen(p2)?;
            Some(rect_distance(pos, Rect::from_two_pos(a, b)))
        }
    }
}

/// Nearest drawing within `threshold` pixels. On equal distance the topmost
/// drawing wins.
pub fn hit_test_drawing(
    drawings: &[Drawing],
    mapper: &dyn CoordinateMapper,
    pos: Pos2,
    threshold: f32,
) -> Option<DrawingId> {
    let mut best: Option<(DrawingId, f32)> = None;
    for drawing in drawings.iter().rev() {
        let Some(dist) = drawing_distance(drawing, mapper, pos) else {
            continue;
        };
        if dist > threshold {
            continue;
        }
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((drawing.id, dist));
        }
    }
    best.map(|(id, _)| id)
}

/// Which part of the topmost drawing under `pos` was grabbed. Endpoints are
/// checked within `handle_radius` before the body within `body_threshold`.
pub fn hit_test_handle(
    drawings: &[Drawing],
    mapper: &dyn CoordinateMapper,
    pos: Pos2,
    handle_radius: f32,
    body_threshold: f32,
) -> Option<DrawingHit> {
    for drawing in drawings.iter().rev() {
        if let Some((p1, p2)) = drawing.endpoints() {
            for (handle, point) in [(Handle::P1, p1), (Handle::P2, p2)] {
                if mapper
                    .to_screen(point)
                    .is_some_and(|s| s.distance(pos) <= handle_radius)
                {
                    return Some(DrawingHit {
                        id: drawing.id,
                        handle,
                    });
                }
            }
        }
        if drawing_distance(drawing, mapper, pos).is_some_and(|d| d <= body_threshold) {
            return Some(DrawingHit {
                id: drawing.id,
                handle: Handle::Body,
            });
        }
    }
    None
}

/// First active position whose SL or TP line lies within `threshold` of `y`.
pub fn hit_test_position_line(
    positions: &[Position],
    mapper: &dyn CoordinateMapper,
    y: f32,
    threshold: f32,
) -> Option<PositionLineHit> {
    positions
        .iter()
        .filter(|p| p.active)
        .find_map(|pos| {
            [PositionField::Sl, PositionField::Tp]
                .into_iter()
                .find(|&field| {
                    pos.field(field)
                        .and_then(|price| mapper.price_to_y(price))
                        .is_some_and(|line_y| (y - line_y).abs() <= threshold)
                })
                .map(|field| PositionLineHit { id: pos.id, field })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::INTERACTION,
        domain::ChartPoint,
        models::PositionSide,
        overlay::mapper::LinearMapper,
    };
    use eframe::egui::pos2;

    // 1 px per second horizontally, 5 px per price unit vertically.
    fn mapper() -> LinearMapper {
        LinearMapper::new(
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 500.0)),
            (0.0, 1000.0),
            (100.0, 200.0),
        )
    }

    fn horizontal(price: f64) -> Drawing {
        Drawing::new(DrawingShape::Horizontal { price })
    }

    #[test]
    fn test_horizontal_threshold_edge() {
        let m = mapper();
        let line = horizontal(150.0); // y = 250
        let drawings = vec![line.clone()];
        let t = INTERACTION.hit_threshold_px;

        assert_eq!(hit_test_drawing(&drawings, &m, pos2(10.0, 250.0), t), Some(line.id));
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(10.0, 250.0 + t), t), Some(line.id));
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(10.0, 250.0 + t + 1.0), t), None);
    }

    #[test]
    fn test_nearest_then_topmost() {
        let m = mapper();
        let lower = horizontal(150.0); // y = 250
        let upper = horizontal(151.0); // y = 245
        let drawings = vec![lower.clone(), upper.clone()];
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(0.0, 249.0), 7.0), Some(lower.id));

        let twin = horizontal(150.0);
        let stacked = vec![lower.clone(), twin.clone()];
        assert_eq!(hit_test_drawing(&stacked, &m, pos2(0.0, 250.0), 7.0), Some(twin.id));
    }

    #[test]
    fn test_trendline_segment_only() {
        let m = mapper();
        let line = Drawing::new(DrawingShape::Trendline {
            p1: ChartPoint::new(100, 150.0),
            p2: ChartPoint::new(300, 150.0),
        });
        let drawings = vec![line.clone()];
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(200.0, 253.0), 7.0), Some(line.id));
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(400.0, 250.0), 7.0), None);
    }

    #[test]
    fn test_ray_extends_past_direction_point() {
        let m = mapper();
        let ray = Drawing::new(DrawingShape::Ray {
            p1: ChartPoint::new(100, 150.0),
            p2: ChartPoint::new(300, 150.0),
        });
        let drawings = vec![ray.clone()];
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(900.0, 250.0), 7.0), Some(ray.id));
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(50.0, 250.0), 7.0), None);
    }

    #[test]
    fn test_fib_levels_within_band() {
        let m = mapper();
        let fib = Drawing::new(DrawingShape::Fib {
            p1: ChartPoint::new(400, 120.0),
            p2: ChartPoint::new(600, 180.0),
        });
        let drawings = vec![fib.clone()];
        // 50% level at price 150 -> y 250
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(500.0, 252.0), 7.0), Some(fib.id));
        // Band spans 350..650
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(900.0, 250.0), 7.0), None);
    }

    #[test]
    fn test_rectangle_inside_and_border() {
        let m = mapper();
        let rect = Drawing::new(DrawingShape::Rectangle {
            p1: ChartPoint::new(100, 180.0),
            p2: ChartPoint::new(300, 140.0),
        });
        let drawings = vec![rect.clone()];
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(200.0, 200.0), 7.0), Some(rect.id));
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(305.0, 200.0), 7.0), Some(rect.id));
        assert_eq!(hit_test_drawing(&drawings, &m, pos2(320.0, 200.0), 7.0), None);
    }

    #[test]
    fn test_handle_priority() {
        let m = mapper();
        let line = Drawing::new(DrawingShape::Trendline {
            p1: ChartPoint::new(100, 150.0),
            p2: ChartPoint::new(300, 150.0),
        });
        let drawings = vec![line.clone()];
        let hit = |x, y| hit_test_handle(&drawings, &m, pos2(x, y), 10.0, 7.0);

        assert_eq!(hit(108.0, 250.0).map(|h| h.handle), Some(Handle::P1));
        assert_eq!(hit(295.0, 255.0).map(|h| h.handle), Some(Handle::P2));
        assert_eq!(hit(200.0, 255.0).map(|h| h.handle), Some(Handle::Body));
        assert_eq!(hit(200.0, 260.0), None);

        let h = horizontal(150.0);
        let only_h = vec![h.clone()];
        assert_eq!(
            hit_test_handle(&only_h, &m, pos2(5.0, 250.0), 10.0, 7.0),
            Some(DrawingHit { id: h.id, handle: Handle::Body })
        );
    }

    #[test]
    fn test_position_lines() {
        let m = mapper();
        let mut pos = Position::pending(PositionSide::Long, 150.0, Some(140.0), Some(170.0), 0);
        let positions = vec![pos.clone()];
        // SL at y 300, TP at y 150
        assert_eq!(
            hit_test_position_line(&positions, &m, 305.0, 10.0),
            Some(PositionLineHit { id: pos.id, field: PositionField::Sl })
        );
        assert_eq!(
            hit_test_position_line(&positions, &m, 141.0, 10.0),
            Some(PositionLineHit { id: pos.id, field: PositionField::Tp })
        );
        assert_eq!(hit_test_position_line(&positions, &m, 250.0, 10.0), None);

        pos.active = false;
        assert_eq!(hit_test_position_line(&[pos], &m, 300.0, 10.0), None);
    }
}
