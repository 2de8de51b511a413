//! Overlay layers: drawings, positions and in-progress tool previews.

use eframe::egui::{Color32, Pos2, Rect, Stroke, pos2};

use crate::{
    config::{INTERACTION, OverlayTheme},
    engine::{PositionPreview, ToolPreview},
    models::{Drawing, DrawingId, DrawingShape, FIB_LEVELS, Position, PositionField, PositionSide},
    overlay::{
        frame::{OverlayFrame, PillAlign},
        geometry::{fib_band_span, ray_end},
        hit_test::PositionLineHit,
        mapper::CoordinateMapper,
    },
    trace_time,
};

/// Everything a layer may read while building a frame.
/// This prevents argument explosion.
pub struct OverlayContext<'a> {
    pub drawings: &'a [Drawing],
    pub positions: &'a [Position],
    pub mapper: &'a dyn CoordinateMapper,
    pub theme: &'a OverlayTheme,
    /// Close of the last visible candle, for live pnl
    pub last_price: Option<f64>,
    pub hovered: Option<DrawingId>,
    pub selected: Option<DrawingId>,
    pub dragging_drawing: Option<DrawingId>,
    pub dragging_line: Option<PositionLineHit>,
    pub preview: Option<&'a ToolPreview>,
}

impl OverlayContext<'_> {
    fn is_emphasised(&self, id: DrawingId) -> bool {
        self.hovered == Some(id) || self.selected == Some(id) || self.dragging_drawing == Some(id)
    }

    fn is_dragging_line(&self, position: &Position, field: PositionField) -> bool {
        self.dragging_line
            .is_some_and(|hit| hit.id == position.id && hit.field == field)
    }
}

/// One pass over the overlay state.
pub trait OverlayLayer {
    fn build(&self, frame: &mut OverlayFrame, ctx: &OverlayContext);
}

/// Run every layer, bottom to top.
pub fn build_overlay(ctx: &OverlayContext) -> OverlayFrame {
    trace_time!("Build overlay frame", 2_000, {
        let layers: [&dyn OverlayLayer; 3] = [&DrawingsLayer, &PositionsLayer, &PreviewLayer];
        let mut frame = OverlayFrame::new();
        for layer in layers {
            layer.build(&mut frame, ctx);
        }
        frame
    })
}

fn signed_pct(value: f64) -> String {
    format!("{:+.2}%", value)
}

fn drawing_color(drawing: &Drawing, theme: &OverlayTheme) -> Color32 {
    drawing
        .color
        .map(|[r, g, b, a]| Color32::from_rgba_unmultiplied(r, g, b, a))
        .unwrap_or_else(|| theme.drawing_color(drawing.kind()))
}

fn handle(frame: &mut OverlayFrame, at: Pos2, color: Color32, theme: &OverlayTheme) {
    frame.circle(
        at,
        INTERACTION.handle_draw_radius_px,
        theme.handle_fill,
        Stroke::new(2.0, color),
    );
}

fn dot(frame: &mut OverlayFrame, at: Pos2, color: Color32) {
    frame.circle(at, INTERACTION.endpoint_dot_radius_px, color, Stroke::NONE);
}

// ============================================================================
// DRAWINGS
// ============================================================================
pub struct DrawingsLayer;

impl OverlayLayer for DrawingsLayer {
    fn build(&self, frame: &mut OverlayFrame, ctx: &OverlayContext) {
        for drawing in ctx.drawings {
            draw_drawing(frame, ctx, drawing, ctx.is_emphasised(drawing.id));
        }
    }
}

fn draw_drawing(frame: &mut OverlayFrame, ctx: &OverlayContext, drawing: &Drawing, emphasised: bool) {
    let mapper = ctx.mapper;
    let view = mapper.viewport();
    let color = drawing_color(drawing, ctx.theme);

    match drawing.shape {
        DrawingShape::Horizontal { price } => {
            let Some(y) = mapper.price_to_y(price) else {
                return;
            };
            let width = if emphasised { 2.5 } else { 1.2 };
            frame.dashed(
                pos2(view.left(), y),
                pos2(view.right(), y),
                Stroke::new(width, color),
                8.0,
                4.0,
            );
            if emphasised {
                handle(frame, pos2(view.center().x, y), color, ctx.theme);
            }
            frame.pill(
                pos2(view.right() - 8.0, y),
                format!("{:.2}", price),
                color,
                PillAlign::Right,
                false,
            );
        }
        DrawingShape::Trendline { p1, p2 } => {
            let (Some(a), Some(b)) = (mapper.to_screen(p1), mapper.to_screen(p2)) else {
                return;
            };
            let width = if emphasised { 2.8 } else { 1.8 };
            frame.line(a, b, Stroke::new(width, color));
            if emphasised {
                handle(frame, a, color, ctx.theme);
                handle(frame, b, color, ctx.theme);
            } else {
                dot(frame, a, color);
                dot(frame, b, color);
            }
        }
        DrawingShape::Ray { p1, p2 } => {
            let (Some(a), Some(b)) = (mapper.to_screen(p1), mapper.to_screen(p2)) else {
                return;
            };
            let width = if emphasised { 2.8 } else { 1.8 };
            frame.line(a, ray_end(a, b, view), Stroke::new(width, color));
            if emphasised {
                handle(frame, a, color, ctx.theme);
                handle(frame, b, color, ctx.theme);
            } else {
                dot(frame, a, color);
            }
        }
        DrawingShape::Fib { p1, p2 } => draw_fib(frame, ctx, drawing, p1.time, p2.time, emphasised),
        DrawingShape::Rectangle { p1, p2 } => {
            let (Some(a), Some(b)) = (mapper.to_screen(p1), mapper.to_screen(p2)) else {
                return;
            };
            let rect = Rect::from_two_pos(a, b);
            let width = if emphasised { 2.2 } else { 1.2 };
            frame.fill_rect(rect, color.gamma_multiply(ctx.theme.fill_alpha));
            frame.stroke_rect(rect, Stroke::new(width, color));
            if emphasised {
                handle(frame, a, color, ctx.theme);
                handle(frame, b, color, ctx.theme);
            }
        }
    }
}

fn draw_fib(
    frame: &mut OverlayFrame,
    ctx: &OverlayContext,
    drawing: &Drawing,
    t1: i64,
    t2: i64,
    emphasised: bool,
) {
    let Some(levels) = drawing.fib_levels() else {
        return;
    };
    let mapper = ctx.mapper;
    let theme = ctx.theme;
    let x1 = mapper.time_to_x(t1);
    let x2 = mapper.time_to_x(t2);
    let (left, right) = fib_band_span(x1, x2, mapper.viewport());
    let ys: Vec<Option<f32>> = levels.iter().map(|&(_, p)| mapper.price_to_y(p)).collect();
    let width = if emphasised { 1.8 } else { 1.0 };

    for (i, &(level, price)) in levels.iter().enumerate() {
        let Some(y) = ys[i] else {
            continue;
        };
        let color = theme.fib_levels[i];
        frame.dashed(pos2(left, y), pos2(right, y), Stroke::new(width, color), 5.0, 3.0);
        frame.pill(
            pos2(left + 4.0, y - 12.0),
            format!("{:.1}%  {:.2}", level * 100.0, price),
            color,
            PillAlign::Left,
            false,
        );
        if let Some(Some(next_y)) = ys.get(i + 1) {
            frame.fill_rect(
                Rect::from_min_max(pos2(left, y.min(*next_y)), pos2(right, y.max(*next_y))),
                color.gamma_multiply(theme.fill_alpha),
            );
        }
    }

    if let (Some(Some(top)), Some(Some(bottom))) = (ys.first(), ys.last()) {
        let (top, bottom) = (top.min(*bottom), top.max(*bottom));
        let border = Stroke::new(0.7, theme.fib_border);
        frame.line(pos2(left, top), pos2(left, bottom), border);
        frame.line(pos2(right, top), pos2(right, bottom), border);
    }

    if emphasised && let Some((p1, p2)) = drawing.endpoints() {
        let last = FIB_LEVELS.len() - 1;
        if let Some(a) = mapper.to_screen(p1) {
            handle(frame, a, theme.fib_levels[0], theme);
        }
        if let Some(b) = mapper.to_screen(p2) {
            handle(frame, b, theme.fib_levels[last], theme);
        }
    }
}

// ============================================================================
// POSITIONS
// ============================================================================
pub struct PositionsLayer;

impl OverlayLayer for PositionsLayer {
    fn build(&self, frame: &mut OverlayFrame, ctx: &OverlayContext) {
        for position in ctx.positions {
            draw_position(frame, ctx, position, false);
        }
    }
}

fn draw_exit_level(
    frame: &mut OverlayFrame,
    ctx: &OverlayContext,
    position: &Position,
    field: PositionField,
    entry_y: Option<f32>,
    preview: bool,
) {
    let Some(price) = position.field(field) else {
        return;
    };
    let Some(y) = ctx.mapper.price_to_y(price) else {
        return;
    };
    let view = ctx.mapper.viewport();
    let (color, tag) = match field {
        PositionField::Sl => (ctx.theme.stop_loss, "SL"),
        PositionField::Tp => (ctx.theme.take_profit, "TP"),
    };

    if let Some(entry_y) = entry_y {
        frame.fill_rect(
            Rect::from_min_max(
                pos2(view.left(), entry_y.min(y)),
                pos2(view.right(), entry_y.max(y)),
            ),
            color.gamma_multiply(ctx.theme.zone_alpha),
        );
    }

    let dragging = ctx.is_dragging_line(position, field);
    let width = if dragging { 2.5 } else { 1.2 };
    frame.dashed(
        pos2(view.left(), y),
        pos2(view.right(), y),
        Stroke::new(width, color),
        6.0,
        4.0,
    );
    frame.pill(
        pos2(view.right() - 8.0, y),
        format!("{} {:.2} │ {}", tag, price, signed_pct(position.pnl_pct(price))),
        color,
        PillAlign::Right,
        false,
    );
    if position.active && !preview {
        frame.pill(
            pos2(view.left() + 6.0, y),
            "⇕ drag",
            color.gamma_multiply(0.55),
            PillAlign::Left,
            false,
        );
    }
}

fn draw_position(frame: &mut OverlayFrame, ctx: &OverlayContext, position: &Position, preview: bool) {
    let theme = ctx.theme;
    let view = ctx.mapper.viewport();
    let entry_y = ctx.mapper.price_to_y(position.entry);

    draw_exit_level(frame, ctx, position, PositionField::Sl, entry_y, preview);
    draw_exit_level(frame, ctx, position, PositionField::Tp, entry_y, preview);

    let Some(entry_y) = entry_y else {
        return;
    };

    if position.active
        && let Some(rr) = position.risk_reward()
    {
        let ratio = if rr.is_finite() {
            format!("{:.2}", rr)
        } else {
            "∞".to_string()
        };
        frame.pill(
            pos2(view.center().x - 30.0, entry_y + 20.0),
            format!("R:R 1:{}", ratio),
            theme.risk_reward,
            PillAlign::Left,
            false,
        );
    }

    let side_color = match position.side {
        PositionSide::Long => theme.long,
        PositionSide::Short => theme.short,
    };
    let pending = position.is_pending() && !preview;
    let (color, stroke) = if pending {
        (theme.pending, Stroke::new(1.5, theme.pending))
    } else {
        (side_color, Stroke::new(2.0, side_color))
    };
    let from = pos2(view.left(), entry_y);
    let to = pos2(view.right(), entry_y);
    if pending {
        frame.dashed(from, to, stroke, 6.0, 4.0);
    } else {
        frame.line(from, to, stroke);
    }

    let mut label = format!(
        "{} {} @ {:.2}",
        position.side.arrow(),
        position.side,
        position.entry
    );
    if pending {
        label.push_str(" [PENDING]");
    }
    frame.pill(
        pos2(view.left() + 8.0, entry_y - 14.0),
        label,
        color,
        PillAlign::Left,
        true,
    );

    if pending {
        frame.pill(
            pos2(view.left() + 8.0, entry_y + 14.0),
            "Waiting for price to reach entry...",
            theme.pending.gamma_multiply(0.55),
            PillAlign::Left,
            false,
        );
    } else if position.active
        && position.executed
        && let Some(last) = ctx.last_price
    {
        let pnl = position.pnl_pct(last);
        let color = if pnl >= 0.0 { theme.long } else { theme.short };
        frame.pill(
            pos2(view.left() + 8.0, entry_y + 14.0),
            format!("PnL: {}", signed_pct(pnl)),
            color,
            PillAlign::Left,
            false,
        );
    }
}

// ============================================================================
// TOOL PREVIEW
// ============================================================================
pub struct PreviewLayer;

impl OverlayLayer for PreviewLayer {
    fn build(&self, frame: &mut OverlayFrame, ctx: &OverlayContext) {
        match ctx.preview {
            Some(ToolPreview::Drawing(drawing)) => draw_drawing(frame, ctx, drawing, false),
            Some(ToolPreview::Position(preview)) => {
                draw_position(frame, ctx, &preview_position(preview), true)
            }
            None => {}
        }
    }
}

fn preview_position(preview: &PositionPreview) -> Position {
    Position::pending(preview.side, preview.entry, Some(preview.sl), preview.tp, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ChartPoint, overlay::mapper::LinearMapper};

    fn mapper() -> LinearMapper {
        LinearMapper::new(
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 500.0)),
            (0.0, 1000.0),
            (100.0, 200.0),
        )
        .with_time_limits(0, 1000)
    }

    fn ctx<'a>(
        mapper: &'a LinearMapper,
        theme: &'a OverlayTheme,
        drawings: &'a [Drawing],
        positions: &'a [Position],
    ) -> OverlayContext<'a> {
        OverlayContext {
            drawings,
            positions,
            mapper,
            theme,
            last_price: None,
            hovered: None,
            selected: None,
            dragging_drawing: None,
            dragging_line: None,
            preview: None,
        }
    }

    #[test]
    fn test_horizontal_price_label() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let drawings = [Drawing::new(DrawingShape::Horizontal { price: 150.0 })];
        let frame = build_overlay(&ctx(&m, &theme, &drawings, &[]));
        assert_eq!(frame.labels().collect::<Vec<_>>(), vec!["150.00"]);
    }

    #[test]
    fn test_unmappable_drawing_is_skipped() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let drawings = [Drawing::new(DrawingShape::Trendline {
            p1: ChartPoint::new(-500, 150.0),
            p2: ChartPoint::new(500, 160.0),
        })];
        assert!(build_overlay(&ctx(&m, &theme, &drawings, &[])).is_empty());
    }

    #[test]
    fn test_emphasis_adds_handles() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let line = Drawing::new(DrawingShape::Trendline {
            p1: ChartPoint::new(100, 150.0),
            p2: ChartPoint::new(500, 160.0),
        });
        let drawings = [line.clone()];
        let mut c = ctx(&m, &theme, &drawings, &[]);
        let plain = build_overlay(&c);
        c.hovered = Some(line.id);
        let hovered = build_overlay(&c);
        assert_eq!(plain.len(), hovered.len());
        assert_ne!(plain, hovered);
    }

    #[test]
    fn test_fib_labels() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let drawings = [Drawing::new(DrawingShape::Fib {
            p1: ChartPoint::new(100, 100.0),
            p2: ChartPoint::new(300, 200.0),
        })];
        let frame = build_overlay(&ctx(&m, &theme, &drawings, &[]));
        let labels: Vec<_> = frame.labels().collect();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], "0.0%  200.00");
        assert_eq!(labels[3], "50.0%  150.00");
        assert_eq!(labels[6], "100.0%  100.00");
    }

    #[test]
    fn test_pending_position_labels() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let positions = [Position::pending(PositionSide::Long, 150.0, Some(140.0), Some(170.0), 0)];
        let frame = build_overlay(&ctx(&m, &theme, &[], &positions));
        let labels: Vec<_> = frame.labels().collect();
        assert!(labels.contains(&"SL 140.00 │ -6.67%"));
        assert!(labels.contains(&"TP 170.00 │ +13.33%"));
        assert!(labels.contains(&"R:R 1:2.00"));
        assert!(labels.contains(&"▲ LONG @ 150.00 [PENDING]"));
        assert!(labels.contains(&"Waiting for price to reach entry..."));
    }

    #[test]
    fn test_executed_position_live_pnl() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let mut pos = Position::pending(PositionSide::Short, 150.0, None, None, 0);
        pos.executed = true;
        let positions = [pos];
        let mut c = ctx(&m, &theme, &[], &positions);
        c.last_price = Some(135.0);
        let frame = build_overlay(&c);
        let labels: Vec<_> = frame.labels().collect();
        assert_eq!(labels, vec!["▼ SHORT @ 150.00", "PnL: +10.00%"]);
    }

    #[test]
    fn test_position_preview_has_no_pending_marker() {
        let (m, theme) = (mapper(), OverlayTheme::dark());
        let preview = ToolPreview::Position(PositionPreview {
            side: PositionSide::Long,
            entry: 150.0,
            sl: 140.0,
            tp: None,
        });
        let mut c = ctx(&m, &theme, &[], &[]);
        c.preview = Some(&preview);
        let frame = build_overlay(&c);
        let labels: Vec<_> = frame.labels().collect();
        assert!(labels.contains(&"▲ LONG @ 150.00"));
        assert!(!labels.iter().any(|l| l.contains("drag")));
    }
}
