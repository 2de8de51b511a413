//! Display list for one overlay paint pass.
//!
//! Layers push primitives here; painting into an egui `Painter` is a separate
//! step so the layers can be exercised without a UI context.

use eframe::egui::{
    Color32, CornerRadius, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, pos2, vec2,
};

use crate::config::OverlayTheme;

const PILL_FONT_SIZE: f32 = 11.0;
const PILL_PAD_X: f32 = 6.0;
const PILL_HEIGHT: f32 = 18.0;
const PILL_RADIUS: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillAlign {
    /// Anchor is the pill's left edge.
    Left,
    /// Anchor is the pill's right edge.
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: Pos2,
        to: Pos2,
        stroke: Stroke,
        /// (dash, gap) lengths
        dash: Option<(f32, f32)>,
    },
    FillRect {
        rect: Rect,
        color: Color32,
    },
    StrokeRect {
        rect: Rect,
        stroke: Stroke,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
    },
    /// Text label on a rounded background, vertically centred on the anchor.
    Pill {
        anchor: Pos2,
        text: String,
        color: Color32,
        align: PillAlign,
        solid: bool,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayFrame {
    primitives: Vec<Primitive>,
}

impl OverlayFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Labels in paint order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Pill { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn line(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.primitives.push(Primitive::Line {
            from,
            to,
            stroke,
            dash: None,
        });
    }

    pub fn dashed(&mut self, from: Pos2, to: Pos2, stroke: Stroke, dash: f32, gap: f32) {
        self.primitives.push(Primitive::Line {
            from,
            to,
            stroke,
            dash: Some((dash, gap)),
        });
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color32) {
        if rect.height() > 0.0 && rect.width() > 0.0 {
            self.primitives.push(Primitive::FillRect { rect, color });
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, stroke: Stroke) {
        self.primitives.push(Primitive::StrokeRect { rect, stroke });
    }

    pub fn circle(&mut self, center: Pos2, radius: f32, fill: Color32, stroke: Stroke) {
        self.primitives.push(Primitive::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    pub fn pill(
        &mut self,
        anchor: Pos2,
        text: impl Into<String>,
        color: Color32,
        align: PillAlign,
        solid: bool,
    ) {
        self.primitives.push(Primitive::Pill {
            anchor,
            text: text.into(),
            color,
            align,
            solid,
        });
    }

    pub fn paint(&self, painter: &Painter, theme: &OverlayTheme) {
        for primitive in &self.primitives {
            match primitive {
                Primitive::Line {
                    from,
                    to,
                    stroke,
                    dash: None,
                } => {
                    painter.line_segment([*from, *to], *stroke);
                }
                Primitive::Line {
                    from,
                    to,
                    stroke,
                    dash: Some((dash, gap)),
                } => {
                    painter.extend(Shape::dashed_line(&[*from, *to], *stroke, *dash, *gap));
                }
                Primitive::FillRect { rect, color } => {
                    painter.rect_filled(*rect, 0.0, *color);
                }
                Primitive::StrokeRect { rect, stroke } => {
                    painter.rect_stroke(*rect, 0.0, *stroke, StrokeKind::Middle);
                }
                Primitive::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    painter.circle(*center, *radius, *fill, *stroke);
                }
                Primitive::Pill {
                    anchor,
                    text,
                    color,
                    align,
                    solid,
                } => paint_pill(painter, theme, *anchor, text, *color, *align, *solid),
            }
        }
    }
}

fn paint_pill(
    painter: &Painter,
    theme: &OverlayTheme,
    anchor: Pos2,
    text: &str,
    color: Color32,
    align: PillAlign,
    solid: bool,
) {
    let text_color = if solid {
        theme.label_text_solid
    } else {
        color
    };
    let galley = painter.layout_no_wrap(
        text.to_string(),
        FontId::monospace(PILL_FONT_SIZE),
        text_color,
    );
    let width = galley.size().x + PILL_PAD_X * 2.0;
    let left = match align {
        PillAlign::Left => anchor.x,
        PillAlign::Right => anchor.x - width,
    };
    let rect = Rect::from_min_size(
        pos2(left, anchor.y - PILL_HEIGHT / 2.0),
        vec2(width, PILL_HEIGHT),
    );
    let radius = CornerRadius::same(PILL_RADIUS);

    if solid {
        painter.rect_filled(rect, radius, color.gamma_multiply(0.92));
    } else {
        painter.rect(
            rect,
            radius,
            color.gamma_multiply(0.15),
            Stroke::new(1.0, color.gamma_multiply(0.7)),
            StrokeKind::Inside,
        );
    }

    let text_pos = pos2(rect.left() + PILL_PAD_X, anchor.y - galley.size().y / 2.0);
    painter.galley(text_pos, galley, text_color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fills_are_dropped() {
        let mut frame = OverlayFrame::new();
        frame.fill_rect(Rect::from_min_max(pos2(0.0, 5.0), pos2(10.0, 5.0)), Color32::RED);
        assert!(frame.is_empty());
        frame.fill_rect(Rect::from_min_max(pos2(0.0, 5.0), pos2(10.0, 6.0)), Color32::RED);
        assert_eq!(frame.len(), 1);
    }

    #[test]
    fn test_labels_in_order() {
        let mut frame = OverlayFrame::new();
        frame.pill(pos2(0.0, 0.0), "a", Color32::RED, PillAlign::Left, false);
        frame.line(pos2(0.0, 0.0), pos2(1.0, 1.0), Stroke::new(1.0, Color32::RED));
        frame.pill(pos2(0.0, 0.0), "b", Color32::RED, PillAlign::Right, true);
        assert_eq!(frame.labels().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
