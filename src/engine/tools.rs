//! Multi-click tool input.

use strum_macros::EnumIter;

use crate::{
    config::DF,
    domain::ChartPoint,
    models::{Drawing, DrawingShape, PositionSide},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum ToolKind {
    Horizontal,
    Trendline,
    Ray,
    Fib,
    Rectangle,
    LongPosition,
    ShortPosition,
}

impl ToolKind {
    /// Clicks needed before the tool completes.
    pub fn clicks(&self) -> usize {
        match self {
            ToolKind::Horizontal => 1,
            ToolKind::Trendline | ToolKind::Ray | ToolKind::Fib | ToolKind::Rectangle => 2,
            ToolKind::LongPosition | ToolKind::ShortPosition => 3,
        }
    }

    /// One prompt per click, in order.
    pub fn prompts(&self) -> &'static [&'static str] {
        match self {
            ToolKind::Horizontal => &["Click to place horizontal line"],
            ToolKind::Trendline => &["Click start point", "Click end point"],
            ToolKind::Ray => &["Click origin point", "Click direction point"],
            ToolKind::Fib => &["Click first price level", "Click second price level"],
            ToolKind::Rectangle => &["Click first corner", "Click opposite corner"],
            ToolKind::LongPosition | ToolKind::ShortPosition => {
                &["Click entry price", "Click stop loss", "Click take profit"]
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Horizontal => "─",
            ToolKind::Trendline => "╲",
            ToolKind::Ray => "→",
            ToolKind::Fib => "Fib",
            ToolKind::Rectangle => "▭",
            ToolKind::LongPosition => "▲ Long",
            ToolKind::ShortPosition => "▼ Short",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ToolKind::Horizontal => "Horizontal Line",
            ToolKind::Trendline => "Trend Line",
            ToolKind::Ray => "Ray",
            ToolKind::Fib => "Fibonacci Retracement",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::LongPosition => "Long Position",
            ToolKind::ShortPosition => "Short Position",
        }
    }

    /// Side for the position tools, `None` for drawing tools.
    pub fn side(&self) -> Option<PositionSide> {
        match self {
            ToolKind::LongPosition => Some(PositionSide::Long),
            ToolKind::ShortPosition => Some(PositionSide::Short),
            _ => None,
        }
    }

    fn build_drawing(&self, points: &[ChartPoint]) -> Option<Drawing> {
        let shape = match (self, points) {
            (ToolKind::Horizontal, [p]) => DrawingShape::Horizontal { price: p.price },
            (ToolKind::Trendline, &[p1, p2]) => DrawingShape::Trendline { p1, p2 },
            (ToolKind::Ray, &[p1, p2]) => DrawingShape::Ray { p1, p2 },
            (ToolKind::Fib, &[p1, p2]) => DrawingShape::Fib { p1, p2 },
            (ToolKind::Rectangle, &[p1, p2]) => DrawingShape::Rectangle { p1, p2 },
            _ => return None,
        };
        Some(Drawing::new(shape))
    }
}

/// A request to open a simulated order, produced by the position tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub side: PositionSide,
    pub entry: f64,
    pub sl: f64,
    pub tp: f64,
}

/// Provisional position zone shown between the stop click and the target click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionPreview {
    pub side: PositionSide,
    pub entry: f64,
    pub sl: f64,
    /// Follows the cursor until the final click.
    pub tp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolPreview {
    Drawing(Drawing),
    Position(PositionPreview),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// No tool active; the click is free for selection.
    Idle,
    /// Point stored, `step` clicks collected so far.
    Collected { step: usize },
    Drawing(Drawing),
    Placement(PlacementRequest),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolInput {
    #[default]
    Idle,
    Collecting {
        tool: ToolKind,
        points: Vec<ChartPoint>,
    },
}

impl ToolInput {
    pub fn active(&self) -> Option<ToolKind> {
        match self {
            ToolInput::Idle => None,
            ToolInput::Collecting { tool, .. } => Some(*tool),
        }
    }

    pub fn step(&self) -> usize {
        match self {
            ToolInput::Idle => 0,
            ToolInput::Collecting { points, .. } => points.len(),
        }
    }

    /// Activate `tool`, or go idle if it is already active. Pending points are
    /// always dropped.
    pub fn select(&mut self, tool: ToolKind) {
        *self = if self.active() == Some(tool) {
            ToolInput::Idle
        } else {
            ToolInput::Collecting {
                tool,
                points: Vec::with_capacity(tool.clicks()),
            }
        };
        if DF.log_tools {
            log::info!("Tool: {:?}", self.active());
        }
    }

    pub fn cancel(&mut self) {
        *self = ToolInput::Idle;
    }

    pub fn click(&mut self, point: ChartPoint) -> ToolOutcome {
        let ToolInput::Collecting { tool, points } = self else {
            return ToolOutcome::Idle;
        };
        let tool = *tool;
        points.push(point);
        if points.len() < tool.clicks() {
            return ToolOutcome::Collected { step: points.len() };
        }

        let points = std::mem::take(points);
        *self = ToolInput::Idle;

        if let Some(side) = tool.side() {
            return match points.as_slice() {
                [entry, sl, tp] => ToolOutcome::Placement(PlacementRequest {
                    side,
                    entry: entry.price,
                    sl: sl.price,
                    tp: tp.price,
                }),
                _ => ToolOutcome::Idle,
            };
        }
        match tool.build_drawing(&points) {
            Some(drawing) => ToolOutcome::Drawing(drawing),
            None => ToolOutcome::Idle,
        }
    }

    /// Prompt for the next click. The last prompt repeats past the end.
    pub fn prompt(&self) -> Option<&'static str> {
        let ToolInput::Collecting { tool, points } = self else {
            return None;
        };
        let prompts = tool.prompts();
        prompts.get(points.len()).or(prompts.last()).copied()
    }

    /// What to draw for the in-progress tool given the cursor position.
    pub fn preview(&self, cursor: Option<ChartPoint>) -> Option<ToolPreview> {
        let ToolInput::Collecting { tool, points } = self else {
            return None;
        };

        if let Some(side) = tool.side() {
            return match points.as_slice() {
                [entry, sl] => Some(ToolPreview::Position(PositionPreview {
                    side,
                    entry: entry.price,
                    sl: sl.price,
                    tp: cursor.map(|c| c.price),
                })),
                _ => None,
            };
        }

        match points.as_slice() {
            [first] if tool.clicks() == 2 => {
                tool.build_drawing(&[*first, cursor?]).map(ToolPreview::Drawing)
            }
            _ => None,
        }
    }
}
