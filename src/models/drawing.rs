use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use uuid::Uuid;

use crate::domain::ChartPoint;

/// Fixed fibonacci retracement ratios, top of the range first.
pub const FIB_LEVELS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Price of retracement `level` between `p1` and `p2`.
/// Level 0 sits on `p2`, level 1 on `p1`.
#[inline]
pub fn fib_level_price(p1: f64, p2: f64, level: f64) -> f64 {
    p1 + (p2 - p1) * (1.0 - level)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingId(Uuid);

impl DrawingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DrawingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum DrawingKind {
    Horizontal,
    Trendline,
    Ray,
    Fib,
    Rectangle,
}

/// Which part of a drawing the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    P1,
    P2,
    Body,
}

/// Geometry of a drawing, always in domain coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawingShape {
    Horizontal { price: f64 },
    Trendline { p1: ChartPoint, p2: ChartPoint },
    /// Starts at `p1` and extends through `p2` to the viewport edge.
    Ray { p1: ChartPoint, p2: ChartPoint },
    Fib { p1: ChartPoint, p2: ChartPoint },
    Rectangle { p1: ChartPoint, p2: ChartPoint },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub id: DrawingId,
    /// RGBA override; `None` uses the theme colour for the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[u8; 4]>,
    #[serde(flatten)]
    pub shape: DrawingShape,
}

impl Drawing {
    pub fn new(shape: DrawingShape) -> Self {
        Self {
            id: DrawingId::new(),
            color: None,
            shape,
        }
    }

    pub fn kind(&self) -> DrawingKind {
        match self.shape {
            DrawingShape::Horizontal { .. } => DrawingKind::Horizontal,
            DrawingShape::Trendline { .. } => DrawingKind::Trendline,
            DrawingShape::Ray { .. } => DrawingKind::Ray,
            DrawingShape::Fib { .. } => DrawingKind::Fib,
            DrawingShape::Rectangle { .. } => DrawingKind::Rectangle,
        }
    }

    /// Both anchors of a two-point drawing. Horizontal lines have none.
    pub fn endpoints(&self) -> Option<(ChartPoint, ChartPoint)> {
        match self.shape {
            DrawingShape::Horizontal { .. } => None,
            DrawingShape::Trendline { p1, p2 }
            | DrawingShape::Ray { p1, p2 }
            | DrawingShape::Fib { p1, p2 }
            | DrawingShape::Rectangle { p1, p2 } => Some((p1, p2)),
        }
    }

    fn endpoints_mut(&mut self) -> Option<(&mut ChartPoint, &mut ChartPoint)> {
        match &mut self.shape {
            DrawingShape::Horizontal { .. } => None,
            DrawingShape::Trendline { p1, p2 }
            | DrawingShape::Ray { p1, p2 }
            | DrawingShape::Fib { p1, p2 }
            | DrawingShape::Rectangle { p1, p2 } => Some((p1, p2)),
        }
    }

    /// Rigid translation of the whole drawing.
    pub fn translate(&mut self, dt: i64, dp: f64) {
        if let DrawingShape::Horizontal { price } = &mut self.shape {
            *price += dp;
            return;
        }
        if let Some((p1, p2)) = self.endpoints_mut() {
            *p1 = p1.offset(dt, dp);
            *p2 = p2.offset(dt, dp);
        }
    }

    /// Apply a partial update. Fields that do not exist on this shape are
    /// ignored. Returns true if anything changed.
    pub fn apply(&mut self, patch: &DrawingPatch) -> bool {
        let before = self.clone();

        if let Some(color) = patch.color {
            self.color = color;
        }
        if let (Some(new_price), DrawingShape::Horizontal { price }) = (patch.price, &mut self.shape)
        {
            *price = new_price;
        }
        if let Some((p1, p2)) = self.endpoints_mut() {
            if let Some(new_p1) = patch.p1 {
                *p1 = new_p1;
            }
            if let Some(new_p2) = patch.p2 {
                *p2 = new_p2;
            }
        }

        *self != before
    }

    /// `(level, price)` pairs for a fib drawing.
    pub fn fib_levels(&self) -> Option<[(f64, f64); 7]> {
        let DrawingShape::Fib { p1, p2 } = self.shape else {
            return None;
        };
        Some(FIB_LEVELS.map(|level| (level, fib_level_price(p1.price, p2.price, level))))
    }
}

/// Partial changes for [`Drawing::apply`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawingPatch {
    pub price: Option<f64>,
    pub p1: Option<ChartPoint>,
    pub p2: Option<ChartPoint>,
    pub color: Option<Option<[u8; 4]>>,
}

impl DrawingPatch {
    pub fn price(price: f64) -> Self {
        Self {
            price: Some(price),
            ..Default::default()
        }
    }

    /// Move one endpoint. `Handle::Body` yields an empty patch.
    pub fn endpoint(handle: Handle, point: ChartPoint) -> Self {
        match handle {
            Handle::P1 => Self {
                p1: Some(point),
                ..Default::default()
            },
            Handle::P2 => Self {
                p2: Some(point),
                ..Default::default()
            },
            Handle::Body => Self::default(),
        }
    }

    pub fn color(color: Option<[u8; 4]>) -> Self {
        Self {
            color: Some(color),
            ..Default::default()
        }
    }
}
