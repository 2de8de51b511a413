//! Domain (time, price) to screen pixel conversion.

use eframe::egui::{Pos2, Rect, pos2};
use egui_plot::PlotTransform;

use crate::{domain::ChartPoint, overlay::scheduler::view_hash};

/// Read-only view of the chart's current axes.
///
/// Every method returns `None` when the value cannot be placed this frame;
/// callers skip the element rather than treat it as an error.
pub trait CoordinateMapper {
    fn time_to_x(&self, time: i64) -> Option<f32>;
    fn price_to_y(&self, price: f64) -> Option<f32>;
    fn y_to_price(&self, y: f32) -> Option<f64>;
    fn x_to_time(&self, x: f32) -> Option<i64>;

    /// Screen rectangle the chart occupies.
    fn viewport(&self) -> Rect;

    fn to_screen(&self, point: ChartPoint) -> Option<Pos2> {
        Some(pos2(self.time_to_x(point.time)?, self.price_to_y(point.price)?))
    }

    fn point_at(&self, pos: Pos2) -> Option<ChartPoint> {
        Some(ChartPoint::new(self.x_to_time(pos.x)?, self.y_to_price(pos.y)?))
    }
}

/// Linear axes over a screen rectangle. Time grows to the right, price grows
/// upwards.
///
/// Times outside `time_limits` (the loaded series span, when set) have no
/// screen position. Prices map anywhere, including off-screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearMapper {
    rect: Rect,
    time_range: (f64, f64),
    price_range: (f64, f64),
    time_limits: Option<(i64, i64)>,
}

impl LinearMapper {
    pub fn new(rect: Rect, time_range: (f64, f64), price_range: (f64, f64)) -> Self {
        Self {
            rect,
            time_range,
            price_range,
            time_limits: None,
        }
    }

    /// Axes of an egui_plot frame whose x axis is epoch seconds and whose y
    /// axis is price.
    pub fn from_plot(transform: &PlotTransform) -> Self {
        let bounds = transform.bounds();
        let [x_min, y_min] = bounds.min();
        let [x_max, y_max] = bounds.max();
        Self::new(*transform.frame(), (x_min, x_max), (y_min, y_max))
    }

    pub fn with_time_limits(mut self, first: i64, last: i64) -> Self {
        self.time_limits = Some((first.min(last), first.max(last)));
        self
    }

    /// Changes whenever the axes or the screen rectangle change.
    pub fn view_hash(&self) -> u64 {
        view_hash(
            [
                self.rect.min.x,
                self.rect.min.y,
                self.rect.max.x,
                self.rect.max.y,
            ],
            self.time_range,
            self.price_range,
        )
    }

    fn time_span(&self) -> Option<f64> {
        let span = self.time_range.1 - self.time_range.0;
        (span.is_finite() && span > 0.0).then_some(span)
    }

    fn price_span(&self) -> Option<f64> {
        let span = self.price_range.1 - self.price_range.0;
        (span.is_finite() && span > 0.0).then_some(span)
    }
}

impl CoordinateMapper for LinearMapper {
    fn time_to_x(&self, time: i64) -> Option<f32> {
        if let Some((first, last)) = self.time_limits
            && (time < first || time > last)
        {
            return None;
        }
        let frac = (time as f64 - self.time_range.0) / self.time_span()?;
        Some(self.rect.left() + (frac * self.rect.width() as f64) as f32)
    }

    fn price_to_y(&self, price: f64) -> Option<f32> {
        if !price.is_finite() {
            return None;
        }
        let frac = (price - self.price_range.0) / self.price_span()?;
        Some(self.rect.bottom() - (frac * self.rect.height() as f64) as f32)
    }

    fn y_to_price(&self, y: f32) -> Option<f64> {
        let height = self.rect.height();
        if !y.is_finite() || height <= 0.0 {
            return None;
        }
        let frac = (self.rect.bottom() - y) as f64 / height as f64;
        Some(self.price_range.0 + frac * self.price_span()?)
    }

    fn x_to_time(&self, x: f32) -> Option<i64> {
        let width = self.rect.width();
        if !x.is_finite() || width <= 0.0 {
            return None;
        }
        let frac = (x - self.rect.left()) as f64 / width as f64;
        let time = (self.time_range.0 + frac * self.time_span()?).round() as i64;
        match self.time_limits {
            Some((first, last)) => Some(time.clamp(first, last)),
            None => Some(time),
        }
    }

    fn viewport(&self) -> Rect {
        self.rect
    }
}
