use serde::{Deserialize, Serialize};

/// A location in chart domain space: a candle time (epoch seconds) and a price.
///
/// Every click, drawing endpoint and drag target is stored this way, never in
/// pixels, so annotations survive pan and zoom unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub time: i64,
    pub price: f64,
}

impl ChartPoint {
    pub const fn new(time: i64, price: f64) -> Self {
        Self { time, price }
    }

    /// Shift by a (time, price) delta.
    pub fn offset(self, dt: i64, dp: f64) -> Self {
        Self {
            time: self.time + dt,
            price: self.price + dp,
        }
    }
}
