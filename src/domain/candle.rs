use serde::{Deserialize, Serialize};

// Define the CandleType enum
#[derive(Debug, PartialEq)]
pub enum CandleType {
    Bullish,
    Bearish,
}

/// One OHLCV bar. `time` is the exchange open time in epoch seconds and is
/// unique and strictly increasing within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close >= self.open {
            CandleType::Bullish
        } else {
            CandleType::Bearish
        }
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        match self.get_type() {
            CandleType::Bullish => (self.open, self.close),
            CandleType::Bearish => (self.close, self.open),
        }
    }
}

/// Index of the candle whose time is closest to `time`. Ties go to the
/// earlier candle. `candles` must be sorted ascending.
pub fn nearest_candle_index(candles: &[Candle], time: i64) -> Option<usize> {
    if candles.is_empty() {
        return None;
    }
    let idx = candles.partition_point(|c| c.time < time);
    if idx == 0 {
        return Some(0);
    }
    if idx == candles.len() {
        return Some(candles.len() - 1);
    }
    let before = time - candles[idx - 1].time;
    let after = candles[idx].time - time;
    Some(if after < before { idx } else { idx - 1 })
}
