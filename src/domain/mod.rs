// Domain types and value objects
mod candle;
mod point;
mod series_key;

// Re-export commonly used types to the world
pub use candle::{Candle, CandleType, nearest_candle_index};
pub use point::ChartPoint;
pub use series_key::SeriesKey;
