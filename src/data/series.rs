use itertools::Itertools;

use crate::{
    config::DF,
    data::source::OhlcvPage,
    domain::{Candle, SeriesKey, nearest_candle_index},
};

/// Candles for one symbol and timeframe, strictly ascending by time.
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    pub key: SeriesKey,
    candles: Vec<Candle>,
    /// Count reported by the source, including anything not loaded yet.
    total_available: usize,
}

/// Sort ascending and keep the first candle for each timestamp.
fn normalise(candles: Vec<Candle>) -> Vec<Candle> {
    candles
        .into_iter()
        .sorted_by_key(|c| c.time)
        .dedup_by(|a, b| a.time == b.time)
        .collect()
}

/// Percentage move of the last close against the one before it.
pub fn close_change_pct(candles: &[Candle]) -> Option<f64> {
    match candles {
        [.., prev, last] if prev.close != 0.0 => Some((last.close - prev.close) / prev.close * 100.0),
        _ => None,
    }
}

impl CandleSeries {
    pub fn new(key: SeriesKey, page: OhlcvPage) -> Self {
        let candles = normalise(page.candles);
        if DF.log_data {
            log::info!("{}: {} candles ({} available)", key, candles.len(), page.total_available);
        }
        Self {
            key,
            total_available: page.total_available.max(candles.len()),
            candles,
        }
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn total_available(&self) -> usize {
        self.total_available
    }

    /// More history exists at the source than is loaded.
    pub fn has_older(&self) -> bool {
        self.total_available > self.candles.len()
    }

    /// Cursor for "older than" pagination.
    pub fn oldest_time(&self) -> Option<i64> {
        self.candles.first().map(|c| c.time)
    }

    pub fn last_price(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    pub fn price_change_pct(&self) -> Option<f64> {
        close_change_pct(&self.candles)
    }

    pub fn nearest_index(&self, time: i64) -> Option<usize> {
        nearest_candle_index(&self.candles, time)
    }

    /// Merge an older page in front of the loaded candles. Anything at or
    /// after the current oldest time is ignored. Returns how many were added.
    pub fn prepend_older(&mut self, page: OhlcvPage) -> usize {
        let cutoff = self.oldest_time().unwrap_or(i64::MAX);
        let mut older: Vec<Candle> = normalise(page.candles)
            .into_iter()
            .filter(|c| c.time < cutoff)
            .collect();
        let added = older.len();
        older.append(&mut self.candles);
        self.candles = older;
        self.total_available = page.total_available.max(self.candles.len());
        if DF.log_data {
            log::info!("{}: prepended {} older candles", self.key, added);
        }
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close, close, close, 0.0)
    }

    fn page(candles: Vec<Candle>, total_available: usize) -> OhlcvPage {
        OhlcvPage {
            candles,
            total_available,
        }
    }

    #[test]
    fn test_new_sorts_and_drops_duplicates() {
        let series = CandleSeries::new(
            SeriesKey::default(),
            page(vec![c(120, 3.0), c(0, 1.0), c(60, 2.0), c(60, 9.0)], 3),
        );
        let times: Vec<i64> = series.candles().iter().map(|c| c.time).collect();
        assert_eq!(times, vec![0, 60, 120]);
        assert_eq!(series.candles()[1].close, 2.0);
        assert_eq!(series.last_price(), Some(3.0));
    }

    #[test]
    fn test_prepend_older_keeps_order() {
        let mut series = CandleSeries::new(SeriesKey::default(), page(vec![c(120, 3.0), c(180, 4.0)], 5));
        assert!(series.has_older());
        assert_eq!(series.oldest_time(), Some(120));

        let added = series.prepend_older(page(vec![c(60, 2.0), c(0, 1.0), c(120, 99.0)], 5));
        assert_eq!(added, 2);
        assert_eq!(series.len(), 4);
        assert_eq!(series.oldest_time(), Some(0));
        assert_eq!(series.candles()[2].close, 3.0);
    }

    #[test]
    fn test_nearest_index() {
        let series = CandleSeries::new(SeriesKey::default(), page(vec![c(0, 1.0), c(60, 2.0)], 2));
        assert_eq!(series.nearest_index(50), Some(1));
        assert_eq!(series.nearest_index(-500), Some(0));
        assert!(!series.has_older());
        assert_eq!(series.price_change_pct(), Some(100.0));
    }
}
