//! Where candles come from.

use std::{
    collections::BTreeSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use itertools::Itertools;

use crate::{
    config::{DEMO, DF, Timeframe},
    data::demo::generate_demo_series,
    domain::Candle,
};

/// One fetch result. `total_available` counts every candle the source holds
/// for the series, not just this page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcvPage {
    pub candles: Vec<Candle>,
    pub total_available: usize,
}

/// Abstract interface for fetching market data.
pub trait MarketDataSource: Send + Sync {
    fn fetch_symbols(&self) -> Result<Vec<String>>;

    /// Up to `limit` of the newest candles strictly older than `before_time`
    /// (or the newest overall), ascending.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
        before_time: Option<i64>,
    ) -> Result<OhlcvPage>;
}

/// Cut a page out of a full ascending series.
pub fn page_of(candles: &[Candle], limit: usize, before_time: Option<i64>) -> OhlcvPage {
    let end = match before_time {
        Some(t) => candles.partition_point(|c| c.time < t),
        None => candles.len(),
    };
    let start = end.saturating_sub(limit);
    OhlcvPage {
        candles: candles[start..end].to_vec(),
        total_available: candles.len(),
    }
}

/// Aggregate ascending candles into buckets of `seconds`, aligned to the
/// epoch. Open is the first open, close the last close.
pub fn resample(candles: &[Candle], seconds: i64) -> Vec<Candle> {
    if seconds <= 0 {
        return candles.to_vec();
    }
    candles
        .iter()
        .chunk_by(|c| c.time.div_euclid(seconds) * seconds)
        .into_iter()
        .filter_map(|(bucket, group)| {
            group.fold(None, |acc: Option<Candle>, c| {
                Some(match acc {
                    None => Candle::new(bucket, c.open, c.high, c.low, c.close, c.volume),
                    Some(mut agg) => {
                        agg.high = agg.high.max(c.high);
                        agg.low = agg.low.min(c.low);
                        agg.close = c.close;
                        agg.volume += c.volume;
                        agg
                    }
                })
            })
        })
        .collect()
}

/// Reads `<dir>/<SYMBOL>_<tf>.json`, each file a JSON array of candles.
/// A missing timeframe is built from the symbol's `1m` file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{}_{}.json", symbol, timeframe))
    }

    fn read_file(path: &Path) -> Result<Vec<Candle>> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        let candles: Vec<Candle> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse candles from {}", path.display()))?;
        let total = candles.len();
        let candles: Vec<Candle> = candles
            .into_iter()
            .filter(|c| [c.open, c.high, c.low, c.close].iter().all(|v| v.is_finite()))
            .sorted_by_key(|c| c.time)
            .collect();
        if candles.len() != total {
            log::warn!("{}: dropped {} non-finite candles", path.display(), total - candles.len());
        }
        Ok(candles)
    }

    fn load_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let direct = self.path_for(symbol, timeframe);
        if direct.exists() {
            return Self::read_file(&direct);
        }
        let base = self.path_for(symbol, Timeframe::M1);
        if timeframe != Timeframe::M1 && base.exists() {
            if DF.log_data {
                log::info!("Resampling {} to {}", base.display(), timeframe);
            }
            return Ok(resample(&Self::read_file(&base)?, timeframe.seconds()));
        }
        bail!("No data for {} {} in {}", symbol, timeframe, self.dir.display())
    }
}

impl MarketDataSource for JsonFileSource {
    fn fetch_symbols(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?;
        let mut symbols = BTreeSet::new();
        for entry in entries {
            let name = entry?.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Some((symbol, tf)) = stem.rsplit_once('_')
                && tf.parse::<Timeframe>().is_ok()
            {
                symbols.insert(symbol.to_owned());
            }
        }
        Ok(symbols.into_iter().collect())
    }

    fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
        before_time: Option<i64>,
    ) -> Result<OhlcvPage> {
        let candles = self.load_series(symbol, timeframe)?;
        Ok(page_of(&candles, limit, before_time))
    }
}

/// Synthetic, reproducible series for every configured demo symbol.
#[derive(Debug, Clone, Default)]
pub struct DemoSource;

impl MarketDataSource for DemoSource {
    fn fetch_symbols(&self) -> Result<Vec<String>> {
        Ok(DEMO.resources.symbols.iter().map(|s| s.to_string()).collect())
    }

    fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
        before_time: Option<i64>,
    ) -> Result<OhlcvPage> {
        if !DEMO.resources.symbols.contains(&symbol) {
            bail!("Unknown demo symbol {}", symbol);
        }
        let candles = generate_demo_series(symbol, timeframe, DEMO.candle_count);
        Ok(page_of(&candles, limit, before_time))
    }
}
