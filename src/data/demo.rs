//! Deterministic synthetic candles for offline use.

use crate::{
    config::{DEMO, Timeframe},
    domain::Candle,
};

/// SplitMix64. Small, fast and reproducible across platforms.
struct DemoRng(u64);

impl DemoRng {
    fn seeded(symbol: &str, timeframe: Timeframe) -> Self {
        // FNV-1a over the series identity
        let seed = symbol
            .bytes()
            .chain(timeframe.label().bytes())
            .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
            });
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [-1, 1).
    fn signed_unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

fn base_price(symbol: &str) -> f64 {
    match symbol {
        "BTCUSDT" => 42_000.0,
        "ETHUSDT" => 2_400.0,
        "SOLUSDT" => 95.0,
        _ => 100.0,
    }
}

/// `count` candles ending at `DEMO.anchor_time`, same output for the same
/// symbol and timeframe every time.
pub fn generate_demo_series(symbol: &str, timeframe: Timeframe, count: usize) -> Vec<Candle> {
    let mut rng = DemoRng::seeded(symbol, timeframe);
    let step = timeframe.seconds();
    let anchor = DEMO.anchor_time - DEMO.anchor_time.rem_euclid(step);
    let first = anchor - step * count.saturating_sub(1) as i64;
    // Per-bar volatility grows with the square root of the bar length
    let vol = 0.0015 * (step as f64 / 60.0).sqrt();

    let mut close = base_price(symbol);
    let mut drift = 0.0;
    (0..count)
        .map(|i| {
            let open = close;
            // Slowly wandering trend so the walk has swings worth drawing on
            drift = (drift * 0.98 + rng.signed_unit() * vol * 0.05).clamp(-vol, vol);
            close = (open * (1.0 + drift + rng.signed_unit() * vol)).max(0.01);
            let high = open.max(close) * (1.0 + rng.signed_unit().abs() * vol * 0.5);
            let low = open.min(close) * (1.0 - rng.signed_unit().abs() * vol * 0.5);
            let volume = 100.0 * (1.0 + rng.signed_unit().abs() * 4.0);
            Candle::new(first + i as i64 * step, open, high, low, close, volume)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_series_shape() {
        let candles = generate_demo_series("ETHUSDT", Timeframe::M15, 500);
        assert_eq!(candles.len(), 500);
        assert!(candles.windows(2).all(|w| w[1].time - w[0].time == 900));
        assert!(candles.iter().all(|c| c.low <= c.open.min(c.close) && c.high >= c.open.max(c.close)));
        assert!(candles.iter().all(|c| c.low > 0.0));
    }

    #[test]
    fn test_demo_series_differs_per_symbol() {
        let btc = generate_demo_series("BTCUSDT", Timeframe::H1, 10);
        let sol = generate_demo_series("SOLUSDT", Timeframe::H1, 10);
        assert_ne!(btc[5].close / btc[0].open, sol[5].close / sol[0].open);
        assert_eq!(btc, generate_demo_series("BTCUSDT", Timeframe::H1, 10));
    }

    #[test]
    fn test_empty_request() {
        assert!(generate_demo_series("BTCUSDT", Timeframe::D1, 0).is_empty());
    }
}
