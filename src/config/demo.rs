pub struct DemoResources {
    pub symbols: &'static [&'static str],
}

pub struct DemoConfig {
    /// Candles generated per (symbol x timeframe)
    pub candle_count: usize,
    /// Open time of the newest generated candle (epoch seconds)
    pub anchor_time: i64,
    pub resources: DemoResources,
}

pub const DEMO: DemoConfig = DemoConfig {
    candle_count: 2_000,
    // 2025-01-01T00:00:00Z
    anchor_time: 1_735_689_600,
    resources: DemoResources {
        symbols: &["BTCUSDT", "ETHUSDT", "SOLUSDT"],
    },
};
