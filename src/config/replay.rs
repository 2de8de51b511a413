//! Replay / practice mode defaults

pub struct ReplayConfig {
    /// Share of the series revealed when practice starts
    pub default_start_pct: u32,
    pub min_start_pct: u32,
    pub max_start_pct: u32,
    /// Bars revealed by the step buttons
    pub step_presets: &'static [usize],
    /// Candles requested per fetch
    pub fetch_limit: usize,
}

pub const REPLAY: ReplayConfig = ReplayConfig {
    default_start_pct: 70,
    min_start_pct: 10,
    max_start_pct: 95,
    step_presets: &[1, 5, 20],
    fetch_limit: 10_000,
};
