#![allow(clippy::collapsible_if)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod models;
pub mod overlay;
pub mod ui;
pub mod utils;

// Re-export commonly used types outside of crate (for replay_report.rs)
pub use app::App;
pub use config::{PERSISTENCE, Timeframe};
pub use data::{CandleSeries, DemoSource, JsonFileSource, MarketDataSource};
pub use domain::SeriesKey;
pub use engine::ChartSession;

// CLI argument parsing
use {clap::Parser, std::path::PathBuf};

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `<SYMBOL>_<tf>.json` candle files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Symbol to open on start, e.g. BTCUSDT
    #[arg(long)]
    pub symbol: Option<String>,

    /// Timeframe to open on start (1m, 5m, 15m, 1h, 4h, 1d)
    #[arg(long)]
    pub timeframe: Option<Timeframe>,

    /// Use generated demo candles even when a data directory is given
    #[arg(long, default_value_t = false)]
    pub demo: bool,
}

/// Main application entry point - creates the GUI app
/// This is the public API for the binary to call
pub fn run_app(cc: &eframe::CreationContext<'_>, args: Cli) -> App {
    App::new(cc, args)
}
