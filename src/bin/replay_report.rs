use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tabled::{Table, Tabled, settings::Style};

use replay_desk::{
    CandleSeries, ChartSession, DemoSource, JsonFileSource, MarketDataSource, SeriesKey, Timeframe,
    config::REPLAY,
    models::{CompletedTrade, PositionSide},
    utils::epoch_sec_to_string,
};

/// Replay a series headlessly: cut it, place orders, run to the end and
/// print what happened.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `<SYMBOL>_<tf>.json` candle files. Demo data if omitted.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    #[arg(long, default_value = "1h")]
    timeframe: Timeframe,

    /// Where to cut the series, as a percentage of its length
    #[arg(long, default_value_t = REPLAY.default_start_pct)]
    start_pct: u32,

    /// JSON array of orders: `[{"side": "long", "entry": 100.0, "sl": 95.0, "tp": 110.0}]`
    #[arg(long)]
    orders: PathBuf,
}

#[derive(Debug, Deserialize)]
struct OrderSpec {
    side: PositionSide,
    entry: f64,
    #[serde(default)]
    sl: Option<f64>,
    #[serde(default)]
    tp: Option<f64>,
}

#[derive(Tabled)]
struct TradeRow {
    #[tabled(rename = "Side")]
    side: String,
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Exit")]
    exit: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Closed at")]
    closed_at: String,
    #[tabled(rename = "PnL %")]
    pnl: String,
}

impl From<&CompletedTrade> for TradeRow {
    fn from(trade: &CompletedTrade) -> Self {
        Self {
            side: trade.position.side.to_string(),
            entry: format!("{:.2}", trade.position.entry),
            exit: format!("{:.2}", trade.exit_price),
            reason: trade.exit_reason.to_string(),
            closed_at: epoch_sec_to_string(trade.exit_time),
            pnl: format!("{:+.2}", trade.pnl),
        }
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn load_orders(path: &PathBuf) -> Result<Vec<OrderSpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read orders file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid orders file {}", path.display()))
}

fn main() -> Result<()> {
    // 1. Setup Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let key = SeriesKey::new(args.symbol.to_uppercase(), args.timeframe);

    // 2. Candles
    let source: Box<dyn MarketDataSource> = match &args.data_dir {
        Some(dir) => Box::new(JsonFileSource::new(dir.clone())),
        None => Box::new(DemoSource),
    };
    let page = source
        .fetch_ohlcv(&key.symbol, key.timeframe, REPLAY.fetch_limit, None)
        .with_context(|| format!("Failed to load {}", key))?;
    let series = CandleSeries::new(key.clone(), page);
    if series.len() < 2 {
        bail!("{} has too few candles to replay ({})", key, series.len());
    }
    let candles = series.candles();
    log::info!("📈 Loaded {} candles for {}", series.len(), key);

    // 3. Cut and place orders
    let mut session = ChartSession::new(key);
    session.start_replay(args.start_pct, candles);
    if let Some(label) = session.replay_label(candles) {
        log::info!("✂ Cut at {}", label);
    }

    let orders = load_orders(&args.orders)?;
    for order in &orders {
        session
            .place_order(order.side, order.entry, order.sl, order.tp, candles)
            .with_context(|| format!("Rejected order {:?}", order))?;
    }
    log::info!("Placed {} order(s)", orders.len());

    // 4. Run to the end
    let outcome = session.step_forward(candles.len(), candles);
    log::info!(
        "▶ Revealed {} bars, {} fill(s), {} exit(s)",
        outcome.revealed,
        outcome.filled.len(),
        outcome.closed.len()
    );

    // 5. Report
    let trades: Vec<TradeRow> = session.trades().iter().map(TradeRow::from).collect();
    if trades.is_empty() {
        println!("No completed trades.");
    } else {
        println!("{}", Table::new(trades).with(Style::rounded()));
    }

    let still_open = session.positions().len();
    let stats = session.stats();
    let rows = vec![
        StatRow {
            metric: "Trades",
            value: stats.total.to_string(),
        },
        StatRow {
            metric: "Wins",
            value: stats.wins.to_string(),
        },
        StatRow {
            metric: "Losses",
            value: stats.losses.to_string(),
        },
        StatRow {
            metric: "Win rate",
            value: format!("{:.1}%", stats.win_rate),
        },
        StatRow {
            metric: "Total PnL",
            value: format!("{:+.2}%", stats.total_pnl),
        },
        StatRow {
            metric: "Still open",
            value: still_open.to_string(),
        },
    ];
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}
