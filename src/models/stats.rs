use serde::{Deserialize, Serialize};

use super::CompletedTrade;

/// Aggregate results of a practice session, recomputed from the trade log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayStats {
    pub total: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage of trades with positive pnl. Zero when there are no trades.
    pub win_rate: f64,
    /// Sum of per-trade percentage pnl.
    pub total_pnl: f64,
}

impl ReplayStats {
    /// A trade with `pnl <= 0` counts as a loss, break-even included.
    pub fn from_trades(trades: &[CompletedTrade]) -> Self {
        let wins = trades.iter().filter(|t| t.is_win()).count();
        let total = trades.len();
        let win_rate = if total > 0 {
            wins as f64 * 100.0 / total as f64
        } else {
            0.0
        };

        Self {
            total,
            wins,
            losses: total - wins,
            win_rate,
            total_pnl: trades.iter().map(|t| t.pnl).sum(),
        }
    }
}
