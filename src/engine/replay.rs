//! Practice mode: progressive candle reveal with simulated orders.
//!
//! The engine never owns the candle series. Every call that needs it borrows
//! the full series, so the caller can swap timeframes and `rebase`.

use crate::{
    config::{DF, REPLAY},
    domain::{Candle, nearest_candle_index},
    models::{CompletedTrade, Position, PositionField, PositionId, PositionSide, ReplayStats},
};

/// What a single `step_forward` call changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub revealed: usize,
    pub filled: Vec<PositionId>,
    pub closed: Vec<CompletedTrade>,
}

impl StepOutcome {
    pub fn is_empty(&self) -> bool {
        self.revealed == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    active: bool,
    /// Candles revealed, counted from the start of the series.
    visible_count: usize,
    /// Time of the last revealed candle, used to find our place again after
    /// the series is replaced.
    cut_time: Option<i64>,
    positions: Vec<Position>,
    trades: Vec<CompletedTrade>,
    revision: u64,
}

impl ReplayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn cut_time(&self) -> Option<i64> {
        self.cut_time
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn trades(&self) -> &[CompletedTrade] {
        &self.trades
    }

    /// Bumped whenever positions or trades change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Reveal the first `index` candles and start a fresh session. Open and
    /// completed orders from a previous session are dropped.
    pub fn cut_at(&mut self, index: usize, candles: &[Candle]) -> bool {
        if candles.is_empty() {
            return false;
        }
        let index = index.clamp(1, candles.len());
        self.visible_count = index;
        self.cut_time = Some(candles[index - 1].time);
        self.active = true;
        self.positions.clear();
        self.trades.clear();
        self.touch();

        if DF.log_replay {
            log::info!(
                "Replay cut at bar {} / {} (t={})",
                index,
                candles.len(),
                candles[index - 1].time
            );
        }
        true
    }

    /// Cut at a share of the series. `percent` is clamped to the configured
    /// range and at least one candle is always revealed.
    pub fn start_replay(&mut self, percent: u32, candles: &[Candle]) -> bool {
        let pct = percent.clamp(REPLAY.min_start_pct, REPLAY.max_start_pct) as usize;
        let index = (candles.len() * pct / 100).max(1);
        self.cut_at(index, candles)
    }

    /// Reveal up to `n` more candles, resolving orders against each one in
    /// time order. A position that fills on a candle is not checked for an
    /// exit until the next one.
    pub fn step_forward(&mut self, n: usize, candles: &[Candle]) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        // A restored session reveals nothing until it has been rebased
        if !self.active
            || n == 0
            || self.visible_count == 0
            || self.visible_count >= candles.len()
        {
            return outcome;
        }

        let start = self.visible_count;
        let end = start.saturating_add(n).min(candles.len());

        for candle in &candles[start..end] {
            let mut still_open = Vec::with_capacity(self.positions.len());
            for mut pos in self.positions.drain(..) {
                if !pos.executed {
                    if pos.fills_on(candle) {
                        pos.executed = true;
                        pos.executed_time = Some(candle.time);
                        outcome.filled.push(pos.id);
                        if DF.log_replay {
                            log::info!("Filled {} {} @ {}", pos.side, pos.id, pos.entry);
                        }
                    }
                    still_open.push(pos);
                    continue;
                }

                match pos.exit_on(candle) {
                    Some((reason, price)) => {
                        let trade = pos.close(reason, price, candle.time);
                        if DF.log_replay {
                            log::info!(
                                "{} hit for {} {} @ {} ({:+.2}%)",
                                reason,
                                pos.side,
                                pos.id,
                                price,
                                trade.pnl
                            );
                        }
                        outcome.closed.push(trade.clone());
                        self.trades.push(trade);
                    }
                    None => still_open.push(pos),
                }
            }
            self.positions = still_open;
        }

        self.visible_count = end;
        self.cut_time = Some(candles[end - 1].time);
        outcome.revealed = end - start;
        if !outcome.filled.is_empty() || !outcome.closed.is_empty() {
            self.touch();
        }
        outcome
    }

    /// Open a pending order at the last revealed candle. Inputs are assumed
    /// validated by the caller.
    pub fn place_position(
        &mut self,
        side: PositionSide,
        entry: f64,
        sl: Option<f64>,
        tp: Option<f64>,
        candles: &[Candle],
    ) -> PositionId {
        let entry_time = self.visible_data(candles).last().map_or(0, |c| c.time);
        let pos = Position::pending(side, entry, sl, tp, entry_time);
        let id = pos.id;
        if DF.log_replay {
            log::info!("Placed {} {} @ {} sl={:?} tp={:?}", side, id, entry, sl, tp);
        }
        self.positions.push(pos);
        self.touch();
        id
    }

    pub fn update_position(&mut self, id: PositionId, field: PositionField, value: Option<f64>) -> bool {
        let Some(pos) = self.positions.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        if pos.field(field) == value {
            return false;
        }
        pos.set_field(field, value);
        self.touch();
        true
    }

    pub fn remove_position(&mut self, id: PositionId) -> bool {
        let before = self.positions.len();
        self.positions.retain(|p| p.id != id);
        let removed = self.positions.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Drop every open order and the whole trade log.
    pub fn clear_all_orders(&mut self) -> bool {
        if self.positions.is_empty() && self.trades.is_empty() {
            return false;
        }
        self.positions.clear();
        self.trades.clear();
        self.touch();
        true
    }

    /// Leave practice mode. Open orders are discarded; the trade log stays.
    pub fn stop_replay(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.visible_count = 0;
        self.cut_time = None;
        if !self.positions.is_empty() {
            self.positions.clear();
            self.touch();
        }
        if DF.log_replay {
            log::info!("Replay stopped, {} trades kept", self.trades.len());
        }
    }

    /// Find our place again in a replaced series by nearest timestamp.
    pub fn rebase(&mut self, candles: &[Candle]) -> bool {
        if !self.active {
            return false;
        }
        let Some(idx) = self.cut_time.and_then(|t| nearest_candle_index(candles, t)) else {
            return false;
        };
        self.visible_count = idx + 1;
        self.cut_time = Some(candles[idx].time);
        if DF.log_replay {
            log::info!("Replay rebased to bar {} / {}", self.visible_count, candles.len());
        }
        true
    }

    /// Swap in orders restored from storage. With a saved `cut_time` practice
    /// mode resumes, but nothing is revealed until [`Self::rebase`] sees the
    /// candles.
    pub fn restore(
        &mut self,
        positions: Vec<Position>,
        trades: Vec<CompletedTrade>,
        cut_time: Option<i64>,
    ) {
        self.active = cut_time.is_some();
        self.visible_count = 0;
        self.cut_time = cut_time;
        self.positions = positions;
        self.trades = trades;
        self.touch();
    }

    /// Revealed prefix while active, the full series otherwise.
    pub fn visible_data<'a>(&self, candles: &'a [Candle]) -> &'a [Candle] {
        if self.active {
            &candles[..self.visible_count.min(candles.len())]
        } else {
            candles
        }
    }

    pub fn hidden_count(&self, candles: &[Candle]) -> usize {
        if self.active {
            candles.len().saturating_sub(self.visible_count)
        } else {
            0
        }
    }

    pub fn is_at_end(&self, candles: &[Candle]) -> bool {
        self.active && self.visible_count >= candles.len()
    }

    /// Close of the last revealed candle, used for live pnl.
    pub fn last_price(&self, candles: &[Candle]) -> Option<f64> {
        self.visible_data(candles).last().map(|c| c.close)
    }

    pub fn stats(&self) -> ReplayStats {
        ReplayStats::from_trades(&self.trades)
    }

    pub fn step_label(&self, candles: &[Candle]) -> Option<String> {
        self.active
            .then(|| format!("Bar {} / {}", self.visible_count, candles.len()))
    }
}
