use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionId(Uuid);

impl PositionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PositionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn arrow(&self) -> &'static str {
        match self {
            PositionSide::Long => "▲",
            PositionSide::Short => "▼",
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
        }
    }
}

/// The two exit levels a user can drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionField {
    Sl,
    Tp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    SL,
    TP,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::SL => write!(f, "SL"),
            ExitReason::TP => write!(f, "TP"),
        }
    }
}

/// A simulated order: pending until a revealed candle touches `entry`, then
/// open until a later candle touches `sl` or `tp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub side: PositionSide,
    pub entry: f64,
    pub sl: Option<f64>,
    pub tp: Option<f64>,
    pub active: bool,
    pub executed: bool,
    pub executed_time: Option<i64>,
    /// Time of the last visible candle when the order was placed.
    pub entry_time: i64,
}

impl Position {
    pub fn pending(
        side: PositionSide,
        entry: f64,
        sl: Option<f64>,
        tp: Option<f64>,
        entry_time: i64,
    ) -> Self {
        Self {
            id: PositionId::new(),
            side,
            entry,
            sl,
            tp,
            active: true,
            executed: false,
            executed_time: None,
            entry_time,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.active && !self.executed
    }

    /// Long orders fill when the bar trades down to entry, shorts when it
    /// trades up to it.
    pub fn fills_on(&self, candle: &Candle) -> bool {
        match self.side {
            PositionSide::Long => candle.low <= self.entry,
            PositionSide::Short => candle.high >= self.entry,
        }
    }

    /// Exit triggered by `candle`, if any. Stop loss is checked before take
    /// profit so a bar crossing both resolves as a loss.
    pub fn exit_on(&self, candle: &Candle) -> Option<(ExitReason, f64)> {
        let (sl_hit, tp_hit) = match self.side {
            PositionSide::Long => (
                self.sl.is_some_and(|sl| candle.low <= sl),
                self.tp.is_some_and(|tp| candle.high >= tp),
            ),
            PositionSide::Short => (
                self.sl.is_some_and(|sl| candle.high >= sl),
                self.tp.is_some_and(|tp| candle.low <= tp),
            ),
        };

        if sl_hit {
            return self.sl.map(|sl| (ExitReason::SL, sl));
        }
        if tp_hit {
            return self.tp.map(|tp| (ExitReason::TP, tp));
        }
        None
    }

    /// Signed percentage return from entry to `price`.
    pub fn pnl_pct(&self, price: f64) -> f64 {
        match self.side {
            PositionSide::Long => (price - self.entry) * 100.0 / self.entry,
            PositionSide::Short => (self.entry - price) * 100.0 / self.entry,
        }
    }

    /// Reward / risk. `None` unless both levels are set; infinite when the
    /// stop sits on the entry.
    pub fn risk_reward(&self) -> Option<f64> {
        let risk = (self.entry - self.sl?).abs();
        let reward = (self.tp? - self.entry).abs();
        if risk > 0.0 {
            Some(reward / risk)
        } else {
            Some(f64::INFINITY)
        }
    }

    pub fn field(&self, field: PositionField) -> Option<f64> {
        match field {
            PositionField::Sl => self.sl,
            PositionField::Tp => self.tp,
        }
    }

    pub fn set_field(&mut self, field: PositionField, value: Option<f64>) {
        match field {
            PositionField::Sl => self.sl = value,
            PositionField::Tp => self.tp = value,
        }
    }

    /// Close the position into an immutable trade record.
    pub fn close(&self, reason: ExitReason, exit_price: f64, exit_time: i64) -> CompletedTrade {
        let mut position = self.clone();
        position.active = false;
        CompletedTrade {
            pnl: position.pnl_pct(exit_price),
            position,
            exit_price,
            exit_reason: reason,
            exit_time,
        }
    }
}

/// Terminal snapshot of a position. Append-only; never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
    #[serde(flatten)]
    pub position: Position,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub exit_time: i64,
    /// Percentage return.
    pub pnl: f64,
}

impl CompletedTrade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(time: i64, high: f64, low: f64) -> Candle {
        Candle::new(time, (high + low) / 2.0, high, low, (high + low) / 2.0, 1.0)
    }

    #[test]
    fn test_long_fill_rules() {
        let pos = Position::pending(PositionSide::Long, 100.0, Some(95.0), Some(110.0), 0);
        assert!(!pos.fills_on(&bar(60, 105.0, 101.0)));
        assert!(pos.fills_on(&bar(60, 105.0, 100.0)));
    }

    #[test]
    fn test_short_fill_rules() {
        let pos = Position::pending(PositionSide::Short, 100.0, Some(105.0), Some(90.0), 0);
        assert!(!pos.fills_on(&bar(60, 99.0, 95.0)));
        assert!(pos.fills_on(&bar(60, 100.0, 95.0)));
    }

    #[test]
    fn test_stop_checked_before_target() {
        let pos = Position::pending(PositionSide::Long, 100.0, Some(95.0), Some(110.0), 0);
        assert_eq!(pos.exit_on(&bar(60, 111.0, 94.0)), Some((ExitReason::SL, 95.0)));
        assert_eq!(pos.exit_on(&bar(60, 111.0, 99.0)), Some((ExitReason::TP, 110.0)));
        assert_eq!(pos.exit_on(&bar(60, 105.0, 99.0)), None);

        let short = Position::pending(PositionSide::Short, 100.0, Some(105.0), Some(90.0), 0);
        assert_eq!(short.exit_on(&bar(60, 106.0, 89.0)), Some((ExitReason::SL, 105.0)));
        assert_eq!(short.exit_on(&bar(60, 101.0, 89.0)), Some((ExitReason::TP, 90.0)));
    }

    #[test]
    fn test_no_levels_never_exit() {
        let pos = Position::pending(PositionSide::Long, 100.0, None, None, 0);
        assert_eq!(pos.exit_on(&bar(60, 1_000.0, 1.0)), None);
        assert_eq!(pos.risk_reward(), None);
    }

    #[test]
    fn test_pnl_and_risk_reward() {
        let long = Position::pending(PositionSide::Long, 100.0, Some(95.0), Some(110.0), 0);
        assert!((long.pnl_pct(95.0) + 5.0).abs() < 1e-9);
        assert!((long.pnl_pct(110.0) - 10.0).abs() < 1e-9);
        assert_eq!(long.risk_reward(), Some(2.0));

        let short = Position::pending(PositionSide::Short, 200.0, Some(210.0), Some(180.0), 0);
        assert!((short.pnl_pct(180.0) - 10.0).abs() < 1e-9);
        assert!((short.pnl_pct(210.0) + 5.0).abs() < 1e-9);

        let flat = Position::pending(PositionSide::Long, 100.0, Some(100.0), Some(110.0), 0);
        assert_eq!(flat.risk_reward(), Some(f64::INFINITY));
    }

    #[test]
    fn test_close_snapshots_position() {
        let pos = Position::pending(PositionSide::Long, 100.0, Some(95.0), Some(110.0), 0);
        let trade = pos.close(ExitReason::TP, 110.0, 600);
        assert!(!trade.position.active);
        assert!(pos.active);
        assert_eq!(trade.exit_time, 600);
        assert!(trade.is_win());
    }
}
