use {
    anyhow::Result,
    poll_promise::Promise,
    serde::{Deserialize, Serialize},
};

use crate::{
    data::OhlcvPage,
    domain::SeriesKey,
    models::PositionSide,
};

/// Top-level phase of the shell.
#[derive(Default)]
pub(crate) enum AppState {
    /// Waiting for the first page of the selected series.
    #[default]
    Loading,
    Running,
    /// The selected series could not be loaded at all.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchKind {
    /// Newest page of a (possibly new) series.
    Replace,
    /// The page just before the oldest loaded candle.
    Older,
}

/// A market-data request running on a worker thread.
pub(crate) struct PendingFetch {
    pub(crate) key: SeriesKey,
    pub(crate) kind: FetchKind,
    pub(crate) promise: Promise<Result<OhlcvPage>>,
}

/// Requests raised while drawing the panels. They need the frame's storage,
/// so they are applied once the panels are done.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShellAction {
    SwitchSeries(SeriesKey),
    ClearOrders,
    LoadOlder,
}

/// One line of feedback at the bottom of the window.
#[derive(Debug, Clone, Default)]
pub(crate) struct StatusLine {
    pub(crate) text: String,
    pub(crate) is_error: bool,
}

impl StatusLine {
    pub(crate) fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub(crate) fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Quick order entry in the replay panel. Prices are kept as typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct OrderForm {
    pub(crate) side: PositionSide,
    pub(crate) entry: String,
    pub(crate) sl: String,
    pub(crate) tp: String,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self {
            side: PositionSide::Long,
            entry: String::new(),
            sl: String::new(),
            tp: String::new(),
        }
    }
}

/// Parse an optional price field. Blank means "not set".
pub(crate) fn parse_price(field: &str, name: &str) -> Result<Option<f64>> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| anyhow::anyhow!("{} is not a number: '{}'", name, trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("  ", "SL").ok(), Some(None));
        assert_eq!(parse_price("101.5", "SL").ok(), Some(Some(101.5)));
        assert!(parse_price("abc", "SL").is_err());
    }
}
