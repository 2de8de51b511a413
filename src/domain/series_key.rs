use {
    crate::config::Timeframe,
    serde::{Deserialize, Serialize},
};

/// Identity of the instrument currently on the chart.
#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct SeriesKey {
    pub symbol: String,
    pub timeframe: Timeframe,
}

impl SeriesKey {
    pub fn new(symbol: impl Into<String>, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }

    pub(crate) fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl Default for SeriesKey {
    fn default() -> Self {
        Self::new("BTCUSDT", Timeframe::default())
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {}", self.symbol, self.timeframe)
    }
}
