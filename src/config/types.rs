//! Shared configuration enums

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, IntoStaticStr};

/// Candle timeframes offered by the shell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, IntoStaticStr, Default,
)]
pub enum Timeframe {
    #[strum(serialize = "1m")]
    M1,
    #[strum(serialize = "5m")]
    M5,
    #[strum(serialize = "15m")]
    M15,
    #[default]
    #[strum(serialize = "1h")]
    H1,
    #[strum(serialize = "4h")]
    H4,
    #[strum(serialize = "1d")]
    D1,
}

impl Timeframe {
    pub fn seconds(&self) -> i64 {
        match self {
            Self::M1 => 60,
            Self::M5 => 5 * 60,
            Self::M15 => 15 * 60,
            Self::H1 => 60 * 60,
            Self::H4 => 4 * 60 * 60,
            Self::D1 => 24 * 60 * 60,
        }
    }

    /// Short label as used in file names and the toolbar, e.g. `15m`.
    pub fn label(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;
        Self::iter()
            .find(|tf| tf.label() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown timeframe '{}'", s))
    }
}
