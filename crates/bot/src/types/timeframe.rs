//! Timeframes used by the multi-timeframe trend filter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three timeframes the sentinel reads.
///
/// Ordered from shortest to longest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Timeframe {
    /// 15-minute candles: oscillators, volatility, volume, swings.
    M15,
    /// 1-hour candles: mid-horizon trend filter.
    H1,
    /// 4-hour candles: long-horizon trend filter.
    H4,
}

impl Timeframe {
    /// Bybit v5 kline `interval` parameter (minutes).
    #[must_use]
    pub fn as_bybit_interval(&self) -> &'static str {
        match self {
            Self::M15 => "15",
            Self::H1 => "60",
            Self::H4 => "240",
        }
    }

    /// Bybit v5 open-interest `intervalTime` parameter.
    #[must_use]
    pub fn as_bybit_oi_interval(&self) -> &'static str {
        match self {
            Self::M15 => "15min",
            Self::H1 => "1h",
            Self::H4 => "4h",
        }
    }

    /// Bar length; a bar opened at `t` closes at `t + duration_secs()`.
    #[must_use]
    pub const fn duration_secs(&self) -> u64 {
        match self {
            Self::M15 => 900,
            Self::H1 => 3600,
            Self::H4 => 14400,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H4 => "4h",
        };
        write!(f, "{s}")
    }
}
