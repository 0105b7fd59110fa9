use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::timeframe::Timeframe;
use crate::errors::SentinelError;

/// A single OHLCV candle. `timestamp` is the bar open time in unix seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OHLCV {
    pub timestamp: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub close: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume: Decimal,
}

/// Candles for one symbol on one timeframe, oldest first.
///
/// Construction enforces strictly increasing timestamps, so indicator code can
/// index by position without re-checking order.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    timeframe: Timeframe,
    candles: Vec<OHLCV>,
}

impl CandleSeries {
    pub fn new(timeframe: Timeframe, candles: Vec<OHLCV>) -> Result<Self, SentinelError> {
        if let Some(pos) = candles
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(SentinelError::InvalidSeries {
                reason: format!(
                    "{timeframe} timestamps not strictly increasing at index {}",
                    pos + 1
                ),
            });
        }
        Ok(Self { timeframe, candles })
    }

    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    pub fn candles(&self) -> &[OHLCV] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&OHLCV> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn highs(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.high).collect()
    }

    pub fn lows(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.low).collect()
    }

    pub fn volumes(&self) -> Vec<Decimal> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Bars that have closed by `as_of` (unix seconds). Exchanges return the
    /// still-forming bar last.
    pub fn completed(&self, as_of: i64) -> CandleSeries {
        let step = self.timeframe.duration_secs() as i64;
        let closed = self
            .candles
            .partition_point(|c| c.timestamp + step <= as_of);
        Self {
            timeframe: self.timeframe,
            candles: self.candles[..closed].to_vec(),
        }
    }
}

/// Open interest for a linear perpetual.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenInterestSnapshot {
    /// Open interest in quote currency (USDT).
    #[serde(with = "rust_decimal::serde::str")]
    pub value: Decimal,
    /// Open interest in contracts (base units).
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    /// Unix seconds; zero when the venue does not report one.
    pub timestamp: i64,
}

/// 24h ticker summary used for universe selection and macro context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub last_price: Decimal,
    /// 24h change in percent (1.5 = +1.5%).
    #[serde(with = "rust_decimal::serde::str")]
    pub price_change_24h_pct: Decimal,
    /// 24h traded value in quote currency.
    #[serde(with = "rust_decimal::serde::str")]
    pub quote_volume_24h: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub open_interest: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub open_interest_value: Decimal,
}

impl TickerSummary {
    pub fn open_interest_snapshot(&self) -> OpenInterestSnapshot {
        OpenInterestSnapshot {
            value: self.open_interest_value,
            amount: self.open_interest,
            timestamp: 0,
        }
    }
}
