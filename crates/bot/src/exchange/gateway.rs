//! Market data boundary: everything the scanner needs from an exchange,
//! returned as typed structs.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::config::ScannerConfig;
use crate::errors::SentinelError;
use crate::types::{CandleSeries, OpenInterestSnapshot, TickerSummary, Timeframe};

/// Read-only market data source. Any failure means "skip this symbol this cycle".
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Tickers passing `filter`, highest quote volume first.
    async fn list_symbols_by_volume(
        &self,
        filter: &UniverseFilter,
    ) -> Result<Vec<TickerSummary>, SentinelError>;

    async fn get_ticker(&self, symbol: &str) -> Result<TickerSummary, SentinelError>;

    /// Most recent `limit` candles, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<CandleSeries, SentinelError>;

    async fn get_open_interest(&self, symbol: &str)
        -> Result<OpenInterestSnapshot, SentinelError>;

    /// Open-interest history, oldest first (`[older, newer]` for `limit = 2`).
    async fn get_open_interest_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<OpenInterestSnapshot>, SentinelError>;
}

/// Which symbols make up the scan universe.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseFilter {
    pub min_quote_volume: Decimal,
    pub quote_asset: String,
    pub excluded_substrings: Vec<String>,
    pub max_symbols: Option<usize>,
}

impl UniverseFilter {
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self {
            min_quote_volume: config.min_quote_volume_usdt,
            quote_asset: config.quote_asset.clone(),
            excluded_substrings: config.excluded_substrings.clone(),
            max_symbols: config.max_symbols,
        }
    }

    pub fn accepts(&self, ticker: &TickerSummary) -> bool {
        let base = match ticker.symbol.strip_suffix(&self.quote_asset) {
            Some(base) if !base.is_empty() => base,
            _ => return false,
        };
        if self
            .excluded_substrings
            .iter()
            .any(|ex| !ex.is_empty() && base.contains(ex.as_str()))
        {
            return false;
        }
        ticker.quote_volume_24h >= self.min_quote_volume
    }

    /// Filter, sort by quote volume descending, then cap.
    pub fn select(&self, tickers: Vec<TickerSummary>) -> Vec<TickerSummary> {
        let mut selected: Vec<TickerSummary> =
            tickers.into_iter().filter(|t| self.accepts(t)).collect();
        selected.sort_by(|a, b| {
            b.quote_volume_24h
                .cmp(&a.quote_volume_24h)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });
        if let Some(max) = self.max_symbols {
            selected.truncate(max);
        }
        selected
    }
}
