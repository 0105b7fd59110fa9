//! Bybit v5 public market data client (linear perpetuals).
//!
//! Endpoints:
//!   - `/v5/market/tickers`        universe, 24h change, open interest
//!   - `/v5/market/kline`          OHLCV (returned newest first, re-sorted here)
//!   - `/v5/market/open-interest`  open-interest history
//!
//! Caching (in-memory, per data type):
//!   - Tickers: `ticker_cache_ttl_seconds` (one request serves a whole cycle)
//!   - 4h klines: `long_candle_cache_ttl_seconds`, capped at the forming bar's close
//!   - Shorter klines and open-interest history: not cached

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use super::gateway::{MarketDataGateway, UniverseFilter};
use crate::config::ExchangeConfig;
use crate::constants::PERCENT;
use crate::errors::SentinelError;
use crate::types::{CandleSeries, OpenInterestSnapshot, TickerSummary, Timeframe, OHLCV};

const TICKERS_KEY: &str = "tickers";

// ═══════════════════════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ret_code: i64,
    #[serde(default)]
    ret_msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ListResult<T> {
    #[serde(default = "Vec::new")]
    list: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTicker {
    symbol: String,
    #[serde(default)]
    last_price: String,
    #[serde(default)]
    price24h_pcnt: String,
    #[serde(default)]
    turnover24h: String,
    #[serde(default)]
    open_interest: String,
    #[serde(default)]
    open_interest_value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOpenInterest {
    open_interest: String,
    timestamp: String,
}

// ═══════════════════════════════════════════════════════════════════════════
// Cache
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
struct CacheEntry<T: Clone> {
    data: T,
    expires_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Default)]
struct DataCache {
    tickers: HashMap<String, CacheEntry<Vec<TickerSummary>>>,
    klines: HashMap<String, CacheEntry<Vec<OHLCV>>>,
}

// ═══════════════════════════════════════════════════════════════════════════
// BybitClient
// ═══════════════════════════════════════════════════════════════════════════

pub struct BybitClient {
    client: reqwest::Client,
    config: ExchangeConfig,
    cache: Mutex<DataCache>,
}

impl BybitClient {
    pub fn new(config: ExchangeConfig) -> Result<Self, SentinelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            cache: Mutex::new(DataCache::default()),
        })
    }

    // -----------------------------------------------------------------------
    // Private: HTTP + cache helpers
    // -----------------------------------------------------------------------

    /// GET a v5 endpoint and unwrap the `{retCode, retMsg, result}` envelope.
    async fn bybit_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, SentinelError> {
        let url = format!("{}{path}", self.config.base_url);
        let resp = self.client.get(&url).query(params).send().await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, "rate limited by Bybit");
            return Err(SentinelError::DataUnavailable { name: url });
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(url = %url, %status, body = %body, "HTTP error from Bybit");
            return Err(SentinelError::DataUnavailable { name: url });
        }

        let envelope: Envelope<T> = resp.json().await?;
        unwrap_envelope(envelope, path)
    }

    fn cache(&self) -> std::sync::MutexGuard<'_, DataCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All linear tickers, cached for one TTL window.
    async fn tickers(&self) -> Result<Vec<TickerSummary>, SentinelError> {
        if let Some(entry) = self.cache().tickers.get(TICKERS_KEY) {
            if entry.is_valid() {
                trace!(count = entry.data.len(), "tickers cache HIT");
                return Ok(entry.data.clone());
            }
        }

        let start = Instant::now();
        let result: ListResult<RawTicker> = self
            .bybit_get(
                "/v5/market/tickers",
                &[("category", self.config.category.as_str())],
            )
            .await?;
        let tickers: Vec<TickerSummary> = result.list.into_iter().map(ticker_from_raw).collect();

        debug!(
            count = tickers.len(),
            latency_ms = start.elapsed().as_millis() as u64,
            "tickers fetched"
        );

        self.cache().tickers.insert(
            TICKERS_KEY.to_string(),
            CacheEntry::new(
                tickers.clone(),
                Duration::from_secs(self.config.ticker_cache_ttl_seconds),
            ),
        );

        Ok(tickers)
    }

    async fn find_ticker(&self, symbol: &str) -> Result<TickerSummary, SentinelError> {
        self.tickers()
            .await?
            .into_iter()
            .find(|t| t.symbol == symbol)
            .ok_or_else(|| SentinelError::DataUnavailable {
                name: format!("ticker {symbol}"),
            })
    }
}

#[async_trait]
impl MarketDataGateway for BybitClient {
    async fn list_symbols_by_volume(
        &self,
        filter: &UniverseFilter,
    ) -> Result<Vec<TickerSummary>, SentinelError> {
        let all = self.tickers().await?;
        let total = all.len();
        let selected = filter.select(all);
        debug!(total, selected = selected.len(), "universe filtered");
        Ok(selected)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<TickerSummary, SentinelError> {
        self.find_ticker(symbol).await
    }

    async fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<CandleSeries, SentinelError> {
        let interval = timeframe.as_bybit_interval();
        let cache_key = format!("kline:{symbol}:{interval}:{limit}");
        let cacheable = timeframe == Timeframe::H4;

        if cacheable {
            if let Some(entry) = self.cache().klines.get(&cache_key) {
                if entry.is_valid() {
                    trace!(cache_key = %cache_key, "kline cache HIT");
                    return CandleSeries::new(timeframe, entry.data.clone());
                }
            }
        }

        let limit_str = limit.to_string();
        let result: ListResult<Vec<String>> = self
            .bybit_get(
                "/v5/market/kline",
                &[
                    ("category", self.config.category.as_str()),
                    ("symbol", symbol),
                    ("interval", interval),
                    ("limit", limit_str.as_str()),
                ],
            )
            .await?;

        let candles = candles_from_rows(result.list);
        trace!(
            symbol,
            interval,
            candles = candles.len(),
            latest_close = %candles.last().map(|c| c.close).unwrap_or_default(),
            "klines fetched"
        );

        if cacheable {
            let ttl = kline_cache_ttl(
                &candles,
                timeframe,
                chrono::Utc::now().timestamp(),
                Duration::from_secs(self.config.long_candle_cache_ttl_seconds),
            );
            self.cache()
                .klines
                .insert(cache_key, CacheEntry::new(candles.clone(), ttl));
        }

        CandleSeries::new(timeframe, candles)
    }

    async fn get_open_interest(
        &self,
        symbol: &str,
    ) -> Result<OpenInterestSnapshot, SentinelError> {
        Ok(self.find_ticker(symbol).await?.open_interest_snapshot())
    }

    async fn get_open_interest_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: u32,
    ) -> Result<Vec<OpenInterestSnapshot>, SentinelError> {
        let limit_str = limit.to_string();
        let result: ListResult<RawOpenInterest> = self
            .bybit_get(
                "/v5/market/open-interest",
                &[
                    ("category", self.config.category.as_str()),
                    ("symbol", symbol),
                    ("intervalTime", timeframe.as_bybit_oi_interval()),
                    ("limit", limit_str.as_str()),
                ],
            )
            .await?;

        Ok(open_interest_from_rows(result.list))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Free helpers
// ═══════════════════════════════════════════════════════════════════════════

fn unwrap_envelope<T>(envelope: Envelope<T>, path: &str) -> Result<T, SentinelError> {
    if envelope.ret_code != 0 {
        return Err(SentinelError::Exchange {
            code: envelope.ret_code,
            message: envelope.ret_msg,
        });
    }
    envelope.result.ok_or_else(|| SentinelError::DataUnavailable {
        name: format!("{path}: empty result"),
    })
}

/// Parse a Bybit number-as-string into `Decimal`; empty or malformed is zero.
fn parse_decimal_str(s: &str) -> Decimal {
    s.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

fn ticker_from_raw(raw: RawTicker) -> TickerSummary {
    TickerSummary {
        last_price: parse_decimal_str(&raw.last_price),
        price_change_24h_pct: parse_decimal_str(&raw.price24h_pcnt) * PERCENT,
        quote_volume_24h: parse_decimal_str(&raw.turnover24h),
        open_interest: parse_decimal_str(&raw.open_interest),
        open_interest_value: parse_decimal_str(&raw.open_interest_value),
        symbol: raw.symbol,
    }
}

/// Kline rows are `[startMs, open, high, low, close, volume, turnover]`, newest
/// first. Malformed rows are dropped; the result is oldest first.
fn candles_from_rows(rows: Vec<Vec<String>>) -> Vec<OHLCV> {
    let mut candles: Vec<OHLCV> = rows
        .into_iter()
        .filter_map(|row| {
            if row.len() < 6 {
                return None;
            }
            let start_ms: i64 = row[0].parse().ok()?;
            Some(OHLCV {
                timestamp: start_ms / 1000,
                open: parse_decimal_str(&row[1]),
                high: parse_decimal_str(&row[2]),
                low: parse_decimal_str(&row[3]),
                close: parse_decimal_str(&row[4]),
                volume: parse_decimal_str(&row[5]),
            })
        })
        .collect();
    candles.sort_by_key(|c| c.timestamp);
    candles
}

/// Cached klines expire no later than the close of their newest (forming) bar,
/// so a closed bar is never served with its pre-close values.
fn kline_cache_ttl(candles: &[OHLCV], timeframe: Timeframe, now: i64, max: Duration) -> Duration {
    match candles.last() {
        Some(newest) => {
            let closes_in = newest.timestamp + timeframe.duration_secs() as i64 - now;
            max.min(Duration::from_secs(closes_in.max(0) as u64))
        }
        None => max,
    }
}

/// Open-interest rows carry contract amounts only; `value` stays zero.
fn open_interest_from_rows(rows: Vec<RawOpenInterest>) -> Vec<OpenInterestSnapshot> {
    let mut points: Vec<OpenInterestSnapshot> = rows
        .into_iter()
        .filter_map(|row| {
            let ts_ms: i64 = row.timestamp.parse().ok()?;
            Some(OpenInterestSnapshot {
                value: Decimal::ZERO,
                amount: parse_decimal_str(&row.open_interest),
                timestamp: ts_ms / 1000,
            })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    points
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
