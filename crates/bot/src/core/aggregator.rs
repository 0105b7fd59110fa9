//! Feature aggregation: three candle series plus open-interest and macro
//! context in, one immutable [`FeatureBundle`] out.
//!
//! Length checks run before any indicator so a short series surfaces as
//! `InsufficientData` rather than a silently neutral indicator value.

use rust_decimal::Decimal;

use crate::config::IndicatorParams;
use crate::constants::PERCENT;
use crate::core::indicators;
use crate::errors::SentinelError;
use crate::types::{CandleSeries, FeatureBundle, OpenInterestSnapshot};

/// Open-interest inputs for one symbol. Missing data is represented by zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpenInterestContext {
    pub value: Decimal,
    pub change_pct: Decimal,
}

impl OpenInterestContext {
    /// Combine the current snapshot with a `[older, newer]` history.
    pub fn from_parts(
        current: Option<&OpenInterestSnapshot>,
        history: &[OpenInterestSnapshot],
    ) -> Self {
        Self {
            value: current.map(|s| s.value).unwrap_or(Decimal::ZERO),
            change_pct: open_interest_change_pct(history),
        }
    }
}

/// Percentage change between the last two history points (on contract amount).
///
/// Zero when fewer than two points exist or the older amount is not positive.
pub fn open_interest_change_pct(history: &[OpenInterestSnapshot]) -> Decimal {
    match history {
        [.., older, newer] if older.amount > Decimal::ZERO => {
            (newer.amount - older.amount) / older.amount * PERCENT
        }
        _ => Decimal::ZERO,
    }
}

fn require_len(series: &CandleSeries, need: usize) -> Result<(), SentinelError> {
    if series.len() < need {
        return Err(SentinelError::InsufficientData {
            timeframe: series.timeframe().to_string(),
            have: series.len(),
            need,
        });
    }
    Ok(())
}

fn computed(value: Option<Decimal>, indicator: &str) -> Result<Decimal, SentinelError> {
    value.ok_or_else(|| SentinelError::Computation {
        indicator: indicator.into(),
    })
}

/// Build the feature bundle for `symbol` as of `as_of` (unix seconds).
///
/// * `long`: 4h series feeding the long-horizon EMA
/// * `mid`: 1h series feeding the mid-horizon EMA
/// * `short`: 15m series feeding price, oscillators, ATR, volume and swings
///
/// Trend EMAs only see bars closed by `as_of`. The short series is used as
/// given: its last bar is the current one.
#[allow(clippy::too_many_arguments)]
pub fn build_feature_bundle(
    symbol: &str,
    long: &CandleSeries,
    mid: &CandleSeries,
    short: &CandleSeries,
    open_interest: &OpenInterestContext,
    macro_change_pct: Decimal,
    params: &IndicatorParams,
    as_of: i64,
) -> Result<FeatureBundle, SentinelError> {
    let long = long.completed(as_of);
    let mid = mid.completed(as_of);
    require_len(&long, params.long_min_len())?;
    require_len(&mid, params.mid_min_len())?;
    require_len(short, params.short_min_len())?;

    let ema_long = computed(
        indicators::ema_last(&long.closes(), params.ema_long_period),
        "ema_long",
    )?;
    let ema_mid = computed(
        indicators::ema_last(&mid.closes(), params.ema_mid_period),
        "ema_mid",
    )?;

    let closes = short.closes();
    let highs = short.highs();
    let lows = short.lows();
    let volumes = short.volumes();

    let price = computed(closes.last().copied(), "price")?;
    let current_volume = computed(volumes.last().copied(), "current_volume")?;
    let prev_volume = computed(
        volumes.len().checked_sub(2).map(|i| volumes[i]),
        "prev_volume",
    )?;
    let volume_ma = computed(
        indicators::sma(&volumes, params.volume_ma_period),
        "volume_ma",
    )?;
    let swing_low = computed(indicators::swing_low(&lows, params.swing_lookback), "swing_low")?;
    let swing_high = computed(
        indicators::swing_high(&highs, params.swing_lookback),
        "swing_high",
    )?;

    let rsi = indicators::rsi(&closes, params.rsi_period);
    let mfi = indicators::mfi(&highs, &lows, &closes, &volumes, params.mfi_period);
    let adx = indicators::adx(&highs, &lows, &closes, params.adx_period);
    let atr = indicators::atr(&highs, &lows, &closes, params.atr_period);

    if price <= Decimal::ZERO {
        return Err(SentinelError::Computation {
            indicator: "price".into(),
        });
    }

    Ok(FeatureBundle {
        symbol: symbol.to_string(),
        price,
        ema_long,
        ema_mid,
        rsi,
        mfi,
        adx,
        atr,
        volume_ma,
        prev_volume,
        current_volume,
        swing_low,
        swing_high,
        open_interest_value: open_interest.value,
        oi_change_pct: open_interest.change_pct,
        macro_change_pct,
    })
}
