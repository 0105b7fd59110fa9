use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trend-strength regime derived from ADX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// ADX below the chop cut-off: no directional signals.
    Choppy,
    /// ADX between the cut-offs: deep pullbacks required.
    NormalTrend,
    /// ADX above the super-trend cut-off: shallow pullbacks accepted.
    SuperTrend,
}

impl Regime {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Choppy => "CHOPPY",
            Self::NormalTrend => "NORMAL TREND",
            Self::SuperTrend => "SUPER TREND",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Momentum thresholds implied by a trending regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeThresholds {
    /// RSI must be below this for a long.
    #[serde(with = "rust_decimal::serde::str")]
    pub long_ceiling: Decimal,
    /// RSI must be above this for a short.
    #[serde(with = "rust_decimal::serde::str")]
    pub short_floor: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => f.write_str("LONG"),
            Self::Short => f.write_str("SHORT"),
        }
    }
}

/// Everything the decision function reads for one symbol in one cycle.
///
/// Built fresh by the aggregator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBundle {
    pub symbol: String,
    /// Last close of the short (15m) series.
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    /// EMA on the long (4h) series.
    #[serde(with = "rust_decimal::serde::str")]
    pub ema_long: Decimal,
    /// EMA on the mid (1h) series.
    #[serde(with = "rust_decimal::serde::str")]
    pub ema_mid: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rsi: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub mfi: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub adx: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub atr: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub volume_ma: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub prev_volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub current_volume: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub swing_low: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub swing_high: Decimal,
    /// Open interest in quote currency; zero when unavailable.
    #[serde(with = "rust_decimal::serde::str")]
    pub open_interest_value: Decimal,
    /// Short-term open-interest change in percent; zero when unavailable.
    #[serde(with = "rust_decimal::serde::str")]
    pub oi_change_pct: Decimal,
    /// Reference asset 24h change in percent.
    #[serde(with = "rust_decimal::serde::str")]
    pub macro_change_pct: Decimal,
}

/// Outcome of the confirmation guards for one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardStates {
    pub volume_ok: bool,
    pub open_interest_ok: bool,
    /// Amount added to the long ceiling by the macro adjustment (zero if inactive).
    #[serde(with = "rust_decimal::serde::str")]
    pub macro_relief: Decimal,
}

impl GuardStates {
    pub fn all_pass(&self) -> bool {
        self.volume_ok && self.open_interest_ok
    }
}

/// Inputs that justified a verdict, carried through to the alert text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    pub regime: Regime,
    #[serde(with = "rust_decimal::serde::str")]
    pub adx: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub rsi: Decimal,
    /// Effective RSI threshold after macro adjustment.
    #[serde(with = "rust_decimal::serde::str")]
    pub rsi_threshold: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub mfi: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub mfi_threshold: Decimal,
    pub guards: GuardStates,
    #[serde(with = "rust_decimal::serde::str")]
    pub open_interest_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub oi_change_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub macro_change_pct: Decimal,
}

/// A directional alert with levels. `None` verdicts are `Option::None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalVerdict {
    pub symbol: String,
    pub direction: Direction,
    #[serde(with = "rust_decimal::serde::str")]
    pub entry_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stop_loss: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub take_profit: Decimal,
    pub rationale: Rationale,
}
