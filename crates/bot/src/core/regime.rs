//! ADX-driven regime classification and the momentum thresholds each regime implies.

use rust_decimal::Decimal;

use crate::config::RegimeParams;
use crate::types::{Regime, RegimeThresholds};

/// Classify trend strength: `adx < chop_below` is choppy, `adx > super_trend_above`
/// is a super trend, anything in between is a normal trend.
pub fn classify_regime(adx: Decimal, params: &RegimeParams) -> Regime {
    if adx < params.chop_below {
        Regime::Choppy
    } else if adx > params.super_trend_above {
        Regime::SuperTrend
    } else {
        Regime::NormalTrend
    }
}

/// Thresholds for a trending regime. Choppy markets have none.
pub fn regime_thresholds(regime: Regime, params: &RegimeParams) -> Option<RegimeThresholds> {
    match regime {
        Regime::Choppy => None,
        Regime::NormalTrend => Some(RegimeThresholds {
            long_ceiling: params.normal_long_ceiling,
            short_floor: params.normal_short_floor,
        }),
        Regime::SuperTrend => Some(RegimeThresholds {
            long_ceiling: params.super_long_ceiling,
            short_floor: params.super_short_floor,
        }),
    }
}
