//! Confirmation guards. Pure functions of the feature bundle: each either
//! passes/fails a candidate or adjusts a threshold, never anything else.

use rust_decimal::Decimal;

use crate::config::GuardParams;
use crate::types::{FeatureBundle, GuardStates};

/// Passes when the previous candle's volume is below `multiplier * volume MA`.
pub fn volume_shock_passes(bundle: &FeatureBundle, params: &GuardParams) -> bool {
    bundle.prev_volume < params.volume_shock_multiplier * bundle.volume_ma
}

/// Fails when open interest rose by more than the configured percentage.
///
/// Applied identically to both directions.
pub fn oi_divergence_passes(oi_change_pct: Decimal, params: &GuardParams) -> bool {
    oi_change_pct <= params.oi_change_max_pct
}

/// Relief added to the long ceiling when the reference asset sold off.
pub fn macro_ceiling_relief(macro_change_pct: Decimal, params: &GuardParams) -> Decimal {
    if macro_change_pct < params.macro_drop_pct {
        params.macro_ceiling_relief
    } else {
        Decimal::ZERO
    }
}

pub fn evaluate_guards(bundle: &FeatureBundle, params: &GuardParams) -> GuardStates {
    GuardStates {
        volume_ok: volume_shock_passes(bundle, params),
        open_interest_ok: oi_divergence_passes(bundle.oi_change_pct, params),
        macro_relief: macro_ceiling_relief(bundle.macro_change_pct, params),
    }
}
