use anyhow::{bail, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::types::SentinelConfig;

/// Validate invariants across the merged config that serde alone cannot enforce.
/// Called automatically by [`super::load_config`].
pub fn validate_config(config: &SentinelConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_scanner_config(config, &mut errors);
    validate_indicator_params(config, &mut errors);
    validate_regime_params(config, &mut errors);
    validate_guard_and_level_params(config, &mut errors);
    validate_endpoints(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// Scanner config
// ---------------------------------------------------------------------------

fn validate_scanner_config(config: &SentinelConfig, errors: &mut Vec<String>) {
    let sc = &config.scanner;

    if sc.min_quote_volume_usdt < Decimal::ZERO {
        errors.push(format!(
            "scanner: min_quote_volume_usdt ({}) must be >= 0",
            sc.min_quote_volume_usdt
        ));
    }
    if sc.quote_asset.is_empty() {
        errors.push("scanner: quote_asset is empty".into());
    }
    if sc.reference_symbol.is_empty() {
        errors.push("scanner: reference_symbol is empty".into());
    }
    if sc.cycle_interval_seconds == 0 {
        errors.push("scanner: cycle_interval_seconds must be > 0".into());
    }
    if sc.max_symbols == Some(0) {
        errors.push("scanner: max_symbols must be > 0 when set".into());
    }
}

// ---------------------------------------------------------------------------
// Strategy config
// ---------------------------------------------------------------------------

fn validate_indicator_params(config: &SentinelConfig, errors: &mut Vec<String>) {
    let ind = &config.strategy.indicators;
    let periods = [
        ("ema_long_period", ind.ema_long_period),
        ("ema_mid_period", ind.ema_mid_period),
        ("rsi_period", ind.rsi_period),
        ("mfi_period", ind.mfi_period),
        ("adx_period", ind.adx_period),
        ("atr_period", ind.atr_period),
        ("volume_ma_period", ind.volume_ma_period),
        ("swing_lookback", ind.swing_lookback),
    ];
    for (name, value) in periods {
        if value == 0 {
            errors.push(format!("strategy.indicators: {name} must be > 0"));
        }
    }

    // Requested candles must cover the indicator warm-up. Trend series lose
    // their forming bar before the EMAs run.
    let candles = &config.strategy.candles;
    let coverage = [
        ("long", candles.long as usize, ind.long_min_len() + 1),
        ("mid", candles.mid as usize, ind.mid_min_len() + 1),
        ("short", candles.short as usize, ind.short_min_len()),
    ];
    for (name, limit, need) in coverage {
        if limit < need {
            errors.push(format!(
                "strategy.candles: {name} limit ({limit}) must be >= {need} for the configured periods"
            ));
        }
    }
    if candles.long > 1000 || candles.mid > 1000 || candles.short > 1000 {
        errors.push("strategy.candles: Bybit returns at most 1000 klines per request".into());
    }
}

fn validate_regime_params(config: &SentinelConfig, errors: &mut Vec<String>) {
    let rg = &config.strategy.regime;

    if rg.chop_below > rg.super_trend_above {
        errors.push(format!(
            "strategy.regime: chop_below ({}) must be <= super_trend_above ({})",
            rg.chop_below, rg.super_trend_above
        ));
    }

    let bounded = [
        ("chop_below", rg.chop_below),
        ("super_trend_above", rg.super_trend_above),
        ("super_long_ceiling", rg.super_long_ceiling),
        ("super_short_floor", rg.super_short_floor),
        ("normal_long_ceiling", rg.normal_long_ceiling),
        ("normal_short_floor", rg.normal_short_floor),
    ];
    for (name, value) in bounded {
        if value < Decimal::ZERO || value > dec!(100) {
            errors.push(format!("strategy.regime: {name} ({value}) must be in [0, 100]"));
        }
    }

    // Strong trends allow shallower pullbacks.
    if rg.super_long_ceiling < rg.normal_long_ceiling {
        errors.push(format!(
            "strategy.regime: super_long_ceiling ({}) must be >= normal_long_ceiling ({})",
            rg.super_long_ceiling, rg.normal_long_ceiling
        ));
    }
    if rg.super_short_floor > rg.normal_short_floor {
        errors.push(format!(
            "strategy.regime: super_short_floor ({}) must be <= normal_short_floor ({})",
            rg.super_short_floor, rg.normal_short_floor
        ));
    }
}

fn validate_guard_and_level_params(config: &SentinelConfig, errors: &mut Vec<String>) {
    let g = &config.strategy.guards;
    let lv = &config.strategy.levels;

    if g.volume_shock_multiplier <= Decimal::ZERO {
        errors.push(format!(
            "strategy.guards: volume_shock_multiplier ({}) must be > 0",
            g.volume_shock_multiplier
        ));
    }
    if g.macro_drop_pct >= Decimal::ZERO {
        errors.push(format!(
            "strategy.guards: macro_drop_pct ({}) must be negative",
            g.macro_drop_pct
        ));
    }
    if g.macro_ceiling_relief < Decimal::ZERO || g.mfi_band < Decimal::ZERO {
        errors.push("strategy.guards: macro_ceiling_relief and mfi_band must be >= 0".into());
    }

    if lv.long_stop_factor <= Decimal::ZERO || lv.long_stop_factor >= dec!(1) {
        errors.push(format!(
            "strategy.levels: long_stop_factor ({}) must be in (0, 1)",
            lv.long_stop_factor
        ));
    }
    if lv.short_stop_factor <= dec!(1) {
        errors.push(format!(
            "strategy.levels: short_stop_factor ({}) must be > 1",
            lv.short_stop_factor
        ));
    }
    if lv.atr_target_multiplier <= Decimal::ZERO {
        errors.push(format!(
            "strategy.levels: atr_target_multiplier ({}) must be > 0",
            lv.atr_target_multiplier
        ));
    }
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

fn validate_endpoints(config: &SentinelConfig, errors: &mut Vec<String>) {
    if let Err(e) = validate_http_url(&config.exchange.base_url) {
        errors.push(format!("exchange.base_url: {e}"));
    }
    if config.exchange.category.is_empty() {
        errors.push("exchange.category is empty".into());
    }
    if config.exchange.request_timeout_seconds == 0 {
        errors.push("exchange.request_timeout_seconds must be > 0".into());
    }

    let tg = &config.notifier.telegram;
    if let Err(e) = validate_http_url(&tg.api_base_url) {
        errors.push(format!("notifier.telegram.api_base_url: {e}"));
    }
    if tg.bot_token_env.is_empty() || tg.chat_id_env.is_empty() {
        errors.push("notifier.telegram: bot_token_env and chat_id_env must name env vars".into());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate an endpoint base URL: non-empty, http(s) scheme, no trailing slash.
fn validate_http_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("url is empty".into());
    }
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(format!("url '{url}' must start with http:// or https://"));
    }
    if url.ends_with('/') {
        return Err(format!("url '{url}' must not end with '/'"));
    }
    Ok(())
}
