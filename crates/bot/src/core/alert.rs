//! Operator-facing message text: signal alerts and lifecycle notices.
//!
//! Output is Telegram Markdown (legacy mode): `*bold*` and `` `code` `` only.

use rust_decimal::Decimal;

use crate::config::ScannerConfig;
use crate::constants::ONE_MILLION;
use crate::types::{Direction, Regime, SignalVerdict};

/// Render a verdict as a multi-line alert.
pub fn format_signal_alert(verdict: &SignalVerdict) -> String {
    let r = &verdict.rationale;
    let (icon, rsi_cmp, mfi_cmp) = match verdict.direction {
        Direction::Long => ("🟢", "<", "<"),
        Direction::Short => ("🔴", ">", ">"),
    };

    let mut lines = vec![
        format!("{icon} *{} SIGNAL* | `{}`", verdict.direction, verdict.symbol),
        String::new(),
        format!("📊 Regime: *{}* (ADX {})", r.regime, fixed(r.adx, 2)),
        format!("💵 Entry: `{}`", format_price(verdict.entry_price)),
        format!("🛑 Stop: `{}`", format_price(verdict.stop_loss)),
        format!("🎯 Target: `{}`", format_price(verdict.take_profit)),
        String::new(),
        format!("RSI: {} ({rsi_cmp} {})", fixed(r.rsi, 2), r.rsi_threshold.normalize()),
        format!("MFI: {} ({mfi_cmp} {})", fixed(r.mfi, 2), r.mfi_threshold.normalize()),
        format!(
            "OI: {} {} {}%",
            format_millions(r.open_interest_value),
            oi_arrow(r.oi_change_pct),
            fixed(r.oi_change_pct.abs(), 2)
        ),
    ];

    if verdict.direction == Direction::Long && r.guards.macro_relief > Decimal::ZERO {
        lines.push(format!(
            "🌍 Macro: reference 24h {}%, ceiling +{}",
            fixed(r.macro_change_pct, 2),
            r.guards.macro_relief.normalize()
        ));
    }

    lines.push(String::new());
    lines.push(format!("💡 {}", reason(verdict)));
    lines.join("\n")
}

/// One-sentence explanation of why the alert fired.
pub fn reason(verdict: &SignalVerdict) -> String {
    let r = &verdict.rationale;
    let strength = match r.regime {
        Regime::SuperTrend => "strong trend",
        _ => "trend",
    };
    match verdict.direction {
        Direction::Long => format!(
            "Price above both trend EMAs; RSI pulled back below {} in a {strength} with calm volume and no open-interest build-up.",
            r.rsi_threshold.normalize()
        ),
        Direction::Short => format!(
            "Price below both trend EMAs; RSI bounced above {} in a {strength} with calm volume and no open-interest build-up.",
            r.rsi_threshold.normalize()
        ),
    }
}

// ---------------------------------------------------------------------------
// Lifecycle notices
// ---------------------------------------------------------------------------

pub fn startup_notice(scanner: &ScannerConfig) -> String {
    format!(
        "🚀 *Trend sentinel online*\nMin 24h volume: {} {}\nCooldown: {} min | Cycle: {} s",
        format_millions(scanner.min_quote_volume_usdt),
        scanner.quote_asset,
        scanner.cooldown_minutes,
        scanner.cycle_interval_seconds
    )
}

pub fn shutdown_notice() -> String {
    "🛑 *Trend sentinel stopped* (shutdown requested)".to_string()
}

pub fn fatal_notice(reason: &str) -> String {
    format!("⚠️ *Trend sentinel stopped on error*\n`{}`", sanitize_code(reason))
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Four decimals for prices, matching exchange tick sizes on most perps.
fn format_price(price: Decimal) -> String {
    fixed(price, 4)
}

/// Round then pad to exactly `dp` decimals.
fn fixed(value: Decimal, dp: u32) -> String {
    format!("{:.*}", dp as usize, value.round_dp(dp))
}

/// `$12.35M` style quote amount.
fn format_millions(value: Decimal) -> String {
    format!("${}M", fixed(value / ONE_MILLION, 2))
}

fn oi_arrow(change_pct: Decimal) -> &'static str {
    if change_pct > Decimal::ZERO {
        "▲"
    } else if change_pct < Decimal::ZERO {
        "▼"
    } else {
        "▬"
    }
}

/// Backticks would terminate the inline code span.
fn sanitize_code(text: &str) -> String {
    text.replace('`', "'")
}
