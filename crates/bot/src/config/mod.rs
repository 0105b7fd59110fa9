pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Load and merge all config JSON files into a single [`SentinelConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   scanner.json
///   strategy.json
///   exchange.json
///   notifier.json
/// ```
///
/// # Environment variable overrides
///
/// | Env Var                 | Config Field                       |
/// |-------------------------|------------------------------------|
/// | `MIN_VOLUME_USDT`       | `scanner.min_quote_volume_usdt`    |
/// | `COOLDOWN_MINUTES`      | `scanner.cooldown_minutes`         |
/// | `SCAN_INTERVAL_SECONDS` | `scanner.cycle_interval_seconds`   |
/// | `SYMBOL_DELAY_MS`       | `scanner.symbol_delay_ms`          |
/// | `MAX_SYMBOLS`           | `scanner.max_symbols`              |
/// | `BYBIT_BASE_URL`        | `exchange.base_url`                |
///
/// Telegram credentials are read later by the notifier from the env vars
/// named in `notifier.json`.
pub fn load_config(config_dir: &Path) -> Result<SentinelConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    let scanner: ScannerConfig =
        serde_json::from_str(&read("scanner.json")?).context("parsing scanner.json")?;

    let strategy: StrategyConfig =
        serde_json::from_str(&read("strategy.json")?).context("parsing strategy.json")?;

    let exchange: ExchangeConfig =
        serde_json::from_str(&read("exchange.json")?).context("parsing exchange.json")?;

    let notifier: NotifierConfig =
        serde_json::from_str(&read("notifier.json")?).context("parsing notifier.json")?;

    let mut config = SentinelConfig {
        app,
        scanner,
        strategy,
        exchange,
        notifier,
    };

    apply_env_overrides(&mut config);
    validate::validate_config(&config)?;

    Ok(config)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Only non-empty env vars take effect. Parse failures are skipped and the
/// JSON value remains.
fn apply_env_overrides(config: &mut SentinelConfig) {
    // -- Scanner -------------------------------------------------------------
    if let Some(val) = env_decimal("MIN_VOLUME_USDT") {
        info!(%val, "env override: MIN_VOLUME_USDT");
        config.scanner.min_quote_volume_usdt = val;
    }

    if let Some(val) = env_parse::<u64>("COOLDOWN_MINUTES") {
        info!(val, "env override: COOLDOWN_MINUTES");
        config.scanner.cooldown_minutes = val;
    }

    if let Some(val) = env_parse::<u64>("SCAN_INTERVAL_SECONDS") {
        info!(val, "env override: SCAN_INTERVAL_SECONDS");
        config.scanner.cycle_interval_seconds = val;
    }

    if let Some(val) = env_parse::<u64>("SYMBOL_DELAY_MS") {
        info!(val, "env override: SYMBOL_DELAY_MS");
        config.scanner.symbol_delay_ms = val;
    }

    if let Some(val) = env_parse::<usize>("MAX_SYMBOLS") {
        info!(val, "env override: MAX_SYMBOLS");
        config.scanner.max_symbols = Some(val);
    }

    // -- Exchange ------------------------------------------------------------
    if let Some(val) = env_string("BYBIT_BASE_URL") {
        info!(url = %val, "env override: BYBIT_BASE_URL");
        config.exchange.base_url = val;
    }
}

/// Read a non-empty env var as a `String`.
pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Read a non-empty env var and parse it as `T`.
fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

/// Read a non-empty env var and parse it as `Decimal`.
fn env_decimal(key: &str) -> Option<Decimal> {
    env_string(key).and_then(|v| Decimal::from_str(&v).ok())
}
