use rust_decimal::Decimal;
use serde::Deserialize;

use crate::constants::*;

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SentinelConfig {
    pub app: AppConfig,
    pub scanner: ScannerConfig,
    pub strategy: StrategyConfig,
    pub exchange: ExchangeConfig,
    pub notifier: NotifierConfig,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    #[serde(default = "default_log_file_prefix")]
    pub file_prefix: String,
}

fn default_log_file_prefix() -> String {
    "sentinel.log".into()
}

// ---------------------------------------------------------------------------
// scanner.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    #[serde(with = "rust_decimal::serde::str")]
    pub min_quote_volume_usdt: Decimal,
    pub quote_asset: String,
    #[serde(default)]
    pub excluded_substrings: Vec<String>,
    /// Optional cap on the number of symbols scanned per cycle, highest volume first.
    #[serde(default)]
    pub max_symbols: Option<usize>,
    pub cooldown_minutes: u64,
    pub cycle_interval_seconds: u64,
    pub symbol_delay_ms: u64,
    pub reference_symbol: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_quote_volume_usdt: DEFAULT_MIN_QUOTE_VOLUME_USDT,
            quote_asset: "USDT".into(),
            excluded_substrings: vec!["USDC".into()],
            max_symbols: None,
            cooldown_minutes: DEFAULT_COOLDOWN_MINUTES,
            cycle_interval_seconds: DEFAULT_CYCLE_INTERVAL_SECONDS,
            symbol_delay_ms: DEFAULT_SYMBOL_DELAY_MS,
            reference_symbol: DEFAULT_REFERENCE_SYMBOL.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// strategy.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StrategyConfig {
    pub candles: CandleLimits,
    pub indicators: IndicatorParams,
    pub regime: RegimeParams,
    pub guards: GuardParams,
    pub levels: LevelParams,
}

/// How many candles to request per timeframe.
#[derive(Debug, Clone, Deserialize)]
pub struct CandleLimits {
    pub long: u32,
    pub mid: u32,
    pub short: u32,
}

impl Default for CandleLimits {
    fn default() -> Self {
        Self {
            long: 210,
            mid: 100,
            short: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndicatorParams {
    pub ema_long_period: usize,
    pub ema_mid_period: usize,
    pub rsi_period: usize,
    pub mfi_period: usize,
    pub adx_period: usize,
    pub atr_period: usize,
    pub volume_ma_period: usize,
    pub swing_lookback: usize,
}

impl IndicatorParams {
    /// Minimum candles on the long (4h) series.
    pub fn long_min_len(&self) -> usize {
        self.ema_long_period
    }

    /// Minimum candles on the mid (1h) series.
    pub fn mid_min_len(&self) -> usize {
        self.ema_mid_period
    }

    /// Minimum candles on the short (15m) series.
    ///
    /// ADX needs two full smoothing windows; the oscillators need one extra
    /// bar for the first price change; the volume guard needs a previous bar.
    pub fn short_min_len(&self) -> usize {
        [
            self.volume_ma_period,
            self.swing_lookback,
            self.rsi_period + 1,
            self.mfi_period + 1,
            self.atr_period + 1,
            self.adx_period * 2,
            2,
        ]
        .into_iter()
        .max()
        .unwrap_or(2)
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_long_period: DEFAULT_EMA_LONG_PERIOD,
            ema_mid_period: DEFAULT_EMA_MID_PERIOD,
            rsi_period: DEFAULT_OSCILLATOR_PERIOD,
            mfi_period: DEFAULT_OSCILLATOR_PERIOD,
            adx_period: DEFAULT_OSCILLATOR_PERIOD,
            atr_period: DEFAULT_OSCILLATOR_PERIOD,
            volume_ma_period: DEFAULT_VOLUME_MA_PERIOD,
            swing_lookback: DEFAULT_SWING_LOOKBACK,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegimeParams {
    #[serde(with = "rust_decimal::serde::str")]
    pub chop_below: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub super_trend_above: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub super_long_ceiling: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub super_short_floor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub normal_long_ceiling: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub normal_short_floor: Decimal,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            chop_below: DEFAULT_CHOP_BELOW,
            super_trend_above: DEFAULT_SUPER_TREND_ABOVE,
            super_long_ceiling: SUPER_TREND_LONG_CEILING,
            super_short_floor: SUPER_TREND_SHORT_FLOOR,
            normal_long_ceiling: NORMAL_TREND_LONG_CEILING,
            normal_short_floor: NORMAL_TREND_SHORT_FLOOR,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuardParams {
    /// Previous-candle volume must stay below `multiplier * volume MA`.
    #[serde(with = "rust_decimal::serde::str")]
    pub volume_shock_multiplier: Decimal,
    /// Open-interest change (percent) above which a candidate is vetoed.
    #[serde(with = "rust_decimal::serde::str")]
    pub oi_change_max_pct: Decimal,
    /// Reference asset 24h change (percent) below which longs get relief.
    #[serde(with = "rust_decimal::serde::str")]
    pub macro_drop_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub macro_ceiling_relief: Decimal,
    /// Money-flow band around the momentum threshold.
    #[serde(with = "rust_decimal::serde::str")]
    pub mfi_band: Decimal,
}

impl Default for GuardParams {
    fn default() -> Self {
        Self {
            volume_shock_multiplier: DEFAULT_VOLUME_SHOCK_MULTIPLIER,
            oi_change_max_pct: DEFAULT_OI_CHANGE_MAX_PCT,
            macro_drop_pct: DEFAULT_MACRO_DROP_PCT,
            macro_ceiling_relief: DEFAULT_MACRO_CEILING_RELIEF,
            mfi_band: DEFAULT_MFI_BAND,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelParams {
    #[serde(with = "rust_decimal::serde::str")]
    pub long_stop_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub short_stop_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub atr_target_multiplier: Decimal,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            long_stop_factor: DEFAULT_LONG_STOP_FACTOR,
            short_stop_factor: DEFAULT_SHORT_STOP_FACTOR,
            atr_target_multiplier: DEFAULT_ATR_TARGET_MULTIPLIER,
        }
    }
}

// ---------------------------------------------------------------------------
// exchange.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub category: String,
    pub request_timeout_seconds: u64,
    pub ticker_cache_ttl_seconds: u64,
    pub long_candle_cache_ttl_seconds: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: BYBIT_MAINNET_URL.into(),
            category: BYBIT_LINEAR_CATEGORY.into(),
            request_timeout_seconds: 10,
            ticker_cache_ttl_seconds: 30,
            long_candle_cache_ttl_seconds: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// notifier.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub api_base_url: String,
    pub parse_mode: String,
    /// Env var holding the bot token. Never stored in JSON.
    pub bot_token_env: String,
    pub chat_id_env: String,
    pub request_timeout_seconds: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: TELEGRAM_API_URL.into(),
            parse_mode: "Markdown".into(),
            bot_token_env: DEFAULT_TELEGRAM_TOKEN_ENV.into(),
            chat_id_env: DEFAULT_TELEGRAM_CHAT_ENV.into(),
            request_timeout_seconds: 10,
        }
    }
}
