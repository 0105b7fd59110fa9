use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Indicator periods
// ---------------------------------------------------------------------------

pub const DEFAULT_EMA_LONG_PERIOD: usize = 200;
pub const DEFAULT_EMA_MID_PERIOD: usize = 50;
pub const DEFAULT_OSCILLATOR_PERIOD: usize = 14;
pub const DEFAULT_VOLUME_MA_PERIOD: usize = 20;
pub const DEFAULT_SWING_LOOKBACK: usize = 10;

// ---------------------------------------------------------------------------
// Regime classification (ADX)
// ---------------------------------------------------------------------------

/// ADX strictly below this is a choppy market: no signals.
pub const DEFAULT_CHOP_BELOW: Decimal = dec!(25);

/// ADX strictly above this is a super trend.
pub const DEFAULT_SUPER_TREND_ABOVE: Decimal = dec!(40);

pub const SUPER_TREND_LONG_CEILING: Decimal = dec!(50);
pub const SUPER_TREND_SHORT_FLOOR: Decimal = dec!(50);
pub const NORMAL_TREND_LONG_CEILING: Decimal = dec!(35);
pub const NORMAL_TREND_SHORT_FLOOR: Decimal = dec!(65);

// ---------------------------------------------------------------------------
// Confirmation guards
// ---------------------------------------------------------------------------

pub const DEFAULT_VOLUME_SHOCK_MULTIPLIER: Decimal = dec!(2.0);
pub const DEFAULT_OI_CHANGE_MAX_PCT: Decimal = dec!(1.5);
pub const DEFAULT_MACRO_DROP_PCT: Decimal = dec!(-3.0);
pub const DEFAULT_MACRO_CEILING_RELIEF: Decimal = dec!(5);
pub const DEFAULT_MFI_BAND: Decimal = dec!(15);

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

pub const DEFAULT_LONG_STOP_FACTOR: Decimal = dec!(0.995);
pub const DEFAULT_SHORT_STOP_FACTOR: Decimal = dec!(1.005);
pub const DEFAULT_ATR_TARGET_MULTIPLIER: Decimal = dec!(3.5);

// ---------------------------------------------------------------------------
// Scanner defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_MIN_QUOTE_VOLUME_USDT: Decimal = dec!(500_000);
pub const DEFAULT_COOLDOWN_MINUTES: u64 = 60;
pub const DEFAULT_CYCLE_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_SYMBOL_DELAY_MS: u64 = 1_000;
pub const DEFAULT_REFERENCE_SYMBOL: &str = "BTCUSDT";

// ---------------------------------------------------------------------------
// Exchange
// ---------------------------------------------------------------------------

pub const BYBIT_MAINNET_URL: &str = "https://api.bybit.com";
pub const BYBIT_LINEAR_CATEGORY: &str = "linear";

/// Bybit reports `price24hPcnt` as a fraction (0.0123 = 1.23%).
pub const PERCENT: Decimal = dec!(100);

/// Open interest is shown to the operator in millions of quote currency.
pub const ONE_MILLION: Decimal = dec!(1_000_000);

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const DEFAULT_TELEGRAM_CHAT_ENV: &str = "TELEGRAM_CHAT_ID";
