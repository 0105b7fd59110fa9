//! Pure computation module for the technical indicators behind the trend filter.
//!
//! No I/O, no side effects. Takes price / volume slices (oldest first) and
//! returns indicator values at the latest bar. All computations use `Decimal`.
//!
//! Indicators implemented:
//! - Trend: EMA (SMA-seeded), SMA
//! - Momentum: RSI (Wilder's smoothing), MFI
//! - Trend strength: ADX (Wilder's DMI)
//! - Volatility: ATR (Wilder's smoothing)
//! - Structure: swing low / swing high over a lookback window
//!
//! References:
//!     Wilder (1978), "New Concepts in Technical Trading Systems".
//!     Quong & Soudack (1989), "Volume-Weighted RSI: Money Flow".

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ═══════════════════════════════════════════════════════════════════════════
// Moving averages
// ═══════════════════════════════════════════════════════════════════════════

/// Exponential Moving Average.
///
/// Multiplier `k = 2 / (period + 1)`. First value seeded with SMA of the
/// first `period` prices. Returns empty `Vec` if insufficient data.
pub fn ema(prices: &[Decimal], period: usize) -> Vec<Decimal> {
    if prices.len() < period || period == 0 {
        return Vec::new();
    }

    let k = dec!(2) / Decimal::from(period as u64 + 1);
    let one_minus_k = dec!(1) - k;

    let seed: Decimal =
        prices[..period].iter().copied().sum::<Decimal>() / Decimal::from(period as u64);

    let mut result = Vec::with_capacity(prices.len() - period + 1);
    let mut prev = seed;
    result.push(seed);

    for &price in &prices[period..] {
        prev = price * k + prev * one_minus_k;
        result.push(prev);
    }

    result
}

/// EMA evaluated at the latest bar.
pub fn ema_last(prices: &[Decimal], period: usize) -> Option<Decimal> {
    ema(prices, period).last().copied()
}

/// Simple mean of the trailing `period` values.
pub fn sma(values: &[Decimal], period: usize) -> Option<Decimal> {
    if values.len() < period || period == 0 {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().copied().sum::<Decimal>() / Decimal::from(period as u64))
}

// ═══════════════════════════════════════════════════════════════════════════
// Oscillators
// ═══════════════════════════════════════════════════════════════════════════

/// Relative Strength Index (Wilder's smoothing).
///
/// Uses smoothing factor `1/period`. Returns 50 if insufficient data.
pub fn rsi(prices: &[Decimal], period: usize) -> Decimal {
    if prices.len() < period + 1 || period == 0 {
        return dec!(50);
    }

    let period_d = Decimal::from(period as u64);
    let period_minus_1 = Decimal::from(period as u64 - 1);

    let changes: Vec<Decimal> = prices.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = changes[..period]
        .iter()
        .map(|&c| c.max(Decimal::ZERO))
        .sum::<Decimal>()
        / period_d;

    let mut avg_loss = changes[..period]
        .iter()
        .map(|&c| (-c).max(Decimal::ZERO))
        .sum::<Decimal>()
        / period_d;

    for &c in &changes[period..] {
        let gain = c.max(Decimal::ZERO);
        let loss = (-c).max(Decimal::ZERO);
        avg_gain = (avg_gain * period_minus_1 + gain) / period_d;
        avg_loss = (avg_loss * period_minus_1 + loss) / period_d;
    }

    if avg_loss == Decimal::ZERO {
        return if avg_gain == Decimal::ZERO { dec!(50) } else { dec!(100) };
    }

    let rs = avg_gain / avg_loss;
    dec!(100) - (dec!(100) / (dec!(1) + rs))
}

/// Money Flow Index over the trailing `period` bars.
///
/// Typical price `(H + L + C) / 3`, raw flow `typical * volume`. A bar's flow
/// counts as positive when its typical price rose versus the previous bar and
/// negative when it fell. Returns 50 on insufficient or mismatched data and
/// when there was no flow in either direction.
pub fn mfi(
    highs: &[Decimal],
    lows: &[Decimal],
    closes: &[Decimal],
    volumes: &[Decimal],
    period: usize,
) -> Decimal {
    let n = closes.len();
    if period == 0
        || n < period + 1
        || highs.len() != n
        || lows.len() != n
        || volumes.len() != n
    {
        return dec!(50);
    }

    let typical: Vec<Decimal> = (0..n)
        .map(|i| (highs[i] + lows[i] + closes[i]) / dec!(3))
        .collect();

    let mut positive = Decimal::ZERO;
    let mut negative = Decimal::ZERO;
    for i in n - period..n {
        let flow = typical[i] * volumes[i];
        if typical[i] > typical[i - 1] {
            positive += flow;
        } else if typical[i] < typical[i - 1] {
            negative += flow;
        }
    }

    if negative == Decimal::ZERO {
        return if positive == Decimal::ZERO { dec!(50) } else { dec!(100) };
    }

    let ratio = positive / negative;
    dec!(100) - (dec!(100) / (dec!(1) + ratio))
}

// ═══════════════════════════════════════════════════════════════════════════
// Trend strength & volatility
// ═══════════════════════════════════════════════════════════════════════════

/// True range of bar `i` against the previous close.
fn true_range(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal], i: usize) -> Decimal {
    let hl = highs[i] - lows[i];
    let hc = (highs[i] - closes[i - 1]).abs();
    let lc = (lows[i] - closes[i - 1]).abs();
    hl.max(hc).max(lc)
}

/// Average True Range (Wilder's smoothing).
///
/// `TR = max(H-L, |H-prevC|, |L-prevC|)`. Returns `Decimal::ZERO` on
/// mismatched or insufficient data.
pub fn atr(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal], period: usize) -> Decimal {
    let n = highs.len();
    if n < period + 1 || lows.len() != n || closes.len() != n || period == 0 {
        return Decimal::ZERO;
    }

    let true_ranges: Vec<Decimal> = (1..n).map(|i| true_range(highs, lows, closes, i)).collect();

    let period_d = Decimal::from(period as u64);
    let period_m1 = Decimal::from(period as u64 - 1);

    let mut atr_val: Decimal = true_ranges[..period].iter().copied().sum::<Decimal>() / period_d;

    for &tr in &true_ranges[period..] {
        atr_val = (atr_val * period_m1 + tr) / period_d;
    }

    atr_val
}

/// Average Directional Index (Wilder).
///
/// 1. `+DM` / `-DM` from consecutive highs and lows; only the larger positive
///    move counts.
/// 2. TR, `+DM`, `-DM` Wilder-smoothed (running sum minus `sum / period`).
/// 3. `DX = 100 * |+DI - -DI| / (+DI + -DI)`.
/// 4. ADX = mean of the first `period` DX values, then Wilder-smoothed.
///
/// Needs `2 * period` bars. Returns `Decimal::ZERO` on mismatched or
/// insufficient data.
pub fn adx(highs: &[Decimal], lows: &[Decimal], closes: &[Decimal], period: usize) -> Decimal {
    let n = highs.len();
    if period == 0 || n < period * 2 || lows.len() != n || closes.len() != n {
        return Decimal::ZERO;
    }

    let mut tr = Vec::with_capacity(n - 1);
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    for i in 1..n {
        let up = highs[i] - highs[i - 1];
        let down = lows[i - 1] - lows[i];
        plus_dm.push(if up > down && up > Decimal::ZERO { up } else { Decimal::ZERO });
        minus_dm.push(if down > up && down > Decimal::ZERO { down } else { Decimal::ZERO });
        tr.push(true_range(highs, lows, closes, i));
    }

    let period_d = Decimal::from(period as u64);
    let period_m1 = Decimal::from(period as u64 - 1);

    let mut s_tr: Decimal = tr[..period].iter().copied().sum();
    let mut s_plus: Decimal = plus_dm[..period].iter().copied().sum();
    let mut s_minus: Decimal = minus_dm[..period].iter().copied().sum();

    let dx = |s_tr: Decimal, s_plus: Decimal, s_minus: Decimal| -> Decimal {
        if s_tr == Decimal::ZERO {
            return Decimal::ZERO;
        }
        let plus_di = dec!(100) * s_plus / s_tr;
        let minus_di = dec!(100) * s_minus / s_tr;
        let di_sum = plus_di + minus_di;
        if di_sum == Decimal::ZERO {
            Decimal::ZERO
        } else {
            dec!(100) * ((plus_di - minus_di).abs() / di_sum)
        }
    };

    let mut dx_values = Vec::with_capacity(tr.len() - period + 1);
    dx_values.push(dx(s_tr, s_plus, s_minus));

    for i in period..tr.len() {
        s_tr = s_tr - s_tr / period_d + tr[i];
        s_plus = s_plus - s_plus / period_d + plus_dm[i];
        s_minus = s_minus - s_minus / period_d + minus_dm[i];
        dx_values.push(dx(s_tr, s_plus, s_minus));
    }

    let mut adx_val: Decimal = dx_values[..period].iter().copied().sum::<Decimal>() / period_d;
    for &d in &dx_values[period..] {
        adx_val = (adx_val * period_m1 + d) / period_d;
    }

    adx_val
}

// ═══════════════════════════════════════════════════════════════════════════
// Structure
// ═══════════════════════════════════════════════════════════════════════════

/// Lowest low over the trailing `lookback` bars.
pub fn swing_low(lows: &[Decimal], lookback: usize) -> Option<Decimal> {
    if lookback == 0 || lows.len() < lookback {
        return None;
    }
    lows[lows.len() - lookback..].iter().copied().min()
}

/// Highest high over the trailing `lookback` bars.
pub fn swing_high(highs: &[Decimal], lookback: usize) -> Option<Decimal> {
    if lookback == 0 || highs.len() < lookback {
        return None;
    }
    highs[highs.len() - lookback..].iter().copied().max()
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════
