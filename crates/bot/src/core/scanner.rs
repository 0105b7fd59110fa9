//! Scan loop: repeated passes over the liquid universe with a fixed pause between them.
//!
//! Each cycle lists symbols by 24h turnover, reads the reference asset's 24h
//! change once, then evaluates symbols sequentially with a pacing delay:
//!
//! ```text
//! cooldown gate -> candles (4h/1h/15m) -> open interest -> feature bundle
//!               -> decide -> record cooldown -> notify
//! ```
//!
//! Per-symbol failures never leave the cycle. Only a panic or an error out of
//! [`Scanner::run`] stops the loop, and [`run_supervised`] turns that into a
//! fatal notice.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{ScannerConfig, StrategyConfig};
use crate::core::aggregator::{build_feature_bundle, OpenInterestContext};
use crate::core::alert;
use crate::core::clock::Clock;
use crate::core::cooldown::CooldownTracker;
use crate::core::decision::decide;
use crate::exchange::{MarketDataGateway, UniverseFilter};
use crate::notify::Notifier;
use crate::types::{TickerSummary, Timeframe};

/// Open-interest history points needed for a change percentage.
const OI_HISTORY_POINTS: u32 = 2;

/// Counters logged after every cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub symbols: usize,
    pub evaluated: usize,
    pub cooled_down: usize,
    pub skipped: usize,
    pub failed: usize,
    pub alerted: usize,
}

impl CycleReport {
    fn tally(&mut self, outcome: SymbolOutcome) {
        match outcome {
            SymbolOutcome::CooledDown => self.cooled_down += 1,
            SymbolOutcome::Skipped => self.skipped += 1,
            SymbolOutcome::Failed => self.failed += 1,
            SymbolOutcome::NoSignal => self.evaluated += 1,
            SymbolOutcome::Alerted => {
                self.evaluated += 1;
                self.alerted += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolOutcome {
    CooledDown,
    Skipped,
    Failed,
    NoSignal,
    Alerted,
}

pub struct Scanner {
    gateway: Arc<dyn MarketDataGateway>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    cooldowns: CooldownTracker,
    universe: UniverseFilter,
    scanner: ScannerConfig,
    strategy: StrategyConfig,
    shutdown: CancellationToken,
}

impl Scanner {
    pub fn new(
        gateway: Arc<dyn MarketDataGateway>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        scanner: ScannerConfig,
        strategy: StrategyConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            gateway,
            notifier,
            clock,
            cooldowns: CooldownTracker::from_minutes(scanner.cooldown_minutes),
            universe: UniverseFilter::from_config(&scanner),
            scanner,
            strategy,
            shutdown,
        }
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Run cycles until the shutdown token fires, bracketed by start and stop
    /// notices. Cycles are separated by a full `cycle_interval_seconds` pause
    /// after each pass. A cycle in progress finishes its current symbol first.
    pub async fn run(&mut self) -> Result<()> {
        let pause = Duration::from_secs(self.scanner.cycle_interval_seconds);

        info!(
            min_volume = %self.scanner.min_quote_volume_usdt,
            cooldown_min = self.scanner.cooldown_minutes,
            interval_s = self.scanner.cycle_interval_seconds,
            "scanner started"
        );
        self.notify(&alert::startup_notice(&self.scanner)).await;

        while !self.shutdown.is_cancelled() {
            let report = self.scan_cycle().await;
            info!(
                symbols = report.symbols,
                evaluated = report.evaluated,
                cooled_down = report.cooled_down,
                skipped = report.skipped,
                failed = report.failed,
                alerted = report.alerted,
                next_in_s = pause.as_secs(),
                "scan cycle complete"
            );

            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }
        info!("scanner shutting down");

        self.notify(&alert::shutdown_notice()).await;
        Ok(())
    }

    /// One pass over the universe.
    pub async fn scan_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        let symbols = match self.gateway.list_symbols_by_volume(&self.universe).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to list symbols, skipping cycle");
                return report;
            }
        };
        report.symbols = symbols.len();

        let macro_change_pct = self.macro_change_pct().await;
        let delay = Duration::from_millis(self.scanner.symbol_delay_ms);

        for (i, ticker) in symbols.iter().enumerate() {
            if self.shutdown.is_cancelled() {
                break;
            }

            let outcome = self.evaluate_symbol(ticker, macro_change_pct).await;
            report.tally(outcome);

            if i + 1 < symbols.len() && !delay.is_zero() {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }

        report
    }

    // -----------------------------------------------------------------------
    // Per-symbol pipeline
    // -----------------------------------------------------------------------

    async fn evaluate_symbol(
        &mut self,
        ticker: &TickerSummary,
        macro_change_pct: Decimal,
    ) -> SymbolOutcome {
        let symbol = ticker.symbol.as_str();

        if !self.cooldowns.should_evaluate(symbol, self.clock.now()) {
            return SymbolOutcome::CooledDown;
        }

        let limits = &self.strategy.candles;
        let (long, mid, short) = tokio::join!(
            self.gateway.get_candles(symbol, Timeframe::H4, limits.long),
            self.gateway.get_candles(symbol, Timeframe::H1, limits.mid),
            self.gateway.get_candles(symbol, Timeframe::M15, limits.short),
        );
        let (long, mid, short) = match (long, mid, short) {
            (Ok(l), Ok(m), Ok(s)) => (l, m, s),
            (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
                debug!(symbol, error = %e, "candles unavailable, skipping");
                return SymbolOutcome::Skipped;
            }
        };

        let open_interest = self.open_interest(symbol).await;

        let bundle = match build_feature_bundle(
            symbol,
            &long,
            &mid,
            &short,
            &open_interest,
            macro_change_pct,
            &self.strategy.indicators,
            self.clock.now().timestamp(),
        ) {
            Ok(b) => b,
            Err(e) if e.is_data_gap() => {
                debug!(symbol, error = %e, "insufficient data, skipping");
                return SymbolOutcome::Skipped;
            }
            Err(e) => {
                warn!(symbol, error = %e, "feature computation failed");
                return SymbolOutcome::Failed;
            }
        };

        let Some(verdict) = decide(&bundle, &self.strategy) else {
            debug!(symbol, adx = %bundle.adx, rsi = %bundle.rsi, "no signal");
            return SymbolOutcome::NoSignal;
        };

        info!(
            symbol,
            direction = %verdict.direction,
            regime = %verdict.rationale.regime,
            entry = %verdict.entry_price,
            stop = %verdict.stop_loss,
            target = %verdict.take_profit,
            "signal"
        );

        self.cooldowns.record(symbol, self.clock.now());
        self.notify(&alert::format_signal_alert(&verdict)).await;
        SymbolOutcome::Alerted
    }

    /// Current open interest and its latest 15m change; zeros when unavailable.
    async fn open_interest(&self, symbol: &str) -> OpenInterestContext {
        let (current, history) = tokio::join!(
            self.gateway.get_open_interest(symbol),
            self.gateway
                .get_open_interest_history(symbol, Timeframe::M15, OI_HISTORY_POINTS),
        );

        let current = match current {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!(symbol, error = %e, "open interest unavailable");
                None
            }
        };
        let history = history.unwrap_or_else(|e| {
            debug!(symbol, error = %e, "open interest history unavailable");
            Vec::new()
        });

        OpenInterestContext::from_parts(current.as_ref(), &history)
    }

    /// Reference asset 24h change in percent; zero when unavailable.
    async fn macro_change_pct(&self) -> Decimal {
        match self.gateway.get_ticker(&self.scanner.reference_symbol).await {
            Ok(t) => t.price_change_24h_pct,
            Err(e) => {
                debug!(
                    symbol = %self.scanner.reference_symbol,
                    error = %e,
                    "reference ticker unavailable, macro context neutral"
                );
                Decimal::ZERO
            }
        }
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.notifier.send(text).await {
            warn!(error = %e, "notification delivery failed");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Supervision
// ═══════════════════════════════════════════════════════════════════════════

/// Run the scanner on its own task. If it returns an error or panics, send a
/// best-effort fatal notice and return an error so the process exits non-zero.
pub async fn run_supervised(mut scanner: Scanner, notifier: Arc<dyn Notifier>) -> Result<()> {
    let handle = tokio::spawn(async move { scanner.run().await });

    let reason = match handle.await {
        Ok(Ok(())) => return Ok(()),
        Ok(Err(e)) => format!("{e:#}"),
        Err(join_err) if join_err.is_panic() => {
            let payload = join_err.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "scan loop panicked".to_string())
        }
        Err(join_err) => join_err.to_string(),
    };

    error!(reason = %reason, "scan loop terminated unexpectedly");
    if let Err(e) = notifier.send(&alert::fatal_notice(&reason)).await {
        warn!(error = %e, "fatal notice delivery failed");
    }
    bail!("scan loop terminated: {reason}")
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    use crate::core::clock::ManualClock;
    use crate::errors::SentinelError;
    use crate::types::{CandleSeries, OpenInterestSnapshot, OHLCV};

    // -----------------------------------------------------------------------
    // Fakes
    // -----------------------------------------------------------------------

    fn flat(tf: Timeframe, n: usize, close: Decimal) -> CandleSeries {
        let step = tf.duration_secs() as i64;
        let candles = (0..n as i64)
            .map(|i| OHLCV {
                timestamp: i * step,
                open: close,
                high: close,
                low: close,
                close,
                volume: dec!(1000),
            })
            .collect();
        CandleSeries::new(tf, candles).unwrap()
    }

    /// Steady 15m pullback from 129.25 to 100 above flat EMAs at 10:
    /// ADX 100, RSI 0, MFI 0, ATR 2, swing low 99.
    fn pullback_15m() -> CandleSeries {
        let candles = (0..40i64)
            .map(|i| {
                let close = dec!(100) + dec!(0.75) * Decimal::from(39 - i);
                OHLCV {
                    timestamp: i * 900,
                    open: close,
                    high: close + dec!(1),
                    low: close - dec!(1),
                    close,
                    volume: dec!(1000),
                }
            })
            .collect();
        CandleSeries::new(Timeframe::M15, candles).unwrap()
    }

    /// 15m grind lower with periodic bounces and closes off the bar midpoint:
    /// ADX ~34 (normal trend), RSI ~35.4, MFI ~29, price 115.5.
    fn normal_trend_15m() -> CandleSeries {
        let moves = [dec!(-1), dec!(-1), dec!(-1), dec!(1.5)];
        let offsets = [dec!(-0.5), dec!(0.75), dec!(0.25)];
        let mut mid = dec!(130);
        let candles = (0..40i64)
            .map(|i| {
                if i > 0 {
                    mid += moves[(i % 4) as usize];
                }
                let close = mid + offsets[(i % 3) as usize];
                OHLCV {
                    timestamp: i * 900,
                    open: close,
                    high: mid + dec!(1),
                    low: mid - dec!(1),
                    close,
                    volume: dec!(1000),
                }
            })
            .collect();
        CandleSeries::new(Timeframe::M15, candles).unwrap()
    }

    fn start_time() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn ticker(symbol: &str, volume: Decimal) -> TickerSummary {
        TickerSummary {
            symbol: symbol.into(),
            last_price: dec!(100),
            price_change_24h_pct: Decimal::ZERO,
            quote_volume_24h: volume,
            open_interest: Decimal::ZERO,
            open_interest_value: Decimal::ZERO,
        }
    }

    #[derive(Default)]
    struct FakeGateway {
        tickers: Vec<TickerSummary>,
        reference: Option<TickerSummary>,
        short_series: Option<CandleSeries>,
        /// Still-forming 4h bar `(open time, close)` appended to the history.
        forming_h4: Option<(i64, Decimal)>,
        failing_candles: HashSet<String>,
        fail_listing: bool,
        panic_on_listing: bool,
        candle_calls: AtomicUsize,
        listing_times: Mutex<Vec<tokio::time::Instant>>,
    }

    impl FakeGateway {
        fn with_symbols(symbols: &[&str]) -> Self {
            Self {
                tickers: symbols.iter().map(|s| ticker(s, dec!(1000000000))).collect(),
                ..Self::default()
            }
        }

        fn candle_calls(&self) -> usize {
            self.candle_calls.load(Ordering::SeqCst)
        }

        fn listing_times(&self) -> Vec<tokio::time::Instant> {
            self.listing_times.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MarketDataGateway for FakeGateway {
        async fn list_symbols_by_volume(
            &self,
            filter: &UniverseFilter,
        ) -> Result<Vec<TickerSummary>, SentinelError> {
            self.listing_times
                .lock()
                .unwrap()
                .push(tokio::time::Instant::now());
            if self.panic_on_listing {
                panic!("exchange client corrupted");
            }
            if self.fail_listing {
                return Err(SentinelError::DataUnavailable {
                    name: "tickers".into(),
                });
            }
            Ok(filter.select(self.tickers.clone()))
        }

        async fn get_ticker(&self, symbol: &str) -> Result<TickerSummary, SentinelError> {
            self.reference
                .clone()
                .filter(|t| t.symbol == symbol)
                .ok_or_else(|| SentinelError::DataUnavailable {
                    name: format!("ticker {symbol}"),
                })
        }

        async fn get_candles(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            _limit: u32,
        ) -> Result<CandleSeries, SentinelError> {
            self.candle_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing_candles.contains(symbol) {
                return Err(SentinelError::Exchange {
                    code: 10001,
                    message: "symbol invalid".into(),
                });
            }
            Ok(match timeframe {
                Timeframe::H4 => match self.forming_h4 {
                    Some((open_time, close)) => {
                        let mut candles = flat(Timeframe::H4, 209, dec!(10)).candles().to_vec();
                        candles.push(OHLCV {
                            timestamp: open_time,
                            open: dec!(10),
                            high: close,
                            low: dec!(10),
                            close,
                            volume: dec!(1000),
                        });
                        CandleSeries::new(Timeframe::H4, candles)?
                    }
                    None => flat(Timeframe::H4, 210, dec!(10)),
                },
                Timeframe::H1 => flat(Timeframe::H1, 100, dec!(10)),
                Timeframe::M15 => self.short_series.clone().unwrap_or_else(pullback_15m),
            })
        }

        async fn get_open_interest(
            &self,
            _symbol: &str,
        ) -> Result<OpenInterestSnapshot, SentinelError> {
            Ok(OpenInterestSnapshot::default())
        }

        async fn get_open_interest_history(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
            _limit: u32,
        ) -> Result<Vec<OpenInterestSnapshot>, SentinelError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> Result<(), SentinelError> {
            self.messages.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(SentinelError::Delivery {
                    reason: "telegram returned 502 Bad Gateway".into(),
                });
            }
            Ok(())
        }
    }

    struct Harness {
        scanner: Scanner,
        gateway: Arc<FakeGateway>,
        notifier: Arc<RecordingNotifier>,
        clock: Arc<ManualClock>,
        shutdown: CancellationToken,
    }

    fn harness(gateway: FakeGateway, notifier: RecordingNotifier) -> Harness {
        harness_with(gateway, notifier, ScannerConfig::default())
    }

    fn harness_with(
        gateway: FakeGateway,
        notifier: RecordingNotifier,
        scanner_config: ScannerConfig,
    ) -> Harness {
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(notifier);
        let clock = Arc::new(ManualClock::new(start_time()));
        let shutdown = CancellationToken::new();
        let scanner = Scanner::new(
            gateway.clone(),
            notifier.clone(),
            clock.clone(),
            scanner_config,
            StrategyConfig::default(),
            shutdown.clone(),
        );
        Harness {
            scanner,
            gateway,
            notifier,
            clock,
            shutdown,
        }
    }

    // -----------------------------------------------------------------------
    // Cycle behaviour
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_alert_then_cooldown_suppresses_next_cycle() {
        let mut h = harness(
            FakeGateway::with_symbols(&["ETHUSDT"]),
            RecordingNotifier::default(),
        );

        let first = h.scanner.scan_cycle().await;
        assert_eq!(first.symbols, 1);
        assert_eq!(first.alerted, 1);
        assert_eq!(h.gateway.candle_calls(), 3);

        let messages = h.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("*LONG SIGNAL* | `ETHUSDT`"));
        assert!(messages[0].contains("Stop: `98.5050`"));
        assert!(messages[0].contains("Target: `107.0000`"));

        let second = h.scanner.scan_cycle().await;
        assert_eq!(second.cooled_down, 1);
        assert_eq!(second.evaluated, 0);
        // Cooldown gate runs before any fetch.
        assert_eq!(h.gateway.candle_calls(), 3);
        assert_eq!(h.notifier.messages().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_symbol_reevaluated_after_window() {
        let mut h = harness(
            FakeGateway::with_symbols(&["ETHUSDT"]),
            RecordingNotifier::default(),
        );

        h.scanner.scan_cycle().await;
        h.clock.advance(chrono::Duration::minutes(59));
        assert_eq!(h.scanner.scan_cycle().await.cooled_down, 1);

        h.clock.advance(chrono::Duration::minutes(2));
        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.alerted, 1);
        assert_eq!(h.gateway.candle_calls(), 6);
        assert_eq!(h.notifier.messages().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_failure_still_records_cooldown() {
        let mut h = harness(
            FakeGateway::with_symbols(&["SOLUSDT"]),
            RecordingNotifier::failing(),
        );

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.alerted, 1);
        assert!(h.scanner.cooldowns().last_alert("SOLUSDT").is_some());
        assert_eq!(h.scanner.scan_cycle().await.cooled_down, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_candle_failure_skips_only_that_symbol() {
        let mut gateway = FakeGateway::with_symbols(&["BADUSDT", "ETHUSDT"]);
        gateway.failing_candles.insert("BADUSDT".into());
        let mut h = harness(gateway, RecordingNotifier::default());

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.symbols, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.alerted, 1);
        assert!(h.scanner.cooldowns().last_alert("BADUSDT").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_listing_failure_yields_empty_report() {
        let gateway = FakeGateway {
            fail_listing: true,
            ..FakeGateway::with_symbols(&["ETHUSDT"])
        };
        let mut h = harness(gateway, RecordingNotifier::default());

        assert_eq!(h.scanner.scan_cycle().await, CycleReport::default());
        assert_eq!(h.gateway.candle_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_illiquid_symbols_not_evaluated() {
        let mut gateway = FakeGateway::with_symbols(&["ETHUSDT"]);
        gateway.tickers.push(ticker("DUSTUSDT", dec!(1000)));
        let mut h = harness(gateway, RecordingNotifier::default());

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.symbols, 1);
        assert!(h.scanner.cooldowns().last_alert("DUSTUSDT").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_forming_long_bar_does_not_move_trend_filter() {
        // A forming 4h close of 10_000 would drag the 200 EMA above price.
        let gateway = FakeGateway {
            forming_h4: Some((start_time().timestamp() - 100, dec!(10000))),
            ..FakeGateway::with_symbols(&["ETHUSDT"])
        };
        let mut h = harness(gateway, RecordingNotifier::default());

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.skipped, 0);
        assert_eq!(report.alerted, 1);
    }

    // -----------------------------------------------------------------------
    // Macro context
    // -----------------------------------------------------------------------

    fn reference(change_pct: Decimal) -> TickerSummary {
        TickerSummary {
            price_change_24h_pct: change_pct,
            ..ticker("BTCUSDT", dec!(5000000000))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reference_selloff_lifts_normal_trend_ceiling() {
        let gateway = FakeGateway {
            reference: Some(reference(dec!(-4))),
            short_series: Some(normal_trend_15m()),
            ..FakeGateway::with_symbols(&["ETHUSDT"])
        };
        let mut h = harness(gateway, RecordingNotifier::default());

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.alerted, 1);

        let messages = h.notifier.messages();
        assert!(messages[0].contains("Regime: *NORMAL TREND*"), "got:\n{}", messages[0]);
        assert!(messages[0].contains("(< 40)"), "got:\n{}", messages[0]);
        assert!(messages[0].contains("reference 24h -4.00%, ceiling +5"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_calm_reference_keeps_normal_trend_ceiling() {
        let gateway = FakeGateway {
            reference: Some(reference(dec!(-1))),
            short_series: Some(normal_trend_15m()),
            ..FakeGateway::with_symbols(&["ETHUSDT"])
        };
        let mut h = harness(gateway, RecordingNotifier::default());

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.evaluated, 1);
        assert_eq!(report.alerted, 0);
        assert!(h.notifier.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_cycle_stops_before_next_symbol() {
        let mut h = harness(
            FakeGateway::with_symbols(&["ETHUSDT", "SOLUSDT"]),
            RecordingNotifier::default(),
        );
        h.shutdown.cancel();

        let report = h.scanner.scan_cycle().await;
        assert_eq!(report.symbols, 2);
        assert_eq!(report.evaluated, 0);
        assert_eq!(h.gateway.candle_calls(), 0);
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_run_sends_start_and_stop_notices() {
        let h = harness(
            FakeGateway::with_symbols(&["ETHUSDT"]),
            RecordingNotifier::default(),
        );
        let mut scanner = h.scanner;
        let handle = tokio::spawn(async move { scanner.run().await });

        tokio::time::sleep(Duration::from_secs(150)).await;
        h.shutdown.cancel();
        handle.await.unwrap().unwrap();

        let messages = h.notifier.messages();
        assert!(messages.first().unwrap().contains("Trend sentinel online"));
        assert_eq!(messages.last().unwrap(), &alert::shutdown_notice());
        // One alert; later cycles are inside the cooldown window.
        let alerts = messages.iter().filter(|m| m.contains("SIGNAL")).count();
        assert_eq!(alerts, 1);
        assert!(h.gateway.candle_calls() >= 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_separated_by_full_pause() {
        let config = ScannerConfig {
            symbol_delay_ms: 40_000,
            cycle_interval_seconds: 60,
            ..ScannerConfig::default()
        };
        let h = harness_with(
            FakeGateway::with_symbols(&["ETHUSDT", "SOLUSDT", "XRPUSDT"]),
            RecordingNotifier::default(),
            config,
        );
        let mut scanner = h.scanner;
        let handle = tokio::spawn(async move { scanner.run().await });

        tokio::time::sleep(Duration::from_secs(300)).await;
        h.shutdown.cancel();
        handle.await.unwrap().unwrap();

        // Each pass paces 3 symbols (80s), then pauses 60s.
        let starts = h.gateway.listing_times();
        assert!(starts.len() >= 2, "cycles started: {}", starts.len());
        for pair in starts.windows(2) {
            assert!(
                pair[1] - pair[0] >= Duration::from_secs(140),
                "gap {:?}",
                pair[1] - pair[0]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_sends_fatal_notice_on_panic() {
        let gateway = FakeGateway {
            panic_on_listing: true,
            ..FakeGateway::default()
        };
        let h = harness(gateway, RecordingNotifier::default());

        let result = run_supervised(h.scanner, h.notifier.clone()).await;
        assert!(result.is_err());

        let messages = h.notifier.messages();
        let last = messages.last().unwrap();
        assert!(last.contains("stopped on error"));
        assert!(last.contains("exchange client corrupted"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_clean_exit_sends_no_fatal_notice() {
        let h = harness(FakeGateway::default(), RecordingNotifier::default());
        h.shutdown.cancel();

        run_supervised(h.scanner, h.notifier.clone()).await.unwrap();
        assert!(h
            .notifier
            .messages()
            .iter()
            .all(|m| !m.contains("stopped on error")));
    }
}
