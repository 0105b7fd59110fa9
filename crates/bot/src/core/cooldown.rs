//! Per-symbol alert cooldown.
//!
//! The only state that survives between scan cycles. Owned by the scanner and
//! passed by `&mut`; entries are overwritten on every alert and never removed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

const MAX_WINDOW_MINUTES: u64 = 10 * 365 * 24 * 60;

#[derive(Debug, Clone)]
pub struct CooldownTracker {
    window: Duration,
    last_alert: HashMap<String, DateTime<Utc>>,
}

impl CooldownTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_alert: HashMap::new(),
        }
    }

    /// Window in minutes, capped at ten years.
    pub fn from_minutes(minutes: u64) -> Self {
        Self::new(Duration::minutes(minutes.min(MAX_WINDOW_MINUTES) as i64))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// `false` while `symbol` is inside its cooldown window.
    pub fn should_evaluate(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        match self.last_alert.get(symbol) {
            Some(&last) => {
                let elapsed = now - last;
                if elapsed < self.window {
                    debug!(
                        symbol,
                        remaining_s = (self.window - elapsed).num_seconds(),
                        "cooldown active"
                    );
                    false
                } else {
                    true
                }
            }
            None => true,
        }
    }

    /// Record an alert for `symbol` at `now`, replacing any earlier time.
    pub fn record(&mut self, symbol: &str, now: DateTime<Utc>) {
        self.last_alert.insert(symbol.to_string(), now);
    }

    pub fn last_alert(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.last_alert.get(symbol).copied()
    }

    /// Number of symbols that have ever alerted.
    pub fn len(&self) -> usize {
        self.last_alert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_alert.is_empty()
    }
}
