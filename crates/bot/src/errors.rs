use thiserror::Error;

/// Typed error hierarchy for the sentinel.
///
/// Library-internal errors use specific variants; application code wraps with
/// `anyhow::Context` for propagation.
#[derive(Error, Debug)]
pub enum SentinelError {
    // -- Market data --------------------------------------------------------
    #[error("data source unavailable: {name}")]
    DataUnavailable { name: String },

    #[error("exchange rejected request: {message} (retCode {code})")]
    Exchange { code: i64, message: String },

    #[error("insufficient {timeframe} data: have {have} candles, need {need}")]
    InsufficientData {
        timeframe: String,
        have: usize,
        need: usize,
    },

    #[error("invalid candle series: {reason}")]
    InvalidSeries { reason: String },

    // -- Indicators ---------------------------------------------------------
    #[error("indicator computation failed: {indicator}")]
    Computation { indicator: String },

    // -- Delivery -----------------------------------------------------------
    #[error("notification delivery failed: {reason}")]
    Delivery { reason: String },

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl SentinelError {
    /// Whether the error means "not enough / no data for this symbol right now"
    /// as opposed to a failure inside the indicator pipeline.
    pub fn is_data_gap(&self) -> bool {
        matches!(
            self,
            Self::DataUnavailable { .. }
                | Self::Exchange { .. }
                | Self::InsufficientData { .. }
                | Self::InvalidSeries { .. }
                | Self::Reqwest(_)
                | Self::SerdeJson(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = SentinelError::InsufficientData {
            timeframe: "4h".into(),
            have: 150,
            need: 200,
        };
        assert_eq!(
            err.to_string(),
            "insufficient 4h data: have 150 candles, need 200"
        );
    }

    #[test]
    fn test_data_gap_classification() {
        assert!(SentinelError::DataUnavailable { name: "x".into() }.is_data_gap());
        assert!(SentinelError::Exchange {
            code: 10001,
            message: "params error".into()
        }
        .is_data_gap());
        assert!(!SentinelError::Computation {
            indicator: "adx".into()
        }
        .is_data_gap());
        assert!(!SentinelError::Delivery {
            reason: "timeout".into()
        }
        .is_data_gap());
    }
}
