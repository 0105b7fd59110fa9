//! Outbound alert delivery.
//!
//! A [`Notifier`] takes one pre-rendered text message. Telegram is the live
//! transport; [`LogNotifier`] stands in when credentials are absent so the
//! scanner still runs and alerts land in the log.

pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{env_string, NotifierConfig};
use crate::errors::SentinelError;

pub use telegram::TelegramNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), SentinelError>;
}

/// Writes every message to the tracing log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), SentinelError> {
        info!(message = %text, "alert (log only)");
        Ok(())
    }
}

/// Build the configured notifier.
///
/// Falls back to [`LogNotifier`] when either credential env var is unset or
/// the HTTP client cannot be constructed.
pub fn build_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    let telegram = &config.telegram;
    let token = env_string(&telegram.bot_token_env);
    let chat_id = env_string(&telegram.chat_id_env);

    match (token, chat_id) {
        (Some(token), Some(chat_id)) => match TelegramNotifier::new(telegram, token, chat_id) {
            Ok(notifier) => {
                info!("telegram notifier enabled");
                Arc::new(notifier)
            }
            Err(e) => {
                warn!(error = %e, "failed to build telegram client, alerts will be logged only");
                Arc::new(LogNotifier)
            }
        },
        _ => {
            warn!(
                token_env = %telegram.bot_token_env,
                chat_env = %telegram.chat_id_env,
                "telegram credentials missing, alerts will be logged only"
            );
            Arc::new(LogNotifier)
        }
    }
}
