//! Telegram Bot API transport (`sendMessage`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use super::Notifier;
use crate::config::TelegramConfig;
use crate::errors::SentinelError;

#[derive(Debug, Serialize, PartialEq)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base_url: String,
    parse_mode: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        config: &TelegramConfig,
        token: String,
        chat_id: String,
    ) -> Result<Self, SentinelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.clone(),
            parse_mode: config.parse_mode.clone(),
            token,
            chat_id,
        })
    }

    // The URL embeds the token and must never be logged.
    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base_url, self.token)
    }

    fn payload<'a>(&'a self, text: &'a str) -> SendMessage<'a> {
        SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: &self.parse_mode,
        }
    }
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base_url", &self.api_base_url)
            .field("chat_id", &self.chat_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), SentinelError> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&self.payload(text))
            .send()
            .await
            .map_err(|e| SentinelError::Delivery {
                reason: e.without_url().to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(%status, body = %body, "telegram rejected message");
            return Err(SentinelError::Delivery {
                reason: format!("telegram returned {status}"),
            });
        }

        debug!(chars = text.len(), "telegram message delivered");
        Ok(())
    }
}
