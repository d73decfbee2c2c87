// src/notify/telegram.rs
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{error, info, warn};

use super::{SendMessageRequest, TelegramResponse};
use crate::core::config_manager::TelegramConfig;
use crate::error::NotifyError;

/// Used when a 429 carries no `retry_after`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

enum SendOutcome {
    Delivered,
    RateLimited { retry_after: u64 },
}

/// Sends plain-text messages to a single Telegram chat
pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    base_url: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Deliver `message`. On rate limiting, wait the requested time and send
    /// once more; a second rate limit is reported as an error.
    pub async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        match self.send(message).await? {
            SendOutcome::Delivered => Ok(()),
            SendOutcome::RateLimited { retry_after } => {
                warn!("Telegram rate limit hit, retrying in {}s", retry_after);
                tokio::time::sleep(Duration::from_secs(retry_after)).await;

                match self.send(message).await? {
                    SendOutcome::Delivered => Ok(()),
                    SendOutcome::RateLimited { retry_after } => {
                        error!("Telegram still rate limited after retry");
                        Err(NotifyError::RateLimited { retry_after })
                    }
                }
            }
        }
    }

    async fn send(&self, text: &str) -> Result<SendOutcome, NotifyError> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.base_url, self.token))
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        if status.is_success() {
            info!("Message sent to chat {}", self.chat_id);
            return Ok(SendOutcome::Delivered);
        }

        let body: TelegramResponse = serde_json::from_str(&body_text).unwrap_or_default();

        if status == StatusCode::TOO_MANY_REQUESTS || body.error_code == Some(429) {
            let retry_after = body
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Ok(SendOutcome::RateLimited { retry_after });
        }

        let description = body.description.unwrap_or(body_text);
        error!("Telegram API error {}: {}", status, description);
        Err(NotifyError::Api {
            status: status.as_u16(),
            description,
        })
    }
}
