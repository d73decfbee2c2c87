// src/notify/mod.rs
use serde::{Deserialize, Serialize};

pub mod telegram;

pub use telegram::TelegramNotifier;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

/// Bot API envelope; only the failure fields are read
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TelegramResponse {
    pub error_code: Option<u16>,
    pub description: Option<String>,
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ResponseParameters {
    pub retry_after: Option<u64>,
}
