//! Outbound messages through the Telegram Bot API.

use reqwest::Client;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Default Telegram Bot API base URL.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Delivers reply text to a chat.
pub trait Messenger: Send + Sync + 'static {
    /// Hands the message to the messaging service. Delivery is not confirmed.
    fn send_message(&self, text: &str, chat_id: i64) -> impl Future<Output = Result<()>> + Send;
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

pub struct TelegramClient {
    client: Client,
    api_url: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_url: String, token: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_url.trim_end_matches('/'),
            self.token
        )
    }
}

impl Messenger for TelegramClient {
    async fn send_message(&self, text: &str, chat_id: i64) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await
            // reqwest errors carry the URL, which embeds the bot token.
            .map_err(|e| Error::Messaging(e.without_url().to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(chat_id, "Message sent");
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(chat_id, %status, body = %body, "Telegram rejected message");
        }

        Ok(())
    }
}

// The token is a credential.
impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}
