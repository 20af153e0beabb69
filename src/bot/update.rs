//! Parsing of inbound Telegram webhook updates.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
    #[serde(default)]
    edited_message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    from: Option<User>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
}

/// The parts of an update the bot acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// The update id, recorded as the history message id.
    pub message_id: i64,
    pub chat_id: i64,
    pub user_id: i64,
    pub text: String,
}

impl InboundMessage {
    /// Parses a webhook body. A new `message` wins over an `edited_message`.
    ///
    /// Updates the bot has nothing to say to (no message, no sender, no
    /// text) parse to `None`. Only bodies that are not an update at all
    /// are errors.
    pub fn from_json(body: &[u8]) -> Result<Option<Self>> {
        let update: Update =
            serde_json::from_slice(body).map_err(|e| Error::Payload(e.to_string()))?;
        let update_id = update.update_id;

        let Some(message) = update.message.or(update.edited_message) else {
            debug!(update_id, "Update has neither 'message' nor 'edited_message'");
            return Ok(None);
        };

        let Some(user) = message.from else {
            debug!(update_id, "Update has no sender");
            return Ok(None);
        };

        let Some(text) = message.text else {
            debug!(update_id, "Update has no text");
            return Ok(None);
        };

        Ok(Some(Self {
            message_id: update_id,
            chat_id: message.chat.id,
            user_id: user.id,
            text,
        }))
    }
}
