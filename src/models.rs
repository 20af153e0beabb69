//! Rows persisted by the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source label for sentences submitted through the bot.
pub const USER_SENTENCE_LABEL: &str = "bot_user";

/// A sentence from the practice corpus, optionally with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: i64,
    /// Text in the practiced language.
    pub source_text: String,
    pub target_id: Option<i64>,
    /// Parallel text in the other language, when the corpus has one.
    pub target_text: Option<String>,
    /// Where the row came from: a corpus label or [`USER_SENTENCE_LABEL`].
    pub source_label: String,
    /// Set only for sentences a user submitted.
    pub owner_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One line of a parallel corpus before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub source_text: String,
    pub target_id: Option<i64>,
    pub target_text: Option<String>,
}

/// A word a user asked to learn.
///
/// `last_used_at` and `use_counter` are written once at insert time and
/// never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i64,
    pub owner_user_id: i64,
    pub word: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
    pub use_counter: i64,
}

/// One processed message and the reply the bot sent for it.
///
/// `ChatMessage::default()` stands for "no history in this chat".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub owner_user_id: i64,
    pub message_text: String,
    pub reply_text: String,
    pub message_date: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// Creates a history record stamped with the current time.
    pub fn new(
        message_id: i64,
        chat_id: i64,
        owner_user_id: i64,
        message_text: impl Into<String>,
        reply_text: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            chat_id,
            owner_user_id,
            message_text: message_text.into(),
            reply_text: reply_text.into(),
            message_date: Some(Utc::now()),
        }
    }
}
