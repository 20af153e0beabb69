use std::sync::Arc;

use tracing::{debug, info, warn};

use super::command::{Command, classify};
use super::handlers;
use super::update::InboundMessage;
use crate::error::Result;
use crate::models::ChatMessage;
use crate::store::{BlockingStore, Store, StoreOpener};
use crate::telegram::Messenger;
use crate::translation::{LanguagePair, Translator};

/// Outcome of one processed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub command: Command,
    pub chat_id: i64,
    pub reply: String,
}

/// Processes one webhook update at a time against its collaborators.
pub struct Dispatcher<O, T, M> {
    opener: Arc<O>,
    translator: T,
    messenger: M,
    languages: LanguagePair,
}

impl<O, T, M> Dispatcher<O, T, M>
where
    O: StoreOpener,
    T: Translator,
    M: Messenger,
{
    pub fn new(opener: O, translator: T, messenger: M, languages: LanguagePair) -> Self {
        Self {
            opener: Arc::new(opener),
            translator,
            messenger,
            languages,
        }
    }

    /// Handles one raw update body from start to finish.
    ///
    /// Returns `None` for updates without a text message; those get no
    /// reply. The reply is sent before the history record is written. A
    /// failure anywhere before the send aborts the invocation with nothing
    /// sent and nothing recorded. The history write itself is best-effort.
    /// Store work runs on the blocking pool so a locked database never
    /// stalls the runtime.
    pub async fn dispatch(&self, body: &[u8]) -> Result<Option<Dispatched>> {
        // Dropping the handle closes the connection on every early return.
        let store = BlockingStore::open(&self.opener).await?;

        let Some(message) = InboundMessage::from_json(body)? else {
            close(store).await;
            return Ok(None);
        };
        let command = classify(&message.text);
        debug!(
            update_id = message.message_id,
            chat_id = message.chat_id,
            %command,
            "Dispatching update"
        );

        let reply = handlers::handle(
            command,
            &message,
            &store,
            &self.translator,
            &self.languages,
        )
        .await?;

        self.messenger.send_message(&reply, message.chat_id).await?;

        let chat_id = message.chat_id;
        let record = ChatMessage::new(
            message.message_id,
            chat_id,
            message.user_id,
            message.text,
            reply.clone(),
        );
        if let Err(e) = store.run(move |s| s.insert_chat_message(&record)).await {
            warn!(chat_id, error = %e, "Failed to store chat message");
        }

        close(store).await;

        info!(chat_id, %command, "Update handled");
        Ok(Some(Dispatched {
            command,
            chat_id,
            reply,
        }))
    }
}

async fn close<S: Store + Send + Sync + 'static>(store: BlockingStore<S>) {
    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close store connection");
    }
}
