//! Persistence for the sentence corpus, vocabulary lists and chat history.

mod sqlite;

pub use sqlite::{SqliteOpener, SqliteStore};

use std::sync::Arc;
use tokio::task::{self, JoinError};

use crate::error::{Error, Result};
use crate::models::{ChatMessage, Sentence};

/// Operations the command handlers and the dispatcher need from storage.
///
/// Every statement commits on its own; there is no atomicity across calls.
pub trait Store {
    /// A uniformly random sentence from the whole corpus.
    fn random_sentence(&self) -> Result<Option<Sentence>>;

    /// A uniformly random word from the user's vocabulary.
    fn random_vocabulary_word(&self, user_id: i64) -> Result<Option<String>>;

    /// A random sentence whose source text contains `word`, ignoring case.
    fn sentence_containing(&self, word: &str) -> Result<Option<Sentence>>;

    /// The newest history record for the chat, or `ChatMessage::default()`.
    fn latest_chat_message(&self, chat_id: i64) -> Result<ChatMessage>;

    /// Appends a word to the user's vocabulary. Duplicates are kept.
    fn insert_vocabulary_word(&self, user_id: i64, word: &str) -> Result<()>;

    /// Appends a user-submitted sentence to the corpus.
    fn insert_user_sentence(&self, user_id: i64, text: &str) -> Result<()>;

    /// Appends a history record.
    fn insert_chat_message(&self, message: &ChatMessage) -> Result<()>;

    /// Releases the underlying connection.
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Hands out one store handle per invocation.
pub trait StoreOpener: Send + Sync + 'static {
    type Store: Store + Send + Sync + 'static;

    fn open(&self) -> Result<Self::Store>;
}

/// A store handle whose statements run on tokio's blocking thread pool.
///
/// `SQLite` calls block, for up to the busy timeout when the database is
/// locked, so they never run on the async workers.
pub struct BlockingStore<S> {
    inner: Arc<S>,
}

impl<S> BlockingStore<S>
where
    S: Store + Send + Sync + 'static,
{
    pub fn new(store: S) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Opens a handle through `opener` off the async workers.
    pub async fn open<O>(opener: &Arc<O>) -> Result<Self>
    where
        O: StoreOpener<Store = S>,
    {
        let opener = Arc::clone(opener);
        let store = task::spawn_blocking(move || opener.open())
            .await
            .map_err(join_error)??;
        Ok(Self::new(store))
    }

    /// Runs `statement` against the store on the blocking pool.
    pub async fn run<R, F>(&self, statement: F) -> Result<R>
    where
        F: FnOnce(&S) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = Arc::clone(&self.inner);
        task::spawn_blocking(move || statement(store.as_ref()))
            .await
            .map_err(join_error)?
    }

    /// Direct access for callers that are already off the async workers.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Releases the connection.
    pub async fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.inner) {
            Ok(store) => task::spawn_blocking(move || store.close())
                .await
                .map_err(join_error)?,
            // A statement from a cancelled request still holds the handle.
            // The connection closes when that statement finishes.
            Err(_) => Ok(()),
        }
    }
}

fn join_error(e: JoinError) -> Error {
    Error::StoreUnavailable(format!("Store task failed: {e}"))
}
