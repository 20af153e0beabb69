use chrono::Utc;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info};

use super::{Store, StoreOpener};
use crate::error::{Error, Result};
use crate::models::{
    ChatMessage, CorpusEntry, Sentence, USER_SENTENCE_LABEL, VocabularyEntry,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SENTENCE_COLUMNS: &str =
    "id, source_text, target_id, target_text, source_label, owner_user_id, created_at";

/// `SQLite`-backed store holding a single connection.
///
/// The connection sits behind a mutex so a handle can be shared by reference
/// across `.await` points. The lock is only taken for the duration of one
/// statement.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens an existing, initialized database.
    ///
    /// Never creates the file or the schema; see [`SqliteStore::create`].
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::default().difference(OpenFlags::SQLITE_OPEN_CREATE);
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            Error::StoreUnavailable(format!("Failed to open {}: {e}", path.display()))
        })?;

        Self::configure(&conn)
            .map_err(|e| Error::StoreUnavailable(format!("Failed to configure database: {e}")))?;

        debug!(path = %path.display(), "Store connection opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens the database, creating the file and schema if needed, and
    /// switches it to WAL journaling.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            Error::StoreUnavailable(format!("Failed to open {}: {e}", path.display()))
        })?;

        Self::configure(&conn)
            .and_then(|()| {
                conn.pragma_update_and_check(Some("main"), "journal_mode", "WAL", |_| {
                    Ok(())
                })
            })
            .map_err(|e| Error::StoreUnavailable(format!("Failed to configure database: {e}")))?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Creates the database file and schema ahead of the first invocation.
    pub fn initialize(path: &Path) -> Result<()> {
        Self::create(path)?.close()?;
        info!(path = %path.display(), "Database ready");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        register_functions(&conn)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_db()?;
        Ok(store)
    }

    fn configure(conn: &Connection) -> rusqlite::Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        register_functions(conn)
    }

    fn init_db(&self) -> Result<()> {
        self.lock().execute_batch(
            "CREATE TABLE IF NOT EXISTS sentences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_text TEXT NOT NULL,
                target_id INTEGER,
                target_text TEXT,
                source_label TEXT NOT NULL,
                owner_user_id INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS vocabulary (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_user_id INTEGER NOT NULL,
                word TEXT NOT NULL,
                created_at TEXT NOT NULL,
                last_used_at TEXT NOT NULL,
                use_counter INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_vocabulary_owner ON vocabulary(owner_user_id);

            CREATE TABLE IF NOT EXISTS chat_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id INTEGER NOT NULL,
                chat_id INTEGER NOT NULL,
                owner_user_id INTEGER NOT NULL,
                message_text TEXT NOT NULL,
                reply_text TEXT NOT NULL,
                message_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_chat_messages_chat
                ON chat_messages(chat_id, message_date);",
        )?;

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Statements autocommit, so a poisoned lock guards no partial state.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads corpus sentences in a single transaction and returns how many were stored.
    pub fn import_sentences<I>(&self, label: &str, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = CorpusEntry>,
    {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let now = Utc::now();
        let mut count = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO sentences
                 (source_text, target_id, target_text, source_label, owner_user_id, created_at)
                 VALUES (?1, ?2, ?3, ?4, NULL, ?5)",
            )?;

            for entry in entries {
                stmt.execute(params![
                    entry.source_text,
                    entry.target_id,
                    entry.target_text,
                    label,
                    now
                ])?;
                count += 1;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// Lists a user's vocabulary, oldest first.
    pub fn vocabulary(&self, user_id: i64) -> Result<Vec<VocabularyEntry>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, owner_user_id, word, created_at, last_used_at, use_counter
             FROM vocabulary WHERE owner_user_id = ?1 ORDER BY id",
        )?;

        let entries = stmt
            .query_map([user_id], |row| {
                Ok(VocabularyEntry {
                    id: row.get("id")?,
                    owner_user_id: row.get("owner_user_id")?,
                    word: row.get("word")?,
                    created_at: row.get("created_at")?,
                    last_used_at: row.get("last_used_at")?,
                    use_counter: row.get("use_counter")?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(entries)
    }
}

impl Store for SqliteStore {
    fn random_sentence(&self) -> Result<Option<Sentence>> {
        let sql = format!("SELECT {SENTENCE_COLUMNS} FROM sentences ORDER BY random() LIMIT 1");
        let sentence = self.lock().query_row(&sql, [], sentence_from_row).optional()?;
        Ok(sentence)
    }

    fn random_vocabulary_word(&self, user_id: i64) -> Result<Option<String>> {
        let word = self
            .lock()
            .query_row(
                "SELECT word FROM vocabulary WHERE owner_user_id = ?1 ORDER BY random() LIMIT 1",
                [user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(word)
    }

    fn sentence_containing(&self, word: &str) -> Result<Option<Sentence>> {
        let sql = format!(
            "SELECT {SENTENCE_COLUMNS} FROM sentences
             WHERE instr(fold_case(source_text), fold_case(?1)) > 0
             ORDER BY random() LIMIT 1"
        );
        let sentence = self
            .lock()
            .query_row(&sql, [word], sentence_from_row)
            .optional()?;
        Ok(sentence)
    }

    fn latest_chat_message(&self, chat_id: i64) -> Result<ChatMessage> {
        let message = self
            .lock()
            .query_row(
                "SELECT message_id, chat_id, owner_user_id, message_text, reply_text, message_date
                 FROM chat_messages
                 WHERE chat_id = ?1
                 ORDER BY message_date DESC, id DESC
                 LIMIT 1",
                [chat_id],
                |row| {
                    Ok(ChatMessage {
                        message_id: row.get("message_id")?,
                        chat_id: row.get("chat_id")?,
                        owner_user_id: row.get("owner_user_id")?,
                        message_text: row.get("message_text")?,
                        reply_text: row.get("reply_text")?,
                        message_date: row.get("message_date")?,
                    })
                },
            )
            .optional()?;

        Ok(message.unwrap_or_default())
    }

    fn insert_vocabulary_word(&self, user_id: i64, word: &str) -> Result<()> {
        let now = Utc::now();
        self.lock().execute(
            "INSERT INTO vocabulary (owner_user_id, word, created_at, last_used_at, use_counter)
             VALUES (?1, ?2, ?3, ?4, 0)",
            params![user_id, word, now, now],
        )?;
        Ok(())
    }

    fn insert_user_sentence(&self, user_id: i64, text: &str) -> Result<()> {
        self.lock().execute(
            "INSERT INTO sentences (source_text, source_label, owner_user_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![text, USER_SENTENCE_LABEL, user_id, Utc::now()],
        )?;
        Ok(())
    }

    fn insert_chat_message(&self, message: &ChatMessage) -> Result<()> {
        let message_date = message.message_date.unwrap_or_else(Utc::now);
        self.lock().execute(
            "INSERT INTO chat_messages
             (message_id, chat_id, owner_user_id, message_text, reply_text, message_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.message_id,
                message.chat_id,
                message.owner_user_id,
                message.message_text,
                message.reply_text,
                message_date
            ],
        )?;
        Ok(())
    }

    fn close(self) -> Result<()> {
        let conn = self.conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| Error::StoreQueryFailed(e))?;
        debug!("Store connection closed");
        Ok(())
    }
}

/// Opens a fresh [`SqliteStore`] on the same database file for every invocation.
#[derive(Debug, Clone)]
pub struct SqliteOpener {
    db_path: PathBuf,
}

impl SqliteOpener {
    pub const fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }
}

impl StoreOpener for SqliteOpener {
    type Store = SqliteStore;

    fn open(&self) -> Result<SqliteStore> {
        SqliteStore::open(&self.db_path)
    }
}

/// `fold_case(text)` lower-cases with full Unicode rules, unlike the built-in
/// `lower()` which only folds ASCII.
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )
}

fn sentence_from_row(row: &Row<'_>) -> rusqlite::Result<Sentence> {
    Ok(Sentence {
        id: row.get("id")?,
        source_text: row.get("source_text")?,
        target_id: row.get("target_id")?,
        target_text: row.get("target_text")?,
        source_label: row.get("source_label")?,
        owner_user_id: row.get("owner_user_id")?,
        created_at: row.get("created_at")?,
    })
}
