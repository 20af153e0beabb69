use anyhow::Result;
use std::path::Path;

use crate::store::{Store, SqliteStore};

/// Prints a user's vocabulary with its usage counters.
pub fn run_words(database: &Path, user_id: i64) -> Result<()> {
    let store = SqliteStore::open(database)?;
    let words = store.vocabulary(user_id)?;
    store.close()?;

    if words.is_empty() {
        println!("No vocabulary stored for user {user_id}.");
        return Ok(());
    }

    println!("Vocabulary of user {user_id}:\n");
    for entry in &words {
        println!(
            "  {:<24} used {:>3}x  added {}",
            entry.word,
            entry.use_counter,
            entry.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
