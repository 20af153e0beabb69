use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

use super::build_dispatcher;
use crate::config::Settings;
use crate::input::InputReader;
use crate::store::SqliteStore;

/// Processes one update read from `file` or stdin and prints the reply.
pub async fn run_handle(settings: Settings, file: Option<&Path>) -> Result<()> {
    let body = InputReader::read(file)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        bail!("Error: Input is empty");
    }

    info!(region = %settings.region, "Handling single update");
    SqliteStore::initialize(&settings.database)?;

    match build_dispatcher(&settings).dispatch(&body).await? {
        Some(dispatched) => println!("{}", dispatched.reply),
        None => info!("Update carries no text message, nothing to reply"),
    }
    Ok(())
}
