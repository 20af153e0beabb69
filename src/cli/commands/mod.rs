//! Subcommand implementations.

/// Single update handler.
pub mod handle;

/// Corpus import command handler.
pub mod import;

/// Language listing command handler.
pub mod languages;

/// Webhook server command handler.
pub mod serve;

/// Vocabulary listing command handler.
pub mod words;

use crate::bot::Dispatcher;
use crate::config::Settings;
use crate::store::SqliteOpener;
use crate::telegram::TelegramClient;
use crate::translation::TranslationClient;

/// The dispatcher wired to the production collaborators.
pub type BotDispatcher = Dispatcher<SqliteOpener, TranslationClient, TelegramClient>;

/// Builds the production dispatcher from resolved settings.
pub fn build_dispatcher(settings: &Settings) -> BotDispatcher {
    Dispatcher::new(
        SqliteOpener::new(settings.database.clone()),
        TranslationClient::new(
            settings.translator.endpoint.clone(),
            settings.translator.api_key.clone(),
            settings.translator.model.clone(),
        ),
        TelegramClient::new(
            settings.telegram_api_url.clone(),
            settings.telegram_token.clone(),
        ),
        settings.languages.clone(),
    )
}
