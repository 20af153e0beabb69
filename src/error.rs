//! Error types shared by the bot core.
//!
//! Validation problems in user input are not errors: handlers answer them
//! with an ordinary reply. Everything here aborts the current invocation,
//! except a failed chat-history write, which the dispatcher logs and drops.

use thiserror::Error;

/// Core error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A required setting was not provided by any configuration source.
    #[error(
        "Missing required configuration: '{key}'\n\n\
         Please provide it via:\n  \
         - CLI option: lerner --{flag} <value>\n  \
         - Environment variable: {env}\n  \
         - Config file: ~/.config/lerner/config.toml"
    )]
    ConfigurationMissing {
        key: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    /// A setting was present but unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The database could not be opened.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A statement against an open database failed.
    #[error("Store query failed: {0}")]
    StoreQueryFailed(#[from] rusqlite::Error),

    /// The translation service failed or returned garbage.
    #[error("Translation service failure: {0}")]
    Translation(String),

    /// The reply could not be handed to the messaging API.
    #[error("Failed to send message: {0}")]
    Messaging(String),

    /// The inbound update could not be understood.
    #[error("Invalid update payload: {0}")]
    Payload(String),
}

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
