//! Command dispatch for inbound chat messages.
//!
//! An update is parsed, classified into a [`Command`], handled against the
//! store and translator, answered, and finally recorded in the chat history.

/// Prefix-based command classification.
pub mod command;
mod dispatcher;
/// Command handlers.
pub mod handlers;
mod update;

pub use command::{Command, classify};
pub use dispatcher::{Dispatched, Dispatcher};
pub use handlers::SENTENCE_NOT_FOUND;
pub use update::InboundMessage;
