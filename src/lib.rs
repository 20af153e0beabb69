//! # lerner - Telegram vocabulary bot
//!
//! `lerner` answers Telegram webhook updates for language learners. Users
//! keep a personal vocabulary list, ask for practice sentences from a
//! parallel corpus, contribute their own sentences and get translations.
//!
//! ## Commands
//!
//! | Message            | Effect                                              |
//! |--------------------|-----------------------------------------------------|
//! | `/t`               | Translates the bot's previous reply in this chat    |
//! | `/t <text>`        | Translates the given text                           |
//! | `/lerne <word>`    | Adds a single word to the vocabulary                |
//! | `/satz [word]`     | Sentence containing the word, or a learned word     |
//! | `/as <sentence>`   | Adds a sentence to the corpus                       |
//! | anything else      | Same as `/satz`, using the text as keyword          |
//!
//! ## Quick Start
//!
//! ```bash
//! # Load a corpus
//! lerner --database lerner.db import deu-eng.tsv
//!
//! # Serve webhook updates
//! TELEGRAM_TOKEN=... lerner --region eu-central-1 --database lerner.db \
//!     --endpoint http://localhost:11434 --model gemma3:12b serve
//! ```
//!
//! ## Configuration
//!
//! Settings can also be stored in `~/.config/lerner/config.toml`:
//!
//! ```toml
//! [bot]
//! region = "eu-central-1"
//! database = "/var/lib/lerner/lerner.db"
//!
//! [translator]
//! endpoint = "http://localhost:11434"
//! model = "gemma3:12b"
//! from = "de"
//! to = "en"
//! ```

/// Command classification, handlers and the per-update dispatcher.
pub mod bot;

/// Command-line interface definitions and handlers.
pub mod cli;

/// Configuration file management and settings resolution.
pub mod config;

/// Error types.
pub mod error;

/// Input reading from files and stdin.
pub mod input;

/// Domain records.
pub mod models;

/// XDG-style path utilities for configuration.
pub mod paths;

/// Webhook HTTP server.
pub mod server;

/// Persistence for sentences, vocabulary and chat history.
pub mod store;

/// Telegram Bot API client.
pub mod telegram;

/// Translation client for OpenAI-compatible APIs.
pub mod translation;
