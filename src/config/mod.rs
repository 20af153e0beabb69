//! Configuration loading and resolution.
//!
//! Priority, highest first: CLI options, environment variables, the config
//! file, built-in defaults. CLI options and environment variables are merged
//! by clap before they reach [`ResolveOptions`].

mod manager;

pub use manager::{
    BotConfig, ConfigFile, ConfigManager, DEFAULT_API_KEY_ENV, DEFAULT_LISTEN_ADDR,
    ResolveOptions, Settings, TranslatorConfig, TranslatorSettings, resolve_database,
    resolve_settings,
};
