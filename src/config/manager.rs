use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;
use crate::telegram::DEFAULT_API_URL;
use crate::translation::{
    DEFAULT_SOURCE_LANGUAGE, DEFAULT_TARGET_LANGUAGE, LanguagePair, validate_language,
};

/// Default address the webhook server binds to.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Environment variable consulted for the translator API key when the
/// config file does not name one.
pub const DEFAULT_API_KEY_ENV: &str = "LERNER_TRANSLATOR_API_KEY";

/// Settings in the `[bot]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Deployment region identifier.
    pub region: Option<String>,
    /// Bot token (prefer the `TELEGRAM_TOKEN` environment variable).
    pub telegram_token: Option<String>,
    /// Telegram Bot API base URL.
    pub telegram_api_url: Option<String>,
    /// Path of the `SQLite` database file.
    pub database: Option<PathBuf>,
    /// Address the webhook server listens on.
    pub listen: Option<String>,
}

/// Settings in the `[translator]` section of config.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// The OpenAI-compatible API endpoint URL.
    pub endpoint: Option<String>,
    /// Model used for translations.
    pub model: Option<String>,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Language of the practice corpus.
    pub from: Option<String>,
    /// Language translations are produced in.
    pub to: Option<String>,
}

impl TranslatorConfig {
    /// Gets the API key, preferring the environment over the config file.
    pub fn get_api_key(&self) -> Option<String> {
        let env_var = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        if let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/lerner/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub translator: TranslatorConfig,
}

/// Values given on the command line or through environment variables.
///
/// These take precedence over config file values.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub region: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_api_url: Option<String>,
    pub database: Option<PathBuf>,
    pub listen: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Translator connection settings.
#[derive(Clone)]
pub struct TranslatorSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Everything the bot needs to serve updates, fully resolved.
#[derive(Clone)]
pub struct Settings {
    pub region: String,
    pub telegram_token: String,
    pub telegram_api_url: String,
    pub database: PathBuf,
    pub listen: SocketAddr,
    pub translator: TranslatorSettings,
    pub languages: LanguagePair,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("region", &self.region)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("database", &self.database)
            .field("listen", &self.listen)
            .field("translator_endpoint", &self.translator.endpoint)
            .field("translator_model", &self.translator.model)
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

/// Resolves the database path alone, for commands that only touch the store.
pub fn resolve_database(options: &ResolveOptions, config_file: &ConfigFile) -> Result<PathBuf> {
    options
        .database
        .as_ref()
        .or(config_file.bot.database.as_ref())
        .cloned()
        .ok_or(Error::ConfigurationMissing {
            key: "database",
            flag: "database",
            env: "LERNER_DATABASE",
        })
}

/// Resolves all settings by merging CLI/environment options with the config file.
///
/// Every required value is checked before anything else happens so that a
/// misconfigured deployment fails at startup.
pub fn resolve_settings(options: &ResolveOptions, config_file: &ConfigFile) -> Result<Settings> {
    let bot = &config_file.bot;
    let translator = &config_file.translator;

    let region = pick(&options.region, &bot.region).ok_or(Error::ConfigurationMissing {
        key: "region",
        flag: "region",
        env: "LERNER_REGION",
    })?;

    let telegram_token = pick(&options.telegram_token, &bot.telegram_token).ok_or(
        Error::ConfigurationMissing {
            key: "telegram_token",
            flag: "telegram-token",
            env: "TELEGRAM_TOKEN",
        },
    )?;

    let database = resolve_database(options, config_file)?;

    let endpoint =
        pick(&options.endpoint, &translator.endpoint).ok_or(Error::ConfigurationMissing {
            key: "translator.endpoint",
            flag: "endpoint",
            env: "LERNER_TRANSLATOR_ENDPOINT",
        })?;

    let model = pick(&options.model, &translator.model).ok_or(Error::ConfigurationMissing {
        key: "translator.model",
        flag: "model",
        env: "LERNER_TRANSLATOR_MODEL",
    })?;

    let telegram_api_url = pick(&options.telegram_api_url, &bot.telegram_api_url)
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let listen = pick(&options.listen, &bot.listen)
        .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
    let listen: SocketAddr = listen
        .parse()
        .map_err(|e| Error::Config(format!("Invalid listen address '{listen}': {e}")))?;

    let source = pick(&options.from, &translator.from)
        .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string());
    let target =
        pick(&options.to, &translator.to).unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string());
    validate_language(&source)?;
    validate_language(&target)?;

    Ok(Settings {
        region,
        telegram_token,
        telegram_api_url,
        database,
        listen,
        translator: TranslatorSettings {
            endpoint,
            model,
            api_key: translator.get_api_key(),
        },
        languages: LanguagePair { source, target },
    })
}

/// The first non-empty value, CLI before config file.
fn pick(cli: &Option<String>, file: &Option<String>) -> Option<String> {
    cli.as_ref()
        .or(file.as_ref())
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

/// Manages loading the configuration file.
pub struct ConfigManager {
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Uses `path` when given, otherwise `$XDG_CONFIG_HOME/lerner/config.toml`
    /// or `~/.config/lerner/config.toml`.
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            config_path: path.or_else(|| paths::config_dir().map(|dir| dir.join("config.toml"))),
        }
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Loads the config file. A missing file yields the defaults.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        let Some(path) = &self.config_path else {
            return Ok(ConfigFile::default());
        };

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ConfigFile::default()),
            Err(e) => {
                return Err(Error::Config(format!(
                    "Failed to read config file {}: {e}",
                    path.display()
                )));
            }
        };

        toml::from_str(&contents).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }
}
