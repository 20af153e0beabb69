use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ResolveOptions;

#[derive(Parser, Debug)]
#[command(name = "lerner")]
#[command(about = "Telegram vocabulary bot for language learners")]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings shared by every subcommand.
#[derive(ClapArgs, Debug, Default)]
pub struct SettingsArgs {
    /// Config file path (defaults to ~/.config/lerner/config.toml)
    #[arg(short = 'c', long, global = true, env = "LERNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Deployment region identifier
    #[arg(long, global = true, env = "LERNER_REGION")]
    pub region: Option<String>,

    /// Telegram bot token
    #[arg(long, global = true, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    pub telegram_token: Option<String>,

    /// Telegram Bot API base URL
    #[arg(long = "telegram-api", global = true, env = "TELEGRAM_API_URL")]
    pub telegram_api_url: Option<String>,

    /// SQLite database file
    #[arg(short = 'd', long, global = true, env = "LERNER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Translation API endpoint URL
    #[arg(short = 'e', long, global = true, env = "LERNER_TRANSLATOR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Translation model name
    #[arg(short = 'm', long, global = true, env = "LERNER_TRANSLATOR_MODEL")]
    pub model: Option<String>,

    /// Language of the practice corpus (ISO 639-1)
    #[arg(short = 'f', long, global = true, env = "LERNER_FROM")]
    pub from: Option<String>,

    /// Language translations are produced in (ISO 639-1)
    #[arg(short = 't', long, global = true, env = "LERNER_TO")]
    pub to: Option<String>,
}

impl SettingsArgs {
    /// Converts the parsed flags into resolver input.
    pub fn to_resolve_options(&self, listen: Option<String>) -> ResolveOptions {
        ResolveOptions {
            region: self.region.clone(),
            telegram_token: self.telegram_token.clone(),
            telegram_api_url: self.telegram_api_url.clone(),
            database: self.database.clone(),
            listen,
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            from: self.from.clone(),
            to: self.to.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve Telegram webhook updates over HTTP
    Serve {
        /// Address to listen on
        #[arg(short = 'l', long, env = "LERNER_LISTEN")]
        listen: Option<String>,
    },
    /// Handle a single update read from a file or stdin
    Handle {
        /// Update JSON file (reads from stdin if not provided)
        file: Option<PathBuf>,
    },
    /// Import a tab-separated parallel corpus
    Import {
        /// Corpus file: source_id, source_text, target_id, target_text
        file: PathBuf,

        /// Label stored with every imported sentence
        #[arg(long, default_value = "tatoeba")]
        label: String,
    },
    /// List a user's vocabulary
    Words {
        /// Telegram user id
        user_id: i64,
    },
    /// List supported language codes
    Languages,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "lerner",
            "serve",
            "--region",
            "eu-central-1",
            "--listen",
            "127.0.0.1:9000",
        ])
        .unwrap();

        assert_eq!(args.settings.region.as_deref(), Some("eu-central-1"));
        assert!(matches!(
            args.command,
            Command::Serve { listen: Some(ref addr) } if addr == "127.0.0.1:9000"
        ));
    }

    #[test]
    fn test_import_label_default() {
        let args = Args::try_parse_from(["lerner", "import", "corpus.tsv"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Import { ref label, .. } if label == "tatoeba"
        ));
    }

    #[test]
    fn test_words_requires_numeric_user_id() {
        assert!(Args::try_parse_from(["lerner", "words", "alice"]).is_err());
    }
}
