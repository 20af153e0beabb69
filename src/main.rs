use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use lerner_bot::cli::commands::{handle, import, languages, serve, words};
use lerner_bot::cli::{Args, Command};
use lerner_bot::config::{ConfigManager, resolve_database, resolve_settings};

const DEFAULT_LOG_FILTER: &str = "lerner_bot=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is normal in production.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = &args.settings;
    let load_config = || ConfigManager::new(settings.config.clone()).load_or_default();

    match args.command {
        Command::Serve { listen } => {
            let options = settings.to_resolve_options(listen);
            serve::run_serve(resolve_settings(&options, &load_config()?)?).await?;
        }
        Command::Handle { file } => {
            let options = settings.to_resolve_options(None);
            handle::run_handle(resolve_settings(&options, &load_config()?)?, file.as_deref())
                .await?;
        }
        Command::Import { file, label } => {
            let options = settings.to_resolve_options(None);
            import::run_import(&resolve_database(&options, &load_config()?)?, &file, &label)?;
        }
        Command::Words { user_id } => {
            let options = settings.to_resolve_options(None);
            words::run_words(&resolve_database(&options, &load_config()?)?, user_id)?;
        }
        // Needs no configuration, so a broken config file cannot block it.
        Command::Languages => languages::print_languages(),
    }

    Ok(())
}
