use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{try_auto_sync, ConfigCommand, FeatureCommand, PrefsCommand, SyncCommand};
use feature_sync::config::Config;
use feature_sync::db::{init_db, FeatureStore, Preferences};
use feature_sync::remote::{FeatureApi, HttpFeatureApi, OfflineApi};
use feature_sync::usecases::UseCases;
use feature_sync::FeatureRepository;

#[derive(Parser)]
#[command(name = "feature")]
#[command(version)]
#[command(about = "Manage template features with an offline cache", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Feature(FeatureCommand),

    /// Sync the local cache with the server
    Sync(SyncCommand),

    /// Manage stored preferences
    Prefs(PrefsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Handles shared by the data commands.
struct App {
    use_cases: UseCases,
    preferences: Preferences,
}

impl App {
    async fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = init_db(&config.database_path.value).await?;
        let store = FeatureStore::new(pool.clone());
        let preferences = Preferences::new(pool);

        let api: Arc<dyn FeatureApi> = if config.api.is_configured() {
            Arc::new(HttpFeatureApi::from_config(&config.api)?)
        } else {
            Arc::new(OfflineApi)
        };
        let repository = FeatureRepository::new(api, store, preferences.clone())
            .with_search_limit(config.api.search_limit);

        if preferences.is_first_launch().await? {
            eprintln!(
                "Welcome! Features are cached in {}. Run `feature sync status` to connect a server.",
                config.database_path.value.display()
            );
            preferences.set_first_launch(false).await?;
        }

        Ok(Self {
            use_cases: UseCases::new(Arc::new(repository)),
            preferences,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Feature(cmd)) => {
            let app = App::open(&config).await?;
            if cmd.is_read() {
                try_auto_sync(&app.use_cases, &config).await;
            }
            cmd.run(&app.use_cases).await?;
        }
        Some(Commands::Sync(cmd)) => {
            let app = App::open(&config).await?;
            cmd.run(&app.use_cases, &config).await?;
        }
        Some(Commands::Prefs(cmd)) => {
            let app = App::open(&config).await?;
            cmd.run(&app.preferences).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
