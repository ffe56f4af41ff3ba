//! Sync CLI commands for refreshing the local cache from the server.

use clap::{Args, Subcommand};

use feature_sync::config::Config;
use feature_sync::remote::{FeatureApi, HttpFeatureApi};
use feature_sync::usecases::UseCases;
use feature_sync::RemoteError;

/// Sync with remote server
#[derive(Args)]
pub struct SyncCommand {
    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and server status
    Status,
}

impl SyncCommand {
    pub async fn run(
        &self,
        use_cases: &UseCases,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            None => self.sync(use_cases, config).await,
            Some(SyncSubcommand::Status) => self.status(use_cases, config).await,
        }
    }

    async fn sync(
        &self,
        use_cases: &UseCases,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !config.api.is_configured() {
            return Err(RemoteError::NotConfigured.into());
        }

        println!("Syncing with server...");
        let count = use_cases.sync.sync().await?;
        println!(
            "✓ {} feature{} in local cache",
            count,
            if count == 1 { "" } else { "s" }
        );
        Ok(())
    }

    async fn status(
        &self,
        use_cases: &UseCases,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        let Some(base_url) = config.api.base_url.as_deref() else {
            println!("Status: Not configured (offline mode)");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  api:");
            println!("    base_url: \"http://localhost:8080\"");
            println!("    api_key: \"your-api-key\"");
            println!("    auto_sync: false");
            println!();
            println!("Or set environment variables:");
            println!("  FEATURE_API_URL");
            println!("  FEATURE_API_KEY");
            return Ok(());
        };

        println!("Server:    {}", base_url);
        match config.api.api_key.as_deref() {
            Some(key) => println!("API Key:   {}...", key.chars().take(8).collect::<String>()),
            None => println!("API Key:   (none)"),
        }
        println!(
            "Auto-sync: {}",
            if config.api.auto_sync {
                "enabled"
            } else {
                "disabled"
            }
        );
        match use_cases.sync.last_sync_time().await? {
            Some(at) => println!("Last sync: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            None => println!("Last sync: never"),
        }
        println!();

        print!("Server status: ");
        let api = HttpFeatureApi::from_config(&config.api)?;
        match api.get_all().await {
            Ok(features) => println!("✓ connected ({} features)", features.len()),
            Err(RemoteError::Http(_)) => println!("✗ unreachable"),
            Err(e) => println!("✗ error: {}", e),
        }

        Ok(())
    }
}

/// Syncs before a read command when `auto_sync` is enabled.
///
/// Failures are reported and otherwise ignored; the command still runs
/// against the local cache.
pub async fn try_auto_sync(use_cases: &UseCases, config: &Config) {
    if !config.api.auto_sync || !config.api.is_configured() {
        return;
    }

    if let Err(e) = use_cases.sync.sync().await {
        eprintln!("Auto-sync: {}", e);
    }
}
