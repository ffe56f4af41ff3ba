use clap::{Args, Subcommand, ValueEnum};

use feature_sync::db::Preferences;

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args)]
pub struct PrefsCommand {
    #[command(subcommand)]
    pub command: PrefsSubcommand,
}

#[derive(Subcommand)]
pub enum PrefsSubcommand {
    /// Show stored preferences
    Show,

    /// Turn notifications on or off
    Notifications {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Reset all preferences to their defaults
    Reset,
}

impl PrefsCommand {
    pub async fn run(&self, preferences: &Preferences) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PrefsSubcommand::Show => {
                let last_sync = preferences.last_sync_time().await?;
                let last_sync = match chrono::DateTime::from_timestamp_millis(last_sync) {
                    Some(at) if last_sync > 0 => at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    _ => "never".to_string(),
                };

                println!("Preferences");
                println!("===========\n");
                println!("last_sync_time:        {}", last_sync);
                println!(
                    "notifications_enabled: {}",
                    preferences.notifications_enabled().await?
                );
                println!("first_launch:          {}", preferences.is_first_launch().await?);
                Ok(())
            }

            PrefsSubcommand::Notifications { state } => {
                let enabled = matches!(state, Toggle::On);
                preferences.set_notifications_enabled(enabled).await?;
                println!(
                    "Notifications {}",
                    if enabled { "enabled" } else { "disabled" }
                );
                Ok(())
            }

            PrefsSubcommand::Reset => {
                preferences.clear_all().await?;
                println!("Preferences reset to defaults");
                Ok(())
            }
        }
    }
}
