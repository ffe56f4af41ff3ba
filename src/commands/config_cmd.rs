use clap::{Args, Subcommand};
use std::fmt::Write;

use super::OutputFormat;
use feature_sync::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let ConfigSubcommand::Show { format } = &self.command;
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
            OutputFormat::Text => print!("{}", summary(config)?),
        }
        Ok(())
    }
}

/// Aligned key/value listing of the effective configuration.
fn summary(config: &Config) -> Result<String, std::fmt::Error> {
    let file = match &config.config_file {
        Some(path) => path.display().to_string(),
        None => format!("{} (not found)", Config::default_config_path().display()),
    };
    let api = &config.api;
    let mode = if api.is_configured() { "online" } else { "offline" };

    let mut out = String::new();
    writeln!(out, "feature {} ({} mode)", env!("CARGO_PKG_VERSION"), mode)?;
    writeln!(out, "{:<14} {}", "config file", file)?;
    writeln!(
        out,
        "{:<14} {} [{}]",
        "cache",
        config.database_path.value.display(),
        config.database_path.source
    )?;
    writeln!(out, "{:<14} {}", "server", api.base_url.as_deref().unwrap_or("-"))?;
    writeln!(
        out,
        "{:<14} {}",
        "api key",
        if api.api_key.is_some() { "set" } else { "-" }
    )?;
    writeln!(out, "{:<14} {}s", "timeout", api.timeout_secs)?;
    writeln!(out, "{:<14} {}", "search limit", api.search_limit)?;
    writeln!(
        out,
        "{:<14} {}",
        "auto-sync",
        if api.auto_sync { "on" } else { "off" }
    )?;
    Ok(out)
}
