use clap::ValueEnum;

mod config_cmd;
mod feature;
mod prefs;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use feature::FeatureCommand;
pub use prefs::PrefsCommand;
pub use sync_cmd::{try_auto_sync, SyncCommand};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
