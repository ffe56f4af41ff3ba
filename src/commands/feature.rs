use clap::Subcommand;
use std::io::{self, Write};

use super::OutputFormat;
use feature_sync::models::Feature;
use feature_sync::presentation::{MainState, MainViewModel};
use feature_sync::usecases::UseCases;

#[derive(Subcommand)]
pub enum FeatureCommand {
    /// List features from the local cache
    List {
        /// Include inactive features
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a feature's details
    Show {
        /// Feature ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new feature
    Create {
        /// Title of the feature
        title: String,

        /// Description of the feature
        #[arg(long, short)]
        description: String,

        /// Create the feature as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update an existing feature
    Update {
        /// Feature ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, short)]
        description: Option<String>,

        /// Mark the feature active
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Mark the feature inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Delete a feature
    Delete {
        /// Feature ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Search features on the server
    Search {
        /// Text to look for in titles and descriptions
        query: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the feature list every time it changes (Ctrl-C to stop)
    Watch {
        /// Include inactive features
        #[arg(long)]
        all: bool,
    },
}

impl FeatureCommand {
    /// Returns true for commands that only read the local cache.
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            FeatureCommand::List { .. } | FeatureCommand::Show { .. } | FeatureCommand::Watch { .. }
        )
    }

    pub async fn run(&self, use_cases: &UseCases) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            FeatureCommand::List { all, format } => {
                let features = first_snapshot(use_cases, *all).await?;

                if features.is_empty() {
                    println!("No features found");
                    return Ok(());
                }
                print_features(&features, format)?;
                Ok(())
            }

            FeatureCommand::Show { id, format } => match use_cases.get.by_id(id).await? {
                Some(feature) => {
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&feature)?);
                        }
                        OutputFormat::Text => {
                            println!("{}", feature);
                        }
                    }
                    Ok(())
                }
                None => Err(format!("Feature not found: {}", id).into()),
            },

            FeatureCommand::Create {
                title,
                description,
                inactive,
            } => {
                let feature = Feature::new(title.trim(), description.trim()).with_active(!inactive);
                let created = use_cases.save.create(&feature).await?;

                if created.is_local() {
                    println!("Created feature locally (server unavailable):");
                } else {
                    println!("Created feature:");
                }
                println!("{}", created);
                Ok(())
            }

            FeatureCommand::Update {
                id,
                title,
                description,
                active,
                inactive,
            } => {
                if title.is_none() && description.is_none() && !active && !inactive {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let mut feature = match use_cases.get.by_id(id).await? {
                    Some(f) => f,
                    None => return Err(format!("Feature not found: {}", id).into()),
                };

                if let Some(new_title) = title {
                    feature.title = new_title.clone();
                }
                if let Some(new_description) = description {
                    feature.description = new_description.clone();
                }
                if *active {
                    feature.is_active = true;
                }
                if *inactive {
                    feature.is_active = false;
                }

                let updated = use_cases.save.update(&feature).await?;
                println!("Updated feature:");
                println!("{}", updated);
                Ok(())
            }

            FeatureCommand::Delete { id, force } => {
                let feature = match use_cases.get.by_id(id).await? {
                    Some(f) => f,
                    None => return Err(format!("Feature not found: {}", id).into()),
                };

                // Confirm deletion unless --force is used
                if !force {
                    print!("Delete feature '{}'? [y/N] ", feature.title);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                use_cases.save.delete(&feature.id).await?;
                println!("Deleted feature: {}", feature.title);
                Ok(())
            }

            FeatureCommand::Search { query, format } => {
                let features = use_cases.get.search(query).await?;

                if features.is_empty() {
                    println!("No features match '{}'", query.trim());
                    return Ok(());
                }
                print_features(&features, format)?;
                Ok(())
            }

            FeatureCommand::Watch { all } => watch(use_cases, *all).await,
        }
    }
}

/// Current contents of the local cache.
async fn first_snapshot(
    use_cases: &UseCases,
    all: bool,
) -> Result<Vec<Feature>, Box<dyn std::error::Error>> {
    use futures::StreamExt;

    let mut stream = if all {
        use_cases.get.all()
    } else {
        use_cases.get.active()
    };
    match stream.next().await {
        Some(snapshot) => Ok(snapshot?),
        None => Ok(Vec::new()),
    }
}

fn print_features(
    features: &[Feature],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(features)?);
        }
        OutputFormat::Text => {
            println!("{:<36}  {:<30}  ACTIVE", "ID", "TITLE");
            println!("{}", "-".repeat(76));
            for feature in features {
                let title = if feature.title.chars().count() > 30 {
                    format!("{}...", feature.title.chars().take(27).collect::<String>())
                } else {
                    feature.title.clone()
                };
                println!(
                    "{:<36}  {:<30}  {}",
                    feature.id,
                    title,
                    if feature.is_active { "yes" } else { "no" }
                );
            }
            println!("\nTotal: {} feature(s)", features.len());
        }
    }
    Ok(())
}

async fn watch(use_cases: &UseCases, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut view_model = MainViewModel::new(use_cases.clone());
    if all {
        view_model.toggle_show_only_active();
    }
    let mut state = view_model.state();

    println!("Watching features (Ctrl-C to stop)");
    loop {
        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn print_snapshot(state: &MainState) {
    if state.is_loading {
        return;
    }
    if let Some(error) = &state.error {
        eprintln!("Error: {}", error);
        return;
    }

    println!();
    if state.is_empty() {
        println!("No features found");
        return;
    }
    for feature in &state.features {
        let marker = if feature.is_active { "*" } else { " " };
        println!("{} {:<36}  {}", marker, feature.id, feature.title);
    }
}
