use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde_json::json;
use weather_core::{
    Config, ConfigFile, OpenWeatherClient, WeatherOrchestrator, config::DEFAULT_BASE_URL,
};

use crate::output;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    /// Print JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,

    /// Show current weather and a four-day forecast for a city.
    Search {
        /// City name; several words are joined with spaces.
        #[arg(required = true)]
        city: Vec<String>,
    },

    /// Show current weather at a coordinate pair.
    Coords {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },

    /// Load weather for all favorite cities, or manage the list.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Show recent searches, or remove one.
    History {
        /// Show every remembered search, not just the suggestions.
        #[arg(long)]
        all: bool,

        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    /// Pin a city after checking its weather can be fetched.
    Add {
        #[arg(required = true)]
        city: Vec<String>,
    },
    /// Unpin a city.
    Remove {
        #[arg(required = true)]
        city: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryAction {
    /// Forget a past search.
    Remove {
        #[arg(required = true)]
        city: Vec<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let json = self.json;

        match self.command {
            Command::Configure => configure(),
            Command::Search { city } => {
                let mut orch = orchestrator()?;
                let weather = orch.search_city(&city.join(" ")).await?;

                if json {
                    print_json(&weather)
                } else {
                    let today = chrono::Local::now().date_naive();
                    print!("{}", output::city_weather(&weather, today));
                    Ok(())
                }
            }
            Command::Coords { lat, lon } => {
                let config = Config::load()?;
                let client = OpenWeatherClient::new(&config)?;
                let snapshot = client.fetch_current_by_coords(lat, lon).await?;

                if json {
                    print_json(&snapshot)
                } else {
                    print!("{}", output::snapshot(&snapshot));
                    Ok(())
                }
            }
            Command::Favorites { action: None } => {
                let orch = orchestrator()?;
                if orch.favorites().is_empty() {
                    println!("No favorite cities yet. Add one with `weather favorites add <city>`.");
                    return Ok(());
                }

                // Failed cities are already logged by the orchestrator; skip their cards.
                let mut results = std::pin::pin!(orch.load_favorites());
                while let Some((city, result)) = results.next().await {
                    let Ok(snapshot) = result else { continue };
                    if json {
                        println!("{}", json!({ "city": city, "weather": snapshot }));
                    } else {
                        println!("{}", output::favorite(&city, &snapshot));
                    }
                }
                Ok(())
            }
            Command::Favorites {
                action: Some(FavoritesAction::Add { city }),
            } => {
                let city = city.join(" ");
                let mut orch = orchestrator()?;
                let snapshot = orch.add_favorite(&city).await?;

                if json {
                    print_json(&snapshot)
                } else {
                    println!("{}", output::favorite(city.trim(), &snapshot));
                    Ok(())
                }
            }
            Command::Favorites {
                action: Some(FavoritesAction::Remove { city }),
            } => {
                let city = city.join(" ");
                let removed = orchestrator()?.remove_favorite(&city)?;
                report_removal(json, &city, removed, "favorites")
            }
            Command::History { action: None, all } => {
                let orch = orchestrator()?;
                let entries = if all {
                    orch.history()
                } else {
                    orch.history_suggestions()
                };

                if json {
                    print_json(&entries)
                } else {
                    print!(
                        "{}",
                        output::list("Recent searches", entries, "No searches yet.")
                    );
                    Ok(())
                }
            }
            Command::History {
                action: Some(HistoryAction::Remove { city }),
                ..
            } => {
                let city = city.join(" ");
                let removed = orchestrator()?.remove_history_entry(&city)?;
                report_removal(json, &city, removed, "search history")
            }
        }
    }
}

fn orchestrator() -> anyhow::Result<WeatherOrchestrator> {
    let config = Config::load()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "loaded configuration");
    WeatherOrchestrator::from_config(&config)
}

fn configure() -> anyhow::Result<()> {
    let mut file = ConfigFile::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    let current_base = file.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let base_url = inquire::Text::new("API base URL:")
        .with_default(&current_base)
        .prompt()
        .context("Failed to read base URL")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        anyhow::bail!("API key cannot be empty");
    }

    file.api_key = Some(api_key.to_string());
    file.base_url = (base_url.trim() != DEFAULT_BASE_URL).then(|| base_url.trim().to_string());

    let path = file.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn report_removal(json: bool, city: &str, removed: bool, list: &str) -> anyhow::Result<()> {
    let city = city.trim();
    if json {
        return print_json(&json!({ "city": city, "removed": removed }));
    }

    if removed {
        println!("Removed {city} from {list}.");
    } else {
        println!("{city} is not in {list}.");
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}
