use anyhow::{Context, bail};
use chrono::{Local, Timelike, Utc};
use clap::{Parser, Subcommand};
use inquire::Select;
use luma_core::{
    Config, Location, LocationCandidate, PreferencesPatch, Snapshot, WeatherState,
    messages::ThreadRandom,
    model::{Notifications, TemperatureUnit, Theme, TimeFormat, WindSpeedUnit},
    provider_from_config,
    store::FileStore,
};
use std::fmt;
use tracing::warn;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "luma", version, about = "A cozy weather dashboard for your terminal")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Dashboard(DashboardCommand),

    /// Inspect or edit the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Commands that work on the restored dashboard state.
#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// Refresh and show the forecast for the active location.
    Show {
        /// Number of hourly entries to print (at most 24).
        #[arg(long, default_value_t = 12)]
        hourly: usize,

        /// Print the whole snapshot as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search places by name.
    Search { query: String },

    /// Search for a place and save the one you pick.
    Add { query: String },

    /// Switch to a saved location.
    Use { id: String },

    /// Use raw coordinates, naming them by reverse lookup when possible.
    Here {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// List saved locations, favorites first.
    Locations,

    /// Remove a saved location.
    Remove { id: String },

    /// Toggle the favorite flag of a saved location.
    Favorite { id: String },

    /// Give a saved location a nickname.
    Rename { id: String, nickname: String },

    /// Give a saved location an emoji.
    Emoji { id: String, emoji: String },

    /// Show preferences, or change the ones given.
    Prefs {
        #[arg(long)]
        temperature_unit: Option<TemperatureUnit>,
        #[arg(long)]
        wind_speed_unit: Option<WindSpeedUnit>,
        #[arg(long)]
        time_format: Option<TimeFormat>,
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        feels_like: Option<bool>,
        #[arg(long)]
        cute: Option<bool>,
        /// Name used in greetings (20 characters max).
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        daily_notification: Option<bool>,
        #[arg(long)]
        rain_notification: Option<bool>,
        /// Time of the daily notification, HH:MM.
        #[arg(long)]
        notification_time: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration.
    Show,
    /// Print the configuration file path.
    Path,
    /// Change endpoints or the log filter.
    Set {
        #[arg(long)]
        forecast_url: Option<String>,
        #[arg(long)]
        geocoding_url: Option<String>,
        #[arg(long)]
        reverse_geocoding_url: Option<String>,
        #[arg(long)]
        log_filter: Option<String>,
    },
}

/// Search candidate as shown in the interactive picker.
struct CandidateOption(LocationCandidate);

impl fmt::Display for CandidateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::candidate(&self.0))
    }
}

impl Cli {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Config { action } => run_config(action, config),
            Command::Dashboard(command) => run_dashboard(command, &config).await,
        }
    }
}

/// Restore state from the store, run one command and persist the result.
async fn run_dashboard(command: DashboardCommand, config: &Config) -> anyhow::Result<()> {
    let store_path = config.store_file_path()?;
    let mut store = FileStore::open(&store_path)?;
    let state = WeatherState::restore(provider_from_config(config), &store);

    match command {
        DashboardCommand::Show { hourly, json } => {
            state.refresh().await;
            let snapshot = state.snapshot();

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                print_dashboard(&snapshot, hourly);
            }

            if snapshot.current_weather.is_none() {
                bail!("{}", snapshot.error.as_deref().unwrap_or("No weather data available"));
            }
        }
        DashboardCommand::Search { query } => {
            let candidates = state.provider().search_locations(&query).await?;
            if candidates.is_empty() {
                println!("No places found for '{query}'.");
            }
            for candidate in &candidates {
                println!("{}", render::candidate(candidate));
            }
        }
        DashboardCommand::Add { query } => {
            let candidates = state.provider().search_locations(&query).await?;
            if candidates.is_empty() {
                bail!("No places found for '{query}'.");
            }

            let options = candidates.into_iter().map(CandidateOption).collect();
            let picked = Select::new("Which place?", options)
                .prompt()
                .context("No location selected")?;

            let location = Location::from(picked.0);
            let name = location.name.clone();
            state.add_location(location)?;
            println!("Saved {name}.");
        }
        DashboardCommand::Use { id } => {
            state.select_location(&id)?;
            state.refresh_if_needed().await;
            print_dashboard(&state.snapshot(), 0);
        }
        DashboardCommand::Here { lat, lon } => {
            let location = match state.provider().reverse_lookup(lat, lon).await {
                Ok(Some(candidate)) => Location::from(candidate),
                Ok(None) => Location::from_coordinates(lat, lon, Utc::now()),
                Err(err) => {
                    warn!(error = %err, "reverse lookup failed, using coordinates");
                    Location::from_coordinates(lat, lon, Utc::now())
                }
            };
            state.set_current_location(location);
            state.refresh_if_needed().await;
            print_dashboard(&state.snapshot(), 0);
        }
        DashboardCommand::Locations => {
            print!("{}", state.read(render::locations));
        }
        DashboardCommand::Remove { id } => {
            state.remove_location(&id)?;
            println!("Removed {id}.");
        }
        DashboardCommand::Favorite { id } => {
            let favorite = state.toggle_favorite(&id)?;
            println!("{id} is {}a favorite.", if favorite { "now " } else { "no longer " });
        }
        DashboardCommand::Rename { id, nickname } => {
            state.rename_location(&id, &nickname)?;
            print!("{}", state.read(render::locations));
        }
        DashboardCommand::Emoji { id, emoji } => {
            state.set_location_emoji(&id, &emoji)?;
            print!("{}", state.read(render::locations));
        }
        DashboardCommand::Prefs {
            temperature_unit,
            wind_speed_unit,
            time_format,
            theme,
            feels_like,
            cute,
            name,
            daily_notification,
            rain_notification,
            notification_time,
        } => {
            let notifications = if daily_notification.is_some()
                || rain_notification.is_some()
                || notification_time.is_some()
            {
                let current = state.read(|s| s.preferences.notifications.clone());
                Some(Notifications {
                    daily_forecast: daily_notification.unwrap_or(current.daily_forecast),
                    rain_notifications: rain_notification.unwrap_or(current.rain_notifications),
                    daily_time: notification_time.unwrap_or(current.daily_time),
                })
            } else {
                None
            };

            let patch = PreferencesPatch {
                temperature_unit,
                wind_speed_unit,
                time_format,
                theme,
                show_feels_like: feels_like,
                cute_language: cute,
                user_name: name,
                notifications,
            };

            if !patch.is_empty() {
                state.update_preferences(patch);
            }
            print!("{}", state.read(|s| render::preferences(&s.preferences)));
        }
    }

    state.persist(&mut store)?;
    Ok(())
}

fn print_dashboard(snapshot: &Snapshot, hourly: usize) {
    print!("{}", render::dashboard(snapshot, hourly, Local::now().hour(), &mut ThreadRandom));
}

fn run_config(action: ConfigAction, mut config: Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::config_file_path()?.display());
        }
        ConfigAction::Set { forecast_url, geocoding_url, reverse_geocoding_url, log_filter } => {
            if let Some(url) = forecast_url {
                config.api.forecast_url = url;
            }
            if let Some(url) = geocoding_url {
                config.api.geocoding_url = url;
            }
            if let Some(url) = reverse_geocoding_url {
                config.api.reverse_geocoding_url = url;
            }
            if let Some(filter) = log_filter {
                config.log_filter = Some(filter);
            }
            config.save()?;
            println!("Saved {}", Config::config_file_path()?.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["luma", "here", "--lat", "33.749", "--lon", "-84.388"]).unwrap();
        match cli.command {
            Command::Dashboard(DashboardCommand::Here { lat, lon }) => {
                assert_eq!(lat, 33.749);
                assert_eq!(lon, -84.388);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parses_unit_preferences() {
        let cli = Cli::try_parse_from([
            "luma",
            "prefs",
            "--temperature-unit",
            "celsius",
            "--wind-speed-unit",
            "kmh",
            "--time-format",
            "24h",
        ])
        .unwrap();

        match cli.command {
            Command::Dashboard(DashboardCommand::Prefs {
                temperature_unit, wind_speed_unit, time_format, ..
            }) => {
                assert_eq!(temperature_unit, Some(TemperatureUnit::Celsius));
                assert_eq!(wind_speed_unit, Some(WindSpeedUnit::Kmh));
                assert_eq!(time_format, Some(TimeFormat::H24));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_and_dashboard_commands_share_the_top_level() {
        let cli = Cli::try_parse_from(["luma", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Command::Config { action: ConfigAction::Path }));

        let cli = Cli::try_parse_from(["luma", "-v", "show", "--hourly", "6"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Command::Dashboard(DashboardCommand::Show { hourly: 6, json: false })
        ));

        let cli = Cli::try_parse_from(["luma", "locations"]).unwrap();
        assert!(matches!(cli.command, Command::Dashboard(DashboardCommand::Locations)));
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(Cli::try_parse_from(["luma", "prefs", "--temperature-unit", "kelvin"]).is_err());
    }
}
