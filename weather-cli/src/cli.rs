use std::sync::Arc;

use anyhow::{Context, anyhow};
use cityweather_core::{
    Config, FavoritesError, FileStore, UnitSystem, WeatherApp, WeatherGateway, gateway_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{Password, Select};

use crate::{interactive, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather and favorites")]
pub struct Cli {
    /// Unit system for this run: metric or imperial. Defaults to the configured one.
    #[arg(long, global = true, value_parser = parse_units)]
    pub units: Option<UnitSystem>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name.
        city: String,
    },

    /// Manage favorite cities.
    #[command(subcommand)]
    Favorites(FavoritesCommand),

    /// Run the interactive widget (default).
    Interactive,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorites with their current weather.
    List,

    /// Add a city to the favorites.
    Add { city: String },

    /// Remove a favorite by its 1-based position.
    Remove { position: usize },

    /// Rename a favorite by its 1-based position.
    Rename { position: usize, name: String },
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    UnitSystem::try_from(value).map_err(|e| e.to_string())
}

/// Convert a 1-based position from the command line into an index.
fn to_index(position: usize) -> anyhow::Result<usize> {
    position.checked_sub(1).ok_or_else(|| anyhow!("Positions start at 1."))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city } => {
                let mut app = build_app(self.units)?;
                app.search_city(&city).await;
                print!("{}", render::search_results(&app));
                Ok(())
            }
            Command::Favorites(sub) => {
                let mut app = build_app(self.units)?;
                app.restore();
                run_favorites(&mut app, sub).await?;
                print!("{}", render::favorites_table(&app));
                Ok(())
            }
            Command::Interactive => {
                let mut app = build_app(self.units)?;
                interactive::run(&mut app).await
            }
        }
    }
}

async fn run_favorites(app: &mut WeatherApp, command: FavoritesCommand) -> anyhow::Result<()> {
    match command {
        FavoritesCommand::List => app.refresh().await,
        FavoritesCommand::Add { city } => {
            app.set_city(city.as_str());
            if !app.add_favorite().await.map_err(favorites_error)? {
                println!("'{city}' is already a favorite.");
                app.refresh().await;
            }
        }
        FavoritesCommand::Remove { position } => {
            app.remove_favorite(to_index(position)?).await.map_err(favorites_error)?;
        }
        FavoritesCommand::Rename { position, name } => {
            app.start_edit(to_index(position)?).map_err(favorites_error)?;
            app.set_edit_text(name);
            app.save_edit().await.map_err(favorites_error)?;
        }
    }
    Ok(())
}

fn favorites_error(e: FavoritesError) -> anyhow::Error {
    let message = e.user_message();
    anyhow::Error::new(e).context(message)
}

fn build_app(units: Option<UnitSystem>) -> anyhow::Result<WeatherApp> {
    let config = Config::load()?;
    let gateway: Arc<dyn WeatherGateway> = Arc::from(gateway_from_config(&config)?);
    let storage = Arc::new(FileStore::new(Config::storage_file_path()?));

    Ok(WeatherApp::new(gateway, storage, units.unwrap_or(config.default_units)))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Stored in the config file; OPENWEATHER_API_KEY overrides it")
        .prompt()
        .context("Failed to read API key")?;

    let units = Select::new("Default units:", vec![UnitSystem::Metric, UnitSystem::Imperial])
        .prompt()
        .context("Failed to read default units")?;

    config.set_api_key(api_key.trim().to_string());
    config.default_units = units;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
