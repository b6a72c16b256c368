//! View state for the weather widget.
//!
//! [`WeatherApp`] owns everything a front-end renders: the search input and
//! its results, the unit system, the favorites table and its edit state.
//! Every user action is an `async fn` taking `&mut self`, so actions never
//! overlap and the latest action's results are always the ones displayed.
//! Independent requests inside one action (weather and forecast, or the
//! favorites fan-out) still run concurrently.

use std::sync::Arc;

use crate::{
    error::{EMPTY_CITY_MESSAGE, FavoritesError, WeatherError},
    favorites::FavoritesStore,
    gateway::WeatherGateway,
    model::{ForecastDay, UnitSystem, WeatherSnapshot},
    refresh::refresh_favorites,
    storage::{KeyValueStore, LAST_CITY_KEY},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Idle,
    Ready,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TableMode {
    #[default]
    Viewing,
    Editing { index: usize, text: String },
}

/// One row of the favorites table as a front-end should draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteRow<'a> {
    pub index: usize,
    pub city: &'a str,
    /// `None` renders as "Loading...".
    pub weather: Option<&'a WeatherSnapshot>,
    /// In-progress edit text when this row is being edited.
    pub edit_text: Option<&'a str>,
}

struct SearchOutcome {
    weather: Result<WeatherSnapshot, WeatherError>,
    forecast: Result<Vec<ForecastDay>, WeatherError>,
}

#[derive(Debug)]
pub struct WeatherApp {
    gateway: Arc<dyn WeatherGateway>,
    storage: Arc<dyn KeyValueStore>,
    favorites: FavoritesStore,
    units: UnitSystem,
    city: String,
    weather: Option<WeatherSnapshot>,
    forecast: Vec<ForecastDay>,
    error: Option<String>,
    status: SearchStatus,
    favorite_weather: Vec<WeatherSnapshot>,
    table: TableMode,
}

impl WeatherApp {
    /// Build an app with nothing loaded yet; call [`WeatherApp::init`] next.
    pub fn new(
        gateway: Arc<dyn WeatherGateway>,
        storage: Arc<dyn KeyValueStore>,
        units: UnitSystem,
    ) -> Self {
        Self {
            gateway,
            favorites: FavoritesStore::empty(storage.clone()),
            storage,
            units,
            city: String::new(),
            weather: None,
            forecast: Vec::new(),
            error: None,
            status: SearchStatus::Idle,
            favorite_weather: Vec::new(),
            table: TableMode::Viewing,
        }
    }

    /// Restore the last search and the favorites, then fetch both at once.
    pub async fn init(&mut self) {
        self.restore();

        let city = self.city.trim().to_string();
        let units = self.units;

        match (city.is_empty(), self.favorites.is_empty()) {
            (true, true) => {}
            (false, true) => self.search().await,
            (true, false) => self.refresh().await,
            (false, false) => {
                let gateway = &*self.gateway;
                let (outcome, snapshots) = tokio::join!(
                    fetch_search(gateway, &city, units),
                    refresh_favorites(gateway, self.favorites.cities(), units),
                );
                self.apply_search(&city, outcome);
                self.favorite_weather = snapshots;
            }
        }
    }

    /// Read the last searched city and the favorites without fetching.
    ///
    /// Storage problems are logged and treated as "nothing saved".
    pub fn restore(&mut self) {
        match self.storage.get(LAST_CITY_KEY) {
            Ok(Some(city)) => self.city = city,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "could not read last searched city"),
        }

        match FavoritesStore::load(self.storage.clone()) {
            Ok(favorites) => self.favorites = favorites,
            Err(e) => tracing::warn!(error = ?e, "could not load favorites"),
        }
    }

    pub fn set_city(&mut self, city: impl Into<String>) {
        self.city = city.into();
    }

    /// Set the input and search for it.
    pub async fn search_city(&mut self, city: &str) {
        self.set_city(city);
        self.search().await;
    }

    /// Search for the current input.
    ///
    /// Weather and forecast are fetched concurrently and applied
    /// independently: a failed forecast does not hide a good weather reading,
    /// and the other way round.
    pub async fn search(&mut self) {
        let city = self.city.trim().to_string();
        if city.is_empty() {
            self.reject_empty_search();
            return;
        }

        let outcome = fetch_search(&*self.gateway, &city, self.units).await;
        self.apply_search(&city, outcome);
    }

    /// Flip metric/imperial and re-fetch everything on display.
    pub async fn toggle_units(&mut self) {
        self.units = self.units.toggled();
        tracing::info!(units = %self.units, "switched unit system");

        let city = self.city.trim().to_string();
        if city.is_empty() {
            self.refresh().await;
            return;
        }

        let gateway = &*self.gateway;
        let (outcome, snapshots) = tokio::join!(
            fetch_search(gateway, &city, self.units),
            refresh_favorites(gateway, self.favorites.cities(), self.units),
        );
        self.apply_search(&city, outcome);
        self.favorite_weather = snapshots;
    }

    /// Save the current input as a favorite and clear the input.
    ///
    /// Blank input or a city already saved is ignored; returns whether the
    /// list changed.
    pub async fn add_favorite(&mut self) -> Result<bool, FavoritesError> {
        let before = self.favorites.len();
        let city = self.city.clone();
        self.favorites.add(&city)?;

        if self.favorites.len() == before {
            return Ok(false);
        }

        self.city.clear();
        self.refresh().await;
        Ok(true)
    }

    pub async fn remove_favorite(&mut self, index: usize) -> Result<(), FavoritesError> {
        self.favorites.remove(index)?;
        // Row indices shift after a delete.
        self.table = TableMode::Viewing;
        self.refresh().await;
        Ok(())
    }

    /// Make `index` the editable row, seeded with its current name.
    pub fn start_edit(&mut self, index: usize) -> Result<(), FavoritesError> {
        let text = self
            .favorites
            .get(index)
            .ok_or(FavoritesError::IndexOutOfRange { index, len: self.favorites.len() })?
            .to_string();

        self.table = TableMode::Editing { index, text };
        Ok(())
    }

    /// Replace the in-progress edit text. Ignored when no row is being edited.
    pub fn set_edit_text(&mut self, new_text: impl Into<String>) {
        if let TableMode::Editing { text, .. } = &mut self.table {
            *text = new_text.into();
        }
    }

    /// Commit the edited name and refresh. No-op when not editing.
    ///
    /// On failure the row stays in edit mode with its text, so the user can
    /// retry.
    pub async fn save_edit(&mut self) -> Result<(), FavoritesError> {
        let TableMode::Editing { index, text } = &self.table else {
            return Ok(());
        };

        self.favorites.rename(*index, text)?;
        self.table = TableMode::Viewing;
        self.refresh().await;
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.table = TableMode::Viewing;
    }

    /// Forget the search input, its results and the saved last city.
    pub fn clear_search(&mut self) {
        self.city.clear();
        self.weather = None;
        self.forecast.clear();
        self.error = None;
        self.status = SearchStatus::Idle;

        if let Err(e) = self.storage.remove(LAST_CITY_KEY) {
            tracing::warn!(error = ?e, "could not forget last searched city");
        }
    }

    /// Re-fetch weather for every favorite in the current unit system.
    pub async fn refresh(&mut self) {
        self.favorite_weather =
            refresh_favorites(&*self.gateway, self.favorites.cities(), self.units).await;
    }

    fn reject_empty_search(&mut self) {
        self.error = Some(EMPTY_CITY_MESSAGE.to_string());
        self.weather = None;
        self.forecast.clear();
        self.status = SearchStatus::Failed;
    }

    fn apply_search(&mut self, city: &str, outcome: SearchOutcome) {
        let mut error = None;

        match outcome.weather {
            Ok(snapshot) => {
                self.weather = Some(snapshot);
                if let Err(e) = self.storage.set(LAST_CITY_KEY, city) {
                    tracing::warn!(error = ?e, "could not save last searched city");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "current weather request failed");
                self.weather = None;
                error = Some(e.user_message());
            }
        }

        match outcome.forecast {
            Ok(days) => self.forecast = days,
            Err(e) => {
                tracing::warn!(error = %e, "forecast request failed");
                self.forecast.clear();
                error = error.or(Some(e.user_message()));
            }
        }

        self.status = if error.is_some() { SearchStatus::Failed } else { SearchStatus::Ready };
        self.error = error.map(str::to_string);
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn weather(&self) -> Option<&WeatherSnapshot> {
        self.weather.as_ref()
    }

    pub fn forecast(&self) -> &[ForecastDay] {
        &self.forecast
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn favorites(&self) -> &[String] {
        self.favorites.cities()
    }

    pub fn favorite_weather(&self) -> &[WeatherSnapshot] {
        &self.favorite_weather
    }

    pub fn table_mode(&self) -> &TableMode {
        &self.table
    }

    pub fn favorite_rows(&self) -> Vec<FavoriteRow<'_>> {
        self.favorites
            .cities()
            .iter()
            .enumerate()
            .map(|(index, city)| FavoriteRow {
                index,
                city,
                weather: self.favorite_weather.get(index),
                edit_text: match &self.table {
                    TableMode::Editing { index: editing, text } if *editing == index => {
                        Some(text.as_str())
                    }
                    _ => None,
                },
            })
            .collect()
    }
}

async fn fetch_search(
    gateway: &dyn WeatherGateway,
    city: &str,
    units: UnitSystem,
) -> SearchOutcome {
    let (weather, forecast) =
        tokio::join!(gateway.fetch_current(city, units), gateway.fetch_forecast(city, units));
    SearchOutcome { weather, forecast }
}
