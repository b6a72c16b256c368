//! Core library for the `cityweather` widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather gateway (current conditions and 5-day forecast)
//! - Key-value persistence and the favorites store
//! - The concurrent favorites refresher
//! - View state for a front-end to render and drive
//!
//! It is used by `cityweather-cli`, but can also be reused by other front-ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod model;
pub mod refresh;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use controller::{FavoriteRow, SearchStatus, TableMode, WeatherApp};
pub use error::{FavoritesError, WeatherError};
pub use favorites::FavoritesStore;
pub use gateway::{WeatherGateway, gateway_from_config, openweather::OpenWeatherGateway};
pub use model::{ForecastDay, UnitSystem, WeatherSnapshot};
pub use refresh::{REFRESH_POLICY, RefreshPolicy, refresh_favorites};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
