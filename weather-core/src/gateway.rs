use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    gateway::openweather::OpenWeatherGateway,
    model::{ForecastDay, UnitSystem, WeatherSnapshot},
};

pub mod openweather;

/// Number of 3-hour forecast entries per day.
pub const FORECAST_STRIDE: usize = 8;

/// Read-only access to current conditions and the 5-day forecast.
///
/// Callers must pass a non-empty, trimmed city name.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError>;

    async fn fetch_forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<Vec<ForecastDay>, WeatherError>;
}

/// Keep one entry per day out of a 3-hour series: indices 0, 8, 16, ...
///
/// This is a positional policy. It does not look at timestamps, so the kept
/// entries are roughly 24h apart rather than aligned to any time of day.
pub fn downsample_forecast<T>(entries: impl IntoIterator<Item = T>) -> Vec<T> {
    entries.into_iter().step_by(FORECAST_STRIDE).collect()
}

/// Construct the OpenWeather gateway from config.
pub fn gateway_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherGateway>> {
    let gateway = OpenWeatherGateway::new(
        config.resolve_api_key(),
        &config.base_url,
        config.request_timeout(),
    )?;

    Ok(Box::new(gateway))
}
