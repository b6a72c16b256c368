use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::WeatherError,
    gateway::{WeatherGateway, downsample_forecast},
    model::{ForecastDay, UnitSystem, WeatherSnapshot},
};

const FORECAST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct OpenWeatherGateway {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherGateway {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `{base_url}/{endpoint}` and decode the body.
    ///
    /// Any non-success status is reported as "not found", whatever the code.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
        units: UnitSystem,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%city, %units, endpoint, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .map_err(|source| WeatherError::Network { city: city.to_string(), source })?;

        let status = res.status();
        if !status.is_success() {
            return Err(WeatherError::NotFound {
                city: city.to_string(),
                status: status.as_u16(),
            });
        }

        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Network { city: city.to_string(), source })?;

        serde_json::from_str(&body).map_err(|e| WeatherError::InvalidResponse {
            city: city.to_string(),
            reason: format!("{e} (body: {})", truncate_body(&body)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwForecastMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherGateway for OpenWeatherGateway {
    async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", city, units).await?;
        current_to_snapshot(city, parsed)
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<Vec<ForecastDay>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", city, units).await?;

        downsample_forecast(parsed.list)
            .into_iter()
            .map(|entry| forecast_entry_to_day(city, entry))
            .collect()
    }
}

fn current_to_snapshot(
    city: &str,
    parsed: OwCurrentResponse,
) -> Result<WeatherSnapshot, WeatherError> {
    let description = first_description(city, parsed.weather)?;

    Ok(WeatherSnapshot {
        city_name: parsed.name,
        temperature: parsed.main.temp,
        description,
        humidity_pct: parsed.main.humidity,
    })
}

fn forecast_entry_to_day(city: &str, entry: OwForecastEntry) -> Result<ForecastDay, WeatherError> {
    let date = NaiveDateTime::parse_from_str(&entry.dt_txt, FORECAST_TIME_FORMAT)
        .map_err(|e| WeatherError::InvalidResponse {
            city: city.to_string(),
            reason: format!("bad dt_txt '{}': {e}", entry.dt_txt),
        })?
        .date();

    Ok(ForecastDay {
        date,
        temperature: entry.main.temp,
        description: first_description(city, entry.weather)?,
    })
}

fn first_description(city: &str, weather: Vec<OwWeather>) -> Result<String, WeatherError> {
    weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| WeatherError::InvalidResponse {
            city: city.to_string(),
            reason: "response contained no weather description".to_string(),
        })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
