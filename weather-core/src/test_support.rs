//! In-process gateway and store used by unit tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::{
    collections::HashSet,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    error::WeatherError,
    gateway::WeatherGateway,
    model::{ForecastDay, UnitSystem, WeatherSnapshot},
    storage::{KeyValueStore, MemoryStore},
};

#[derive(Debug, Default)]
pub struct FakeGateway {
    failing: HashSet<String>,
    failing_current: HashSet<String>,
    failing_forecast: HashSet<String>,
    current_calls: AtomicUsize,
    forecast_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request for `city` fails.
    pub fn failing_for(mut self, city: &str) -> Self {
        self.failing.insert(city.to_string());
        self
    }

    /// Only the current weather request for `city` fails.
    pub fn failing_current_for(mut self, city: &str) -> Self {
        self.failing_current.insert(city.to_string());
        self
    }

    /// Only the forecast request for `city` fails.
    pub fn failing_forecast_for(mut self, city: &str) -> Self {
        self.failing_forecast.insert(city.to_string());
        self
    }

    pub fn current_calls(&self) -> usize {
        self.current_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_calls(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    pub fn temperature_for(units: UnitSystem) -> f64 {
        match units {
            UnitSystem::Metric => 20.0,
            UnitSystem::Imperial => 68.0,
        }
    }

    fn not_found(city: &str) -> WeatherError {
        WeatherError::NotFound { city: city.to_string(), status: 404 }
    }
}

#[async_trait]
impl WeatherGateway for FakeGateway {
    async fn fetch_current(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.current_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(city) || self.failing_current.contains(city) {
            return Err(Self::not_found(city));
        }

        Ok(WeatherSnapshot {
            city_name: city.to_string(),
            temperature: Self::temperature_for(units),
            description: "clear sky".to_string(),
            humidity_pct: 40,
        })
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        units: UnitSystem,
    ) -> Result<Vec<ForecastDay>, WeatherError> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(city) || self.failing_forecast.contains(city) {
            return Err(Self::not_found(city));
        }

        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        Ok(start
            .iter_days()
            .take(5)
            .map(|date| ForecastDay {
                date,
                temperature: Self::temperature_for(units),
                description: "few clouds".to_string(),
            })
            .collect())
    }
}

/// Memory-backed store whose writes can be switched to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        Ok(())
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.check_writable()?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.check_writable()?;
        self.inner.remove(key)
    }
}
