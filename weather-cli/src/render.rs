use std::fmt::Write;

use cityweather_core::WeatherApp;

/// Error line, current weather and the forecast list.
pub fn search_results(app: &WeatherApp) -> String {
    let symbol = app.units().temperature_symbol();
    let mut out = String::new();

    if let Some(error) = app.error() {
        let _ = writeln!(out, "Error: {error}");
    }

    if let Some(weather) = app.weather() {
        let _ = writeln!(out, "Weather in {}", weather.city_name);
        let _ = writeln!(out, "  Temperature: {}{symbol}", weather.temperature);
        let _ = writeln!(out, "  Description: {}", weather.description);
        let _ = writeln!(out, "  Humidity: {}%", weather.humidity_pct);
    }

    if !app.forecast().is_empty() {
        let _ = writeln!(out, "5-Day Forecast");
        for day in app.forecast() {
            let _ = writeln!(
                out,
                "  {} ----- Temp: {}{symbol} ----- {}",
                day.date, day.temperature, day.description
            );
        }
    }

    out
}

/// Favorites table; rows without weather read "Loading...".
pub fn favorites_table(app: &WeatherApp) -> String {
    let rows = app.favorite_rows();
    if rows.is_empty() {
        return "No favorite cities yet.\n".to_string();
    }

    let symbol = app.units().temperature_symbol();
    let mut out = String::from("Favorite Cities\n");

    for row in rows {
        let name = match row.edit_text {
            Some(text) => format!("[editing: {text}]"),
            None => row.city.to_string(),
        };

        let details = match row.weather {
            Some(w) => format!(
                "Temperature: {}{symbol} | Description: {} | Humidity: {}%",
                w.temperature, w.description, w.humidity_pct
            ),
            None => "Loading...".to_string(),
        };

        let _ = writeln!(out, "  {}. {name:<24} {details}", row.index + 1);
    }

    out
}

/// Label for the unit toggle, e.g. "Switch to Fahrenheit".
pub fn toggle_label(app: &WeatherApp) -> String {
    format!("Switch to {}", app.units().toggled().scale_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use cityweather_core::{
        ForecastDay, KeyValueStore, MemoryStore, UnitSystem, WeatherError, WeatherGateway,
        WeatherSnapshot,
    };
    use std::sync::Arc;

    /// Answers every city with fixed readings; "Nowhere" is unknown.
    #[derive(Debug)]
    struct StaticGateway;

    #[async_trait]
    impl WeatherGateway for StaticGateway {
        async fn fetch_current(
            &self,
            city: &str,
            _units: UnitSystem,
        ) -> Result<WeatherSnapshot, WeatherError> {
            if city == "Nowhere" {
                return Err(WeatherError::NotFound { city: city.into(), status: 404 });
            }
            Ok(WeatherSnapshot {
                city_name: city.into(),
                temperature: 21.5,
                description: "clear sky".into(),
                humidity_pct: 35,
            })
        }

        async fn fetch_forecast(
            &self,
            _city: &str,
            _units: UnitSystem,
        ) -> Result<Vec<ForecastDay>, WeatherError> {
            Ok(vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                temperature: 19.0,
                description: "few clouds".into(),
            }])
        }
    }

    fn app_with(storage: Arc<MemoryStore>, units: UnitSystem) -> WeatherApp {
        WeatherApp::new(Arc::new(StaticGateway), storage, units)
    }

    fn app(units: UnitSystem) -> WeatherApp {
        app_with(Arc::new(MemoryStore::new()), units)
    }

    #[test]
    fn empty_state_renders_nothing_for_search() {
        assert_eq!(search_results(&app(UnitSystem::Metric)), "");
    }

    #[tokio::test]
    async fn search_results_use_unit_symbol() {
        let mut app = app(UnitSystem::Imperial);
        app.search_city("Paris").await;

        let out = search_results(&app);

        assert!(out.contains("Weather in Paris"));
        assert!(out.contains("Temperature: 21.5°F"));
        assert!(out.contains("Humidity: 35%"));
        assert!(out.contains("2024-06-01 ----- Temp: 19°F ----- few clouds"));
        assert!(!out.contains("Error"));
    }

    #[tokio::test]
    async fn failed_search_shows_error_line() {
        let mut app = app(UnitSystem::Metric);
        app.search_city("Nowhere").await;

        let out = search_results(&app);

        assert!(out.starts_with("Error: City not found"));
        assert!(!out.contains("Weather in"));
    }

    #[test]
    fn favorites_without_weather_show_loading() {
        let storage = Arc::new(MemoryStore::new());
        storage.set("favorites", r#"["Paris","Rome"]"#).unwrap();
        let mut app = app_with(storage, UnitSystem::Metric);
        app.restore();

        let table = favorites_table(&app);

        assert!(table.contains("1. Paris"));
        assert!(table.contains("2. Rome"));
        assert_eq!(table.matches("Loading...").count(), 2);
    }

    #[tokio::test]
    async fn refreshed_favorites_show_weather_and_edit_marker() {
        let storage = Arc::new(MemoryStore::new());
        storage.set("favorites", r#"["Paris","Rome"]"#).unwrap();
        let mut app = app_with(storage, UnitSystem::Metric);
        app.restore();
        app.refresh().await;
        app.start_edit(1).unwrap();
        app.set_edit_text("Milan");

        let table = favorites_table(&app);

        assert_eq!(table.matches("Temperature: 21.5°C").count(), 2);
        assert!(table.contains("[editing: Milan]"));
        assert!(!table.contains("Loading..."));
    }

    #[test]
    fn empty_favorites_message() {
        assert_eq!(favorites_table(&app(UnitSystem::Metric)), "No favorite cities yet.\n");
    }

    #[test]
    fn toggle_label_names_the_other_scale() {
        assert_eq!(toggle_label(&app(UnitSystem::Metric)), "Switch to Fahrenheit");
        assert_eq!(toggle_label(&app(UnitSystem::Imperial)), "Switch to Celsius");
    }
}
