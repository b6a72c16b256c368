//! Typed failures surfaced by the gateway and the favorites store.

use thiserror::Error;

/// Message shown when the search input is blank.
pub const EMPTY_CITY_MESSAGE: &str = "Please enter a city name.";

/// Message shown for every gateway failure.
pub const CITY_NOT_FOUND_MESSAGE: &str = "City not found";

/// Failure of a single weather gateway request.
///
/// Every variant renders to the same user-facing message; the variants only
/// exist to keep the cause visible in logs.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City '{city}' not found (HTTP {status})")]
    NotFound { city: String, status: u16 },

    #[error("Request for '{city}' failed: {source}")]
    Network {
        city: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response for '{city}': {reason}")]
    InvalidResponse { city: String, reason: String },
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        CITY_NOT_FOUND_MESSAGE
    }

    pub fn city(&self) -> &str {
        match self {
            WeatherError::NotFound { city, .. }
            | WeatherError::Network { city, .. }
            | WeatherError::InvalidResponse { city, .. } => city,
        }
    }
}

/// Failure of a favorites mutation.
#[derive(Debug, Error)]
pub enum FavoritesError {
    #[error("Favorite index {index} is out of range (list has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to persist favorites: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl FavoritesError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FavoritesError::IndexOutOfRange { .. } => "That favorite no longer exists.",
            FavoritesError::Storage(_) => "Favorites could not be saved. Please try again.",
        }
    }
}
