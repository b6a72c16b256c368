use futures_util::future::join_all;

use crate::{
    gateway::WeatherGateway,
    model::{UnitSystem, WeatherSnapshot},
};

/// How per-city results are combined into the favorites weather list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Keep results only if every city succeeded; otherwise the list is empty.
    AllOrNothing,
}

/// Policy used by [`refresh_favorites`].
///
/// One failing favorite blanks the weather of all favorites. That keeps the
/// result either fully aligned with the favorites list or empty.
pub const REFRESH_POLICY: RefreshPolicy = RefreshPolicy::AllOrNothing;

/// Fetch current weather for every city concurrently.
///
/// The result has the same length and order as `cities`, or is empty if any
/// request failed.
pub async fn refresh_favorites(
    gateway: &dyn WeatherGateway,
    cities: &[String],
    units: UnitSystem,
) -> Vec<WeatherSnapshot> {
    if cities.is_empty() {
        return Vec::new();
    }

    let results = join_all(cities.iter().map(|city| gateway.fetch_current(city, units))).await;

    match REFRESH_POLICY {
        RefreshPolicy::AllOrNothing => {
            match results.into_iter().collect::<Result<Vec<_>, _>>() {
                Ok(snapshots) => {
                    tracing::info!(count = snapshots.len(), %units, "refreshed favorites weather");
                    snapshots
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "error fetching favorite city weather; discarding all results"
                    );
                    Vec::new()
                }
            }
        }
    }
}
