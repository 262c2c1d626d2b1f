use crate::{
    Config, ForecastError, LocationCandidate, Preferences, RawForecastPayload,
    model::{TemperatureUnit, WindSpeedUnit},
    provider::open_meteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod open_meteo;

/// Most candidates a location search returns.
pub const SEARCH_RESULTS_LIMIT: usize = 5;

/// Units the provider should convert to before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UnitOptions {
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
}

impl From<&Preferences> for UnitOptions {
    fn from(prefs: &Preferences) -> Self {
        Self { temperature_unit: prefs.temperature_unit, wind_speed_unit: prefs.wind_speed_unit }
    }
}

/// External forecast and geocoding service. Every call is a single
/// request: no retry, no timeout, no fallback provider.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        units: UnitOptions,
    ) -> Result<RawForecastPayload, ForecastError>;

    /// Up to [`SEARCH_RESULTS_LIMIT`] candidates, best match first.
    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, ForecastError>;

    async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<LocationCandidate>, ForecastError>;
}

/// Construct the provider described by the configuration.
pub fn provider_from_config(config: &Config) -> Arc<dyn ForecastProvider> {
    Arc::new(OpenMeteoProvider::new(config.api.clone()))
}
