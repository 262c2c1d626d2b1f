use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    ForecastError, LocationCandidate, RawForecastPayload,
    config::ApiConfig,
    provider::{ForecastProvider, SEARCH_RESULTS_LIMIT, UnitOptions},
};

pub const HOURLY_VARIABLES: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "weather_code",
    "wind_speed_10m",
    "precipitation",
    "precipitation_probability",
    "cloud_cover",
    "wind_gusts_10m",
];

pub const DAILY_VARIABLES: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "precipitation_sum",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "sunrise",
    "sunset",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
];

pub const CURRENT_VARIABLES: &[&str] = &[
    "temperature_2m",
    "apparent_temperature",
    "relative_humidity_2m",
    "weather_code",
    "wind_speed_10m",
    "precipitation",
    "cloud_cover",
    "wind_direction_10m",
    "wind_gusts_10m",
];

/// Open-Meteo forecast and geocoding client. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    api: ApiConfig,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(api: ApiConfig) -> Self {
        Self { api, http: Client::new() }
    }

    pub fn with_client(api: ApiConfig, http: Client) -> Self {
        Self { api, http }
    }

    /// Query string of a forecast request.
    ///
    /// `timezone=auto` makes the provider report local times of the
    /// queried coordinates rather than of the caller.
    pub fn forecast_query(
        &self,
        latitude: f64,
        longitude: f64,
        units: UnitOptions,
    ) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("timezone", "auto".to_string()),
            ("temperature_unit", units.temperature_unit.as_str().to_string()),
            ("wind_speed_unit", units.wind_speed_unit.as_str().to_string()),
            ("precipitation_unit", self.api.precipitation_unit.clone()),
            ("forecast_days", self.api.forecast_days.to_string()),
            ("hourly", HOURLY_VARIABLES.join(",")),
            ("daily", DAILY_VARIABLES.join(",")),
            ("current", CURRENT_VARIABLES.join(",")),
        ]
    }

    /// Issue one GET and return the body of a successful response.
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &'static str,
    ) -> Result<String, ForecastError> {
        debug!(url, what, "sending provider request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ForecastError::network(what, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| ForecastError::network(what, e))?;

        if !status.is_success() {
            warn!(%status, what, "provider request failed");
            return Err(ForecastError::Provider {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        debug!(%status, bytes = body.len(), what, "provider request succeeded");
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    id: Option<i64>,
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

impl From<GeocodingResult> for LocationCandidate {
    fn from(result: GeocodingResult) -> Self {
        let id = match result.id {
            Some(id) => id.to_string(),
            None => format!("{:.4},{:.4}", result.latitude, result.longitude),
        };

        LocationCandidate {
            id,
            name: result.name,
            region: result.admin1.or_else(|| result.country.clone()),
            country: result.country,
            latitude: result.latitude,
            longitude: result.longitude,
        }
    }
}

fn parse_candidates(body: &str) -> Result<Vec<LocationCandidate>, ForecastError> {
    let parsed: GeocodingResponse = serde_json::from_str(body)
        .map_err(|e| ForecastError::malformed(format!("geocoding response: {e}")))?;

    Ok(parsed
        .results
        .unwrap_or_default()
        .into_iter()
        .take(SEARCH_RESULTS_LIMIT)
        .map(LocationCandidate::from)
        .collect())
}

#[async_trait]
impl ForecastProvider for OpenMeteoProvider {
    async fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        units: UnitOptions,
    ) -> Result<RawForecastPayload, ForecastError> {
        let query = self.forecast_query(latitude, longitude, units);
        let body = self.get(&self.api.forecast_url, &query, "fetching forecast").await?;

        serde_json::from_str(&body)
            .map_err(|e| ForecastError::malformed(format!("forecast response: {e}")))
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<LocationCandidate>, ForecastError> {
        let params = [
            ("name", query.to_string()),
            ("count", SEARCH_RESULTS_LIMIT.to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let body = self.get(&self.api.geocoding_url, &params, "searching locations").await?;

        parse_candidates(&body)
    }

    async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<LocationCandidate>, ForecastError> {
        let params = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let body =
            self.get(&self.api.reverse_geocoding_url, &params, "reverse geocoding").await?;

        Ok(parse_candidates(&body)?.into_iter().next())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
