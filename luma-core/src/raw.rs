//! Untyped-ish forecast payload as the provider returns it.
//!
//! Each section holds parallel arrays keyed by variable name. Every array
//! is optional and every element nullable, because the provider emits
//! `null` for gaps; the normalizer decides what a gap means.

use serde::{Deserialize, Serialize};

pub type Series<T> = Option<Vec<Option<T>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawForecastPayload {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    /// Offset of the location's local time from UTC.
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub current: Option<RawCurrent>,
    #[serde(default)]
    pub hourly: Option<RawHourly>,
    #[serde(default)]
    pub daily: Option<RawDaily>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCurrent {
    pub time: Option<String>,
    pub temperature_2m: Option<f64>,
    pub apparent_temperature: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub weather_code: Option<i32>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub wind_gusts_10m: Option<f64>,
    pub precipitation: Option<f64>,
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHourly {
    /// Local timestamps, `YYYY-MM-DDTHH:MM`.
    pub time: Vec<String>,
    pub temperature_2m: Series<f64>,
    pub relative_humidity_2m: Series<f64>,
    pub weather_code: Series<i32>,
    pub wind_speed_10m: Series<f64>,
    pub precipitation: Series<f64>,
    pub precipitation_probability: Series<f64>,
    pub cloud_cover: Series<f64>,
    pub wind_gusts_10m: Series<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDaily {
    /// Local dates, `YYYY-MM-DD`.
    pub time: Vec<String>,
    pub weather_code: Series<i32>,
    pub temperature_2m_max: Series<f64>,
    pub temperature_2m_min: Series<f64>,
    pub precipitation_sum: Series<f64>,
    pub precipitation_probability_max: Series<f64>,
    pub wind_speed_10m_max: Series<f64>,
    pub wind_gusts_10m_max: Series<f64>,
    pub wind_direction_10m_dominant: Series<f64>,
    /// Local timestamps, `YYYY-MM-DDTHH:MM`.
    pub sunrise: Series<String>,
    pub sunset: Series<String>,
}

/// Number of leading entries of a series, 0 if the series is absent.
pub fn series_len<T>(series: &Series<T>) -> usize {
    series.as_ref().map_or(0, Vec::len)
}

/// Value at `index`, `None` if the series is absent, short, or null there.
pub fn value_at<T: Clone>(series: &Series<T>, index: usize) -> Option<T> {
    series.as_ref().and_then(|values| values.get(index)).and_then(Clone::clone)
}

impl RawHourly {
    /// Length every variable array shares with `time`.
    pub fn aligned_len(&self) -> usize {
        [
            self.time.len(),
            series_len(&self.temperature_2m),
            series_len(&self.relative_humidity_2m),
            series_len(&self.weather_code),
            series_len(&self.wind_speed_10m),
            series_len(&self.precipitation),
            series_len(&self.precipitation_probability),
            series_len(&self.cloud_cover),
            series_len(&self.wind_gusts_10m),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}

impl RawDaily {
    pub fn aligned_len(&self) -> usize {
        [
            self.time.len(),
            series_len(&self.weather_code),
            series_len(&self.temperature_2m_max),
            series_len(&self.temperature_2m_min),
            series_len(&self.precipitation_sum),
            series_len(&self.precipitation_probability_max),
            series_len(&self.wind_speed_10m_max),
            series_len(&self.wind_gusts_10m_max),
            series_len(&self.wind_direction_10m_dominant),
            series_len(&self.sunrise),
            series_len(&self.sunset),
        ]
        .into_iter()
        .min()
        .unwrap_or(0)
    }
}
