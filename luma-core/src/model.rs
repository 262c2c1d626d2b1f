use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_USER_NAME_CHARS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value of the provider's `temperature_unit` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "celsius" | "c" => Ok(TemperatureUnit::Celsius),
            "fahrenheit" | "f" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow!("Unknown temperature unit '{value}'. Use celsius or fahrenheit.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindSpeedUnit {
    #[default]
    Mph,
    Kmh,
}

impl WindSpeedUnit {
    /// Value of the provider's `wind_speed_unit` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Kmh => "kmh",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindSpeedUnit::Mph => "mph",
            WindSpeedUnit::Kmh => "km/h",
        }
    }
}

impl FromStr for WindSpeedUnit {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "mph" => Ok(WindSpeedUnit::Mph),
            "kmh" | "km/h" => Ok(WindSpeedUnit::Kmh),
            _ => Err(anyhow!("Unknown wind speed unit '{value}'. Use mph or kmh.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

impl FromStr for TimeFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "12h" | "12" => Ok(TimeFormat::H12),
            "24h" | "24" => Ok(TimeFormat::H24),
            _ => Err(anyhow!("Unknown time format '{value}'. Use 12h or 24h.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(anyhow!("Unknown theme '{value}'. Use light or dark.")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifications {
    pub daily_forecast: bool,
    pub rain_notifications: bool,
    /// Local time of the daily forecast notification, "HH:MM".
    pub daily_time: String,
}

impl Default for Notifications {
    fn default() -> Self {
        Self { daily_forecast: true, rain_notifications: true, daily_time: "07:00".to_string() }
    }
}

/// User preferences. Only the three unit-affecting fields change what is
/// requested from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub temperature_unit: TemperatureUnit,
    pub wind_speed_unit: WindSpeedUnit,
    pub time_format: TimeFormat,
    pub theme: Theme,
    pub show_feels_like: bool,
    pub cute_language: bool,
    pub user_name: String,
    pub notifications: Notifications,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::Fahrenheit,
            wind_speed_unit: WindSpeedUnit::Mph,
            time_format: TimeFormat::H12,
            theme: Theme::Light,
            show_feels_like: true,
            cute_language: true,
            user_name: "sunshine".to_string(),
            notifications: Notifications::default(),
        }
    }
}

/// Partial update of [`Preferences`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub temperature_unit: Option<TemperatureUnit>,
    pub wind_speed_unit: Option<WindSpeedUnit>,
    pub time_format: Option<TimeFormat>,
    pub theme: Option<Theme>,
    pub show_feels_like: Option<bool>,
    pub cute_language: Option<bool>,
    pub user_name: Option<String>,
    pub notifications: Option<Notifications>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Preferences {
    /// Merge a patch over these preferences. Returns `true` when a
    /// unit-affecting field actually changed.
    pub fn apply(&mut self, patch: PreferencesPatch) -> bool {
        let before = self.unit_key();

        if let Some(unit) = patch.temperature_unit {
            self.temperature_unit = unit;
        }
        if let Some(unit) = patch.wind_speed_unit {
            self.wind_speed_unit = unit;
        }
        if let Some(format) = patch.time_format {
            self.time_format = format;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(show) = patch.show_feels_like {
            self.show_feels_like = show;
        }
        if let Some(cute) = patch.cute_language {
            self.cute_language = cute;
        }
        if let Some(name) = patch.user_name {
            self.user_name = name.chars().take(MAX_USER_NAME_CHARS).collect();
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }

        before != self.unit_key()
    }

    fn unit_key(&self) -> (TemperatureUnit, WindSpeedUnit, TimeFormat) {
        (self.temperature_unit, self.wind_speed_unit, self.time_format)
    }
}

/// A place the user can view weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Location {
    /// Hardcoded seed location.
    pub fn seed() -> Self {
        Self {
            id: "1".to_string(),
            name: "Atlanta, GA".to_string(),
            nickname: Some("Home".to_string()),
            emoji: Some("🍑".to_string()),
            latitude: 33.7490,
            longitude: -84.3880,
            region: Some("GA".to_string()),
            country: Some("USA".to_string()),
            is_default: true,
            is_favorite: true,
        }
    }

    /// Location for raw device coordinates when no place name is known.
    pub fn from_coordinates(latitude: f64, longitude: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("geo-{}", now.timestamp_millis()),
            name: "My Location".to_string(),
            nickname: None,
            emoji: None,
            latitude,
            longitude,
            region: None,
            country: None,
            is_default: false,
            is_favorite: false,
        }
    }

    /// Nickname if the user set one, else the place name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.name)
    }
}

impl From<LocationCandidate> for Location {
    fn from(candidate: LocationCandidate) -> Self {
        let suffix = candidate.region.as_deref().or(candidate.country.as_deref());
        let name = match suffix {
            Some(suffix) => format!("{}, {suffix}", candidate.name),
            None => candidate.name,
        };

        Self {
            id: candidate.id,
            name,
            nickname: None,
            emoji: None,
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            region: candidate.region,
            country: candidate.country,
            is_default: false,
            is_favorite: false,
        }
    }
}

/// Result of a geocoding search or reverse lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCandidate {
    pub id: String,
    pub name: String,
    /// First-level region, falling back to the country.
    pub region: Option<String>,
    pub country: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconCategory {
    Sun,
    Cloud,
    Moon,
    Rain,
    Snow,
    Thunder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Good,
    Neutral,
    Caution,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: i32,
    pub feels_like: i32,
    pub high: i32,
    pub low: i32,
    pub condition: String,
    pub precipitation: f64,
    pub precipitation_probability: u8,
    pub wind_speed: i32,
    pub wind_direction: &'static str,
    pub wind_gusts: i32,
    pub humidity: u8,
    pub cloud_cover: u8,
    /// Never requested from the provider, always 0.
    pub uv_index: u8,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub time: String,
    pub temperature: i32,
    /// Mirrors `temperature`; the hourly series has no apparent temperature.
    pub feels_like: i32,
    pub condition: String,
    pub icon: IconCategory,
    pub precipitation: f64,
    pub precipitation_probability: u8,
    pub wind_speed: i32,
    /// Always "N"; the hourly series carries no direction.
    pub wind_direction: &'static str,
    pub wind_gusts: i32,
    pub humidity: u8,
    pub cloud_cover: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: String,
    pub day_name: String,
    pub high: i32,
    pub low: i32,
    pub condition: String,
    pub icon: IconCategory,
    pub precipitation: f64,
    pub precipitation_probability: u8,
    pub wind_speed: i32,
    pub wind_direction: &'static str,
    pub wind_gusts: i32,
    /// Fixed placeholder; the provider has no daily humidity.
    pub humidity: u8,
    pub sunrise: String,
    pub sunset: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_parsing_accepts_provider_spellings() {
        assert_eq!("celsius".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Celsius);
        assert_eq!("KMH".parse::<WindSpeedUnit>().unwrap(), WindSpeedUnit::Kmh);
        assert_eq!("24h".parse::<TimeFormat>().unwrap(), TimeFormat::H24);
        assert!("kelvin".parse::<TemperatureUnit>().is_err());
    }

    #[test]
    fn preferences_serialize_with_provider_names() {
        let json = serde_json::to_value(Preferences::default()).unwrap();
        assert_eq!(json["temperature_unit"], "fahrenheit");
        assert_eq!(json["wind_speed_unit"], "mph");
        assert_eq!(json["time_format"], "12h");
    }

    #[test]
    fn patch_reports_unit_changes_only() {
        let mut prefs = Preferences::default();

        let cosmetic = PreferencesPatch { cute_language: Some(false), ..Default::default() };
        assert!(!prefs.apply(cosmetic));
        assert!(!prefs.cute_language);

        let same_unit =
            PreferencesPatch { wind_speed_unit: Some(WindSpeedUnit::Mph), ..Default::default() };
        assert!(!prefs.apply(same_unit));

        let unit = PreferencesPatch { wind_speed_unit: Some(WindSpeedUnit::Kmh), ..Default::default() };
        assert!(prefs.apply(unit));
        assert_eq!(prefs.wind_speed_unit, WindSpeedUnit::Kmh);
    }

    #[test]
    fn user_name_is_truncated() {
        let mut prefs = Preferences::default();
        let patch = PreferencesPatch {
            user_name: Some("abcdefghijklmnopqrstuvwxyz".to_string()),
            ..Default::default()
        };
        prefs.apply(patch);
        assert_eq!(prefs.user_name, "abcdefghijklmnopqrst");
    }

    #[test]
    fn candidate_becomes_location_with_region_suffix() {
        let candidate = LocationCandidate {
            id: "42".into(),
            name: "Paris".into(),
            region: None,
            country: Some("France".into()),
            latitude: 48.85,
            longitude: 2.35,
        };
        let location = Location::from(candidate);
        assert_eq!(location.name, "Paris, France");
        assert!(!location.is_default);
        assert!(!location.is_favorite);
    }

    #[test]
    fn coordinates_location_is_named_my_location() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let location = Location::from_coordinates(1.0, 2.0, now);
        assert_eq!(location.name, "My Location");
        assert_eq!(location.id, "geo-1700000000000");
        assert_eq!(location.display_name(), "My Location");
    }

    #[test]
    fn seed_location_is_default_and_favorite() {
        let seed = Location::seed();
        assert!(seed.is_default && seed.is_favorite);
        assert_eq!(seed.display_name(), "Home");
    }
}
