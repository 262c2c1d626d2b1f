//! Small, pure helpers for units, compass directions and display labels.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{TemperatureUnit, TimeFormat, WindSpeedUnit};

/// Eight-point compass, clockwise from north.
pub const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Convert a bearing in degrees to one of the eight compass labels.
///
/// Uses `round(degrees / 45) mod 8`, so values past 360 or below 0 wrap.
pub fn compass_direction(degrees: f64) -> &'static str {
    let sector = (degrees / 45.0).round() as i64;
    COMPASS_POINTS[sector.rem_euclid(8) as usize]
}

/// Round half up (towards positive infinity), which is what display
/// values use: `2.5 -> 3`, `-2.5 -> -2`.
pub fn round_display(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}

/// Percentages arrive as whole numbers; keep them in `0..=100`.
pub fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

pub fn to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

const KMH_PER_MPH: f64 = 1.609_344;

/// Express a wind speed given in `unit` in miles per hour.
pub fn to_mph(speed: f64, unit: WindSpeedUnit) -> f64 {
    match unit {
        WindSpeedUnit::Mph => speed,
        WindSpeedUnit::Kmh => speed / KMH_PER_MPH,
    }
}

/// "2 PM" or "14".
pub fn hour_label(time: NaiveDateTime, format: TimeFormat) -> String {
    match format {
        TimeFormat::H12 => time.format("%-I %p").to_string(),
        TimeFormat::H24 => time.format("%H").to_string(),
    }
}

/// "7:42 AM" or "07:42".
pub fn clock_label(time: NaiveDateTime, format: TimeFormat) -> String {
    match format {
        TimeFormat::H12 => time.format("%-I:%M %p").to_string(),
        TimeFormat::H24 => time.format("%H:%M").to_string(),
    }
}

/// "Jan 15, 2024, 2:05 PM" or "Jan 15, 2024, 14:05".
pub fn timestamp_label(time: NaiveDateTime, format: TimeFormat) -> String {
    match format {
        TimeFormat::H12 => time.format("%b %-d, %Y, %-I:%M %p").to_string(),
        TimeFormat::H24 => time.format("%b %-d, %Y, %H:%M").to_string(),
    }
}

/// "Jan 15".
pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// Full weekday name, e.g. "Monday".
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

pub fn temperature_label(value: i32, unit: TemperatureUnit) -> String {
    format!("{value}{}", unit.symbol())
}

pub fn wind_label(value: i32, unit: WindSpeedUnit) -> String {
    format!("{value} {}", unit.label())
}
