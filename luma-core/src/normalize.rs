//! Turns a raw provider payload into the display-ready current, hourly
//! and daily records.
//!
//! Normalization is pure given its inputs: the caller supplies "now" and
//! the random source used for cute descriptions. Parallel arrays that are
//! short or contain nulls truncate the affected sequence at the first gap;
//! an entry is either fully populated or absent. Only a missing top-level
//! section (or a current record without temperature and weather code) is
//! an error; other absent current readings default to zero.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    ForecastError,
    codes::{classify_icon, describe},
    messages::{RandomSource, cute_message},
    model::{CurrentConditions, DailyForecast, HourlyForecast, Preferences},
    raw::{RawCurrent, RawDaily, RawForecastPayload, RawHourly, value_at},
    units::{
        clock_label, compass_direction, date_label, hour_label, percent, round_display,
        timestamp_label, weekday_name,
    },
};

pub const HOURLY_WINDOW: usize = 24;
pub const DAILY_WINDOW: usize = 7;

/// Daily humidity shown for every day.
pub const DAILY_HUMIDITY_PLACEHOLDER: u8 = 60;
/// Wind direction shown for every hour.
pub const HOURLY_WIND_DIRECTION: &str = "N";

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// The three records every view consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedForecast {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlyForecast>,
    pub daily: Vec<DailyForecast>,
}

pub fn normalize(
    raw: &RawForecastPayload,
    prefs: &Preferences,
    now: DateTime<Utc>,
    rng: &mut dyn RandomSource,
) -> Result<NormalizedForecast, ForecastError> {
    let current = raw.current.as_ref().ok_or_else(|| missing_section("current"))?;
    let hourly = raw.hourly.as_ref().ok_or_else(|| missing_section("hourly"))?;
    let daily = raw.daily.as_ref().ok_or_else(|| missing_section("daily"))?;

    let local_now = location_time(now, raw.utc_offset_seconds);

    Ok(NormalizedForecast {
        current: normalize_current(current, daily, prefs, local_now)?,
        hourly: normalize_hourly(hourly, prefs, local_now),
        daily: normalize_daily(daily, prefs, rng),
    })
}

/// Wall-clock time at the forecast location.
pub fn location_time(now: DateTime<Utc>, utc_offset_seconds: i32) -> NaiveDateTime {
    match FixedOffset::east_opt(utc_offset_seconds) {
        Some(offset) => now.with_timezone(&offset).naive_local(),
        None => now.naive_utc(),
    }
}

fn missing_section(name: &str) -> ForecastError {
    ForecastError::malformed(format!("payload has no `{name}` section"))
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ForecastError> {
    value.ok_or_else(|| ForecastError::malformed(format!("`{field}` is missing")))
}

fn parse_local_time(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT).ok()
}

/// Dates are calendar dates at the location; parsing them without any
/// timezone keeps "2024-01-15" on January 15 wherever this runs.
fn parse_local_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, LOCAL_DATE_FORMAT).ok()
}

fn is_night(time: NaiveDateTime) -> bool {
    let hour = time.hour();
    !(6..20).contains(&hour)
}

fn normalize_current(
    current: &RawCurrent,
    daily: &RawDaily,
    prefs: &Preferences,
    local_now: NaiveDateTime,
) -> Result<CurrentConditions, ForecastError> {
    let temperature = required(current.temperature_2m, "current.temperature_2m")?;
    let code = required(current.weather_code, "current.weather_code")?;
    let high = value_at(&daily.temperature_2m_max, 0).unwrap_or(temperature);
    let low = value_at(&daily.temperature_2m_min, 0).unwrap_or(temperature);

    Ok(CurrentConditions {
        temperature: round_display(temperature),
        feels_like: round_display(current.apparent_temperature.unwrap_or(temperature)),
        high: round_display(high),
        low: round_display(low),
        condition: describe(code).name.to_string(),
        precipitation: current.precipitation.unwrap_or_default(),
        precipitation_probability: percent(
            value_at(&daily.precipitation_probability_max, 0).unwrap_or_default(),
        ),
        wind_speed: round_display(current.wind_speed_10m.unwrap_or_default()),
        wind_direction: compass_direction(current.wind_direction_10m.unwrap_or_default()),
        wind_gusts: round_display(current.wind_gusts_10m.unwrap_or_default()),
        humidity: percent(current.relative_humidity_2m.unwrap_or_default()),
        cloud_cover: percent(current.cloud_cover.unwrap_or_default()),
        uv_index: 0,
        last_updated: timestamp_label(local_now, prefs.time_format),
    })
}

/// Index of the first hour matching the local hour and day-of-month of
/// `local_now`, or 0 when nothing matches.
pub fn hourly_start_index(hourly: &RawHourly, local_now: NaiveDateTime) -> usize {
    hourly
        .time
        .iter()
        .position(|t| {
            parse_local_time(t)
                .is_some_and(|t| t.hour() == local_now.hour() && t.day() == local_now.day())
        })
        .unwrap_or(0)
}

fn normalize_hourly(
    hourly: &RawHourly,
    prefs: &Preferences,
    local_now: NaiveDateTime,
) -> Vec<HourlyForecast> {
    let start = hourly_start_index(hourly, local_now);
    let end = hourly.aligned_len().min(start + HOURLY_WINDOW);

    let mut entries = Vec::with_capacity(end.saturating_sub(start));
    for index in start..end {
        match hourly_entry(hourly, index, prefs) {
            Some(entry) => entries.push(entry),
            None => {
                debug!(index, "hourly series has a gap, truncating");
                break;
            }
        }
    }

    debug!(start, count = entries.len(), "normalized hourly forecast");
    entries
}

fn hourly_entry(hourly: &RawHourly, index: usize, prefs: &Preferences) -> Option<HourlyForecast> {
    let time = parse_local_time(hourly.time.get(index)?)?;
    let code = value_at(&hourly.weather_code, index)?;
    let temperature = round_display(value_at(&hourly.temperature_2m, index)?);

    Some(HourlyForecast {
        time: hour_label(time, prefs.time_format),
        temperature,
        feels_like: temperature,
        condition: describe(code).name.to_string(),
        icon: classify_icon(code, is_night(time)),
        precipitation: value_at(&hourly.precipitation, index)?,
        precipitation_probability: percent(value_at(&hourly.precipitation_probability, index)?),
        wind_speed: round_display(value_at(&hourly.wind_speed_10m, index)?),
        wind_direction: HOURLY_WIND_DIRECTION,
        wind_gusts: round_display(value_at(&hourly.wind_gusts_10m, index)?),
        humidity: percent(value_at(&hourly.relative_humidity_2m, index)?),
        cloud_cover: percent(value_at(&hourly.cloud_cover, index)?),
    })
}

fn normalize_daily(
    daily: &RawDaily,
    prefs: &Preferences,
    rng: &mut dyn RandomSource,
) -> Vec<DailyForecast> {
    let end = daily.aligned_len().min(DAILY_WINDOW);

    let mut entries = Vec::with_capacity(end);
    for index in 0..end {
        match daily_entry(daily, index, prefs, rng) {
            Some(entry) => entries.push(entry),
            None => {
                debug!(index, "daily series has a gap, truncating");
                break;
            }
        }
    }

    entries
}

fn day_name(index: usize, date: NaiveDate) -> String {
    match index {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => weekday_name(date),
    }
}

fn daily_entry(
    daily: &RawDaily,
    index: usize,
    prefs: &Preferences,
    rng: &mut dyn RandomSource,
) -> Option<DailyForecast> {
    let date = parse_local_date(daily.time.get(index)?)?;
    let code = value_at(&daily.weather_code, index)?;
    let high = round_display(value_at(&daily.temperature_2m_max, index)?);
    let low = round_display(value_at(&daily.temperature_2m_min, index)?);
    let sunrise = parse_local_time(&value_at(&daily.sunrise, index)?)?;
    let sunset = parse_local_time(&value_at(&daily.sunset, index)?)?;
    let precipitation = value_at(&daily.precipitation_sum, index)?;
    let precipitation_probability = percent(value_at(&daily.precipitation_probability_max, index)?);
    let wind_speed = round_display(value_at(&daily.wind_speed_10m_max, index)?);
    let wind_gusts = round_display(value_at(&daily.wind_gusts_10m_max, index)?);
    let wind_direction = compass_direction(value_at(&daily.wind_direction_10m_dominant, index)?);

    let condition = describe(code).name;
    let description = if prefs.cute_language {
        cute_message(code, false, rng).to_string()
    } else {
        format!("Expect {} with a high of {high}°", condition.to_lowercase())
    };

    Some(DailyForecast {
        date: date_label(date),
        day_name: day_name(index, date),
        high,
        low,
        condition: condition.to_string(),
        icon: classify_icon(code, false),
        precipitation,
        precipitation_probability,
        wind_speed,
        wind_direction,
        wind_gusts,
        humidity: DAILY_HUMIDITY_PLACEHOLDER,
        sunrise: clock_label(sunrise, prefs.time_format),
        sunset: clock_label(sunset, prefs.time_format),
        description,
    })
}
