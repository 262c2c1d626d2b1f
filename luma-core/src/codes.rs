//! WMO weather codes as reported by the forecast provider.
//!
//! Both lookups are total: any integer gets an answer, unknown codes fall
//! back to clear-sky artwork and an "Unknown" description.

use serde::Serialize;

use crate::model::{IconCategory, Severity};

/// Semantic condition family of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    Clear,
    Cloud,
    Fog,
    Rain,
    Snow,
    Thunder,
}

/// Name and severity tier of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherDescription {
    pub name: &'static str,
    pub severity: Severity,
}

pub const UNKNOWN_DESCRIPTION: WeatherDescription =
    WeatherDescription { name: "Unknown", severity: Severity::Neutral };

/// Map a code to its condition family. Drizzle counts as rain.
pub fn condition_kind(code: i32) -> Option<ConditionKind> {
    match code {
        0 | 1 => Some(ConditionKind::Clear),
        2 | 3 => Some(ConditionKind::Cloud),
        45 | 48 => Some(ConditionKind::Fog),
        51..=57 | 61..=67 | 80..=82 => Some(ConditionKind::Rain),
        71..=77 | 85 | 86 => Some(ConditionKind::Snow),
        95..=99 => Some(ConditionKind::Thunder),
        _ => None,
    }
}

/// Artwork category for a code. `is_night` only matters for clear skies
/// (and for the unknown-code fallback, which renders as clear).
pub fn classify_icon(code: i32, is_night: bool) -> IconCategory {
    let clear = if is_night { IconCategory::Moon } else { IconCategory::Sun };

    match condition_kind(code) {
        Some(ConditionKind::Clear) | None => clear,
        Some(ConditionKind::Cloud | ConditionKind::Fog) => IconCategory::Cloud,
        Some(ConditionKind::Rain) => IconCategory::Rain,
        Some(ConditionKind::Snow) => IconCategory::Snow,
        Some(ConditionKind::Thunder) => IconCategory::Thunder,
    }
}

pub fn describe(code: i32) -> WeatherDescription {
    use Severity::*;

    let (name, severity) = match code {
        0 => ("Clear Sky", Good),
        1 => ("Mainly Clear", Good),
        2 => ("Partly Cloudy", Good),
        3 => ("Overcast", Neutral),
        45 => ("Fog", Caution),
        48 => ("Depositing Rime Fog", Caution),
        51 => ("Light Drizzle", Caution),
        53 => ("Moderate Drizzle", Caution),
        55 => ("Dense Drizzle", Caution),
        56 => ("Light Freezing Drizzle", Warning),
        57 => ("Dense Freezing Drizzle", Warning),
        61 => ("Slight Rain", Caution),
        63 => ("Moderate Rain", Warning),
        65 => ("Heavy Rain", Warning),
        66 => ("Light Freezing Rain", Warning),
        67 => ("Heavy Freezing Rain", Warning),
        71 => ("Slight Snow", Caution),
        73 => ("Moderate Snow", Warning),
        75 => ("Heavy Snow", Warning),
        77 => ("Snow Grains", Warning),
        80 => ("Slight Rain Showers", Caution),
        81 => ("Moderate Rain Showers", Warning),
        82 => ("Violent Rain Showers", Warning),
        85 => ("Slight Snow Showers", Warning),
        86 => ("Heavy Snow Showers", Warning),
        95 => ("Thunderstorm", Danger),
        96 => ("Thunderstorm with Hail", Danger),
        99 => ("Thunderstorm with Heavy Hail", Danger),
        _ => return UNKNOWN_DESCRIPTION,
    };

    WeatherDescription { name, severity }
}
