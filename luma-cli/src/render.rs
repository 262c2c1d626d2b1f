//! Plain-text rendering of snapshots for the terminal.

use luma_core::{
    CurrentConditions, LocationCandidate, Preferences, Snapshot,
    messages::{RandomSource, greeting},
    model::{TemperatureUnit, TimeFormat},
    outfit,
    units::{temperature_label, to_fahrenheit, to_mph, wind_label},
};

pub fn candidate(candidate: &LocationCandidate) -> String {
    let place = match candidate.region.as_deref().or(candidate.country.as_deref()) {
        Some(region) => format!("{}, {region}", candidate.name),
        None => candidate.name.clone(),
    };
    format!(
        "{place} ({:.2}, {:.2}) [{}]",
        candidate.latitude, candidate.longitude, candidate.id
    )
}

/// Greeting, current conditions, up to `hourly` hours and the daily outlook.
pub fn dashboard(
    snapshot: &Snapshot,
    hourly: usize,
    local_hour: u32,
    rng: &mut dyn RandomSource,
) -> String {
    let prefs = &snapshot.preferences;
    let temp = |value: i32| temperature_label(value, prefs.temperature_unit);
    let wind = |value: i32| wind_label(value, prefs.wind_speed_unit);

    let mut lines = vec![
        greeting(&prefs.user_name, local_hour),
        format!("📍 {}", snapshot.current_location.display_name()),
    ];

    if let Some(error) = &snapshot.error {
        lines.push(format!("⚠ {error}"));
    }

    let Some(current) = &snapshot.current_weather else {
        if snapshot.is_loading {
            lines.push("Loading weather...".to_string());
        }
        return lines.join("\n") + "\n";
    };

    lines.push(String::new());
    lines.push(format!("{} {}", temp(current.temperature), current.condition));
    if prefs.show_feels_like {
        lines.push(format!("Feels like {}", temp(current.feels_like)));
    }
    lines.push(format!("H: {}  L: {}", temp(current.high), temp(current.low)));
    lines.push(format!(
        "Wind {} {} (gusts {})  Humidity {}%  Rain {}%",
        wind(current.wind_speed),
        current.wind_direction,
        wind(current.wind_gusts),
        current.humidity,
        current.precipitation_probability,
    ));
    lines.push(format!("Updated {}", current.last_updated));

    lines.push(format!("👕 {}", outfit_tip(current, prefs, rng)));

    if hourly > 0 && !snapshot.hourly_forecast.is_empty() {
        lines.push(String::new());
        for hour in snapshot.hourly_forecast.iter().take(hourly) {
            lines.push(format!(
                "{:>6}  {:>6}  {:>3}%  {}",
                hour.time,
                temp(hour.temperature),
                hour.precipitation_probability,
                hour.condition
            ));
        }
    }

    if !snapshot.daily_forecast.is_empty() {
        lines.push(String::new());
        for day in &snapshot.daily_forecast {
            lines.push(format!(
                "{:<9} {:<6}  {:>6} / {:<6}  {}",
                day.day_name,
                day.date,
                temp(day.high),
                temp(day.low),
                day.description
            ));
        }
    }

    lines.join("\n") + "\n"
}

/// Outfit tip for the current conditions. The outfit bands are defined in
/// Fahrenheit and mph; it is snowing when below freezing with a rain
/// chance above 50%.
fn outfit_tip(
    current: &CurrentConditions,
    prefs: &Preferences,
    rng: &mut dyn RandomSource,
) -> &'static str {
    let temp_f = match prefs.temperature_unit {
        TemperatureUnit::Celsius => to_fahrenheit(f64::from(current.temperature)),
        TemperatureUnit::Fahrenheit => f64::from(current.temperature),
    };
    let rain_chance = f64::from(current.precipitation_probability);
    let wind_mph = to_mph(f64::from(current.wind_speed), prefs.wind_speed_unit);
    let is_snowing = temp_f < 32.0 && rain_chance > 50.0;

    outfit::recommend(temp_f, rain_chance, wind_mph, is_snowing, rng)
}

pub fn locations(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for location in snapshot.sorted_locations() {
        let active = if location.id == snapshot.current_location.id { "*" } else { " " };
        let star = if location.is_favorite { "★" } else { " " };
        let emoji = location.emoji.as_deref().unwrap_or(" ");
        out.push_str(&format!(
            "{active}{star} {emoji} {} [{}]\n",
            location.display_name(),
            location.id
        ));
    }
    out
}

pub fn preferences(prefs: &Preferences) -> String {
    let name = if prefs.user_name.is_empty() { "(none)" } else { &prefs.user_name };
    format!(
        "temperature unit:  {}\n\
         wind speed unit:   {}\n\
         time format:       {}\n\
         theme:             {:?}\n\
         show feels like:   {}\n\
         cute language:     {}\n\
         name:              {name}\n\
         daily forecast:    {} at {}\n\
         rain alerts:       {}\n",
        prefs.temperature_unit.as_str(),
        prefs.wind_speed_unit.label(),
        match prefs.time_format {
            TimeFormat::H12 => "12h",
            TimeFormat::H24 => "24h",
        },
        prefs.theme,
        prefs.show_feels_like,
        prefs.cute_language,
        prefs.notifications.daily_forecast,
        prefs.notifications.daily_time,
        prefs.notifications.rain_notifications,
    )
}
