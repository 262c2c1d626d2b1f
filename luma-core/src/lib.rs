//! Core library for the `luma` weather dashboard.
//!
//! This crate defines:
//! - The forecast provider abstraction and its Open-Meteo client
//! - Normalization of raw forecasts into display-ready records
//! - The weather state manager that owns the current snapshot
//! - Configuration, persistence and small display helpers
//!
//! It is used by `luma-cli`, but can also be reused by other front-ends.

pub mod codes;
pub mod config;
pub mod error;
pub mod messages;
pub mod model;
pub mod normalize;
pub mod outfit;
pub mod provider;
pub mod raw;
pub mod state;
pub mod store;
pub mod units;

pub use config::{ApiConfig, Config};
pub use error::{ForecastError, LocationError};
pub use model::{
    CurrentConditions, DailyForecast, HourlyForecast, IconCategory, Location, LocationCandidate,
    Preferences, PreferencesPatch, Severity,
};
pub use normalize::{NormalizedForecast, normalize};
pub use provider::{ForecastProvider, UnitOptions, provider_from_config};
pub use raw::RawForecastPayload;
pub use state::{LocationPatch, Snapshot, WeatherState};
