//! Owner of the weather snapshot and the refresh pipeline.
//!
//! [`WeatherState`] is meant to be driven from a single task. Mutators take
//! `&self` so that refreshes already awaiting the provider can coexist with
//! later mutations; no borrow is held across an await.
//!
//! Every change of the refresh target (active location coordinates or a
//! unit-affecting preference) bumps a target epoch. A refresh records the
//! epoch it started under, and its result is discarded if the epoch has
//! moved on by the time the provider answers, so a slow response for a
//! superseded location never overwrites newer state.
//!
//! There is no request timeout: a provider call that never returns keeps
//! `is_refreshing` set. A superseded response that arrives when nothing
//! else is in flight still ends the initial load, leaving the forecast
//! empty and `needs_refresh` set.

use std::{
    cell::{Cell, RefCell},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    ForecastError, LocationError,
    messages::{RandomSource, ThreadRandom},
    model::{
        CurrentConditions, DailyForecast, HourlyForecast, Location, Preferences, PreferencesPatch,
    },
    normalize::normalize,
    provider::{ForecastProvider, UnitOptions},
    raw::RawForecastPayload,
    store::{CURRENT_LOCATION_KEY, KeyValueStore, PREFERENCES_KEY, SAVED_LOCATIONS_KEY},
};

/// Everything a view needs, as of the last committed change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub current_location: Location,
    pub saved_locations: Vec<Location>,
    pub preferences: Preferences,
    pub current_weather: Option<CurrentConditions>,
    pub hourly_forecast: Vec<HourlyForecast>,
    pub daily_forecast: Vec<DailyForecast>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// The seed location, saved and active, with default preferences.
impl Default for Snapshot {
    fn default() -> Self {
        let seed = Location::seed();
        Self::seeded(seed.clone(), vec![seed], Preferences::default())
    }
}

impl Snapshot {
    fn seeded(current_location: Location, saved_locations: Vec<Location>, preferences: Preferences) -> Self {
        Self {
            current_location,
            saved_locations,
            preferences,
            current_weather: None,
            hourly_forecast: Vec::new(),
            daily_forecast: Vec::new(),
            is_loading: true,
            is_refreshing: false,
            error: None,
            last_updated: None,
        }
    }

    /// Saved locations with favorites first, otherwise in insertion order.
    pub fn sorted_locations(&self) -> Vec<&Location> {
        let mut sorted: Vec<&Location> = self.saved_locations.iter().collect();
        sorted.sort_by_key(|l| !l.is_favorite);
        sorted
    }
}

/// Partial update of a saved location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub nickname: Option<String>,
    pub emoji: Option<String>,
    pub is_favorite: Option<bool>,
}

impl LocationPatch {
    fn apply_to(&self, location: &mut Location) {
        if let Some(nickname) = &self.nickname {
            location.nickname = Some(nickname.clone());
        }
        if let Some(emoji) = &self.emoji {
            location.emoji = Some(emoji.clone());
        }
        if let Some(favorite) = self.is_favorite {
            location.is_favorite = favorite;
        }
    }
}

struct Inner {
    snapshot: Snapshot,
    target_epoch: u64,
    in_flight: usize,
    needs_refresh: bool,
}

impl Inner {
    fn retarget(&mut self) {
        self.target_epoch += 1;
        self.needs_refresh = true;
    }
}

pub type Clock = Box<dyn Fn() -> DateTime<Utc>>;

pub struct WeatherState {
    provider: Arc<dyn ForecastProvider>,
    inner: RefCell<Inner>,
    rng: RefCell<Box<dyn RandomSource>>,
    clock: Clock,
    next_request: Cell<u64>,
}

impl std::fmt::Debug for WeatherState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherState")
            .field("provider", &self.provider)
            .field("snapshot", &self.inner.borrow().snapshot)
            .finish_non_exhaustive()
    }
}

impl WeatherState {
    /// State seeded with the default location and preferences. Needs a
    /// refresh before any forecast is available.
    pub fn new(provider: Arc<dyn ForecastProvider>) -> Self {
        Self::with_snapshot(provider, Snapshot::default())
    }

    fn with_snapshot(provider: Arc<dyn ForecastProvider>, snapshot: Snapshot) -> Self {
        Self {
            provider,
            inner: RefCell::new(Inner { snapshot, target_epoch: 0, in_flight: 0, needs_refresh: true }),
            rng: RefCell::new(Box::new(ThreadRandom)),
            clock: Box::new(Utc::now),
            next_request: Cell::new(0),
        }
    }

    /// Restore preferences and locations from a store. Missing or
    /// unreadable entries fall back to the seeds.
    pub fn restore(provider: Arc<dyn ForecastProvider>, store: &dyn KeyValueStore) -> Self {
        let seed = Location::seed();
        let preferences = load_value(store, PREFERENCES_KEY).unwrap_or_default();
        let saved_locations: Vec<Location> =
            load_value(store, SAVED_LOCATIONS_KEY).unwrap_or_else(|| vec![seed.clone()]);
        let current_location = load_value(store, CURRENT_LOCATION_KEY)
            .or_else(|| saved_locations.iter().find(|l| l.is_default).cloned())
            .unwrap_or(seed);

        Self::with_snapshot(provider, Snapshot::seeded(current_location, saved_locations, preferences))
    }

    /// Write preferences and locations to a store. Forecast data is not persisted.
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        let inner = self.inner.borrow();
        let snapshot = &inner.snapshot;

        let preferences = serde_json::to_string(&snapshot.preferences)
            .context("Failed to serialize preferences")?;
        let saved = serde_json::to_string(&snapshot.saved_locations)
            .context("Failed to serialize saved locations")?;
        let current = serde_json::to_string(&snapshot.current_location)
            .context("Failed to serialize current location")?;

        store.write(PREFERENCES_KEY, &preferences)?;
        store.write(SAVED_LOCATIONS_KEY, &saved)?;
        store.write(CURRENT_LOCATION_KEY, &current)?;
        Ok(())
    }

    pub fn with_random_source(self, rng: Box<dyn RandomSource>) -> Self {
        *self.rng.borrow_mut() = rng;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Copy of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.borrow().snapshot.clone()
    }

    /// Read a part of the snapshot without cloning all of it.
    pub fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.inner.borrow().snapshot)
    }

    /// True when the refresh target changed since the last refresh started.
    pub fn needs_refresh(&self) -> bool {
        self.inner.borrow().needs_refresh
    }

    pub fn provider(&self) -> &Arc<dyn ForecastProvider> {
        &self.provider
    }

    /// Fetch and normalize a forecast for the current target.
    ///
    /// Never fails: errors land in the snapshot's `error` field and the
    /// previous forecast stays in place.
    pub async fn refresh(&self) {
        let request = self.next_request.get() + 1;
        self.next_request.set(request);

        let (epoch, latitude, longitude, units) = {
            let mut inner = self.inner.borrow_mut();
            inner.in_flight += 1;
            inner.needs_refresh = false;
            inner.snapshot.is_refreshing = true;
            inner.snapshot.error = None;

            let location = &inner.snapshot.current_location;
            info!(request, location = %location.name, "refreshing weather");
            (
                inner.target_epoch,
                location.latitude,
                location.longitude,
                UnitOptions::from(&inner.snapshot.preferences),
            )
        };

        let result = self.provider.fetch_forecast(latitude, longitude, units).await;
        self.complete(request, epoch, result);
    }

    /// Refresh only if a mutation changed the target. Returns whether a
    /// refresh ran.
    pub async fn refresh_if_needed(&self) -> bool {
        if !self.needs_refresh() {
            return false;
        }
        self.refresh().await;
        true
    }

    fn complete(&self, request: u64, epoch: u64, result: Result<RawForecastPayload, ForecastError>) {
        let mut inner = self.inner.borrow_mut();
        inner.in_flight = inner.in_flight.saturating_sub(1);

        if epoch != inner.target_epoch {
            debug!(request, epoch, live = inner.target_epoch, "discarding response for superseded target");
            // Nothing else will settle the first load; `needs_refresh` stays set.
            if inner.in_flight == 0 {
                inner.snapshot.is_loading = false;
            }
        } else {
            let now = (self.clock)();
            let normalized = result.and_then(|raw| {
                normalize(&raw, &inner.snapshot.preferences, now, &mut **self.rng.borrow_mut())
            });

            let snapshot = &mut inner.snapshot;
            match normalized {
                Ok(forecast) => {
                    snapshot.current_weather = Some(forecast.current);
                    snapshot.hourly_forecast = forecast.hourly;
                    snapshot.daily_forecast = forecast.daily;
                    snapshot.last_updated = Some(now);
                    snapshot.error = None;
                    info!(request, "weather refreshed");
                }
                Err(err) => {
                    warn!(request, error = %err, "weather refresh failed");
                    snapshot.error = Some(err.user_message().to_string());
                }
            }
            snapshot.is_loading = false;
        }

        inner.snapshot.is_refreshing = inner.in_flight > 0;
    }

    /// Switch the active location. Changing place marks a refresh.
    pub fn set_current_location(&self, location: Location) {
        let mut inner = self.inner.borrow_mut();
        let previous = &inner.snapshot.current_location;
        let moved = previous.id != location.id
            || previous.latitude != location.latitude
            || previous.longitude != location.longitude;

        inner.snapshot.current_location = location;
        if moved {
            inner.retarget();
        }
    }

    /// Make a saved location the active one.
    pub fn select_location(&self, id: &str) -> Result<(), LocationError> {
        let location = self
            .read(|s| s.saved_locations.iter().find(|l| l.id == id).cloned())
            .ok_or_else(|| LocationError::NotFound(id.to_string()))?;
        self.set_current_location(location);
        Ok(())
    }

    pub fn add_location(&self, location: Location) -> Result<(), LocationError> {
        let mut inner = self.inner.borrow_mut();
        if inner.snapshot.saved_locations.iter().any(|l| l.id == location.id) {
            return Err(LocationError::AlreadySaved(location.id));
        }
        inner.snapshot.saved_locations.push(location);
        Ok(())
    }

    /// Remove a saved location. The default location stays.
    pub fn remove_location(&self, id: &str) -> Result<(), LocationError> {
        let mut inner = self.inner.borrow_mut();
        let saved = &mut inner.snapshot.saved_locations;

        let position = saved
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| LocationError::NotFound(id.to_string()))?;
        if saved[position].is_default {
            return Err(LocationError::DefaultNotRemovable(id.to_string()));
        }

        saved.remove(position);
        Ok(())
    }

    pub fn toggle_favorite(&self, id: &str) -> Result<bool, LocationError> {
        let favorite = self
            .read(|s| s.saved_locations.iter().find(|l| l.id == id).map(|l| !l.is_favorite))
            .ok_or_else(|| LocationError::NotFound(id.to_string()))?;
        self.update_location(id, LocationPatch { is_favorite: Some(favorite), ..Default::default() })?;
        Ok(favorite)
    }

    /// Set a nickname. Blank input is ignored.
    pub fn rename_location(&self, id: &str, nickname: &str) -> Result<(), LocationError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Ok(());
        }
        self.update_location(id, LocationPatch { nickname: Some(nickname.to_string()), ..Default::default() })
    }

    pub fn set_location_emoji(&self, id: &str, emoji: &str) -> Result<(), LocationError> {
        self.update_location(id, LocationPatch { emoji: Some(emoji.to_string()), ..Default::default() })
    }

    /// Patch a saved location; the active location is patched too when it
    /// has the same id. Never touches the refresh target.
    pub fn update_location(&self, id: &str, patch: LocationPatch) -> Result<(), LocationError> {
        let mut inner = self.inner.borrow_mut();
        let snapshot = &mut inner.snapshot;

        let location = snapshot
            .saved_locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| LocationError::NotFound(id.to_string()))?;
        patch.apply_to(location);

        if snapshot.current_location.id == id {
            patch.apply_to(&mut snapshot.current_location);
        }
        Ok(())
    }

    /// Merge a preferences patch. Unit changes mark a refresh.
    pub fn update_preferences(&self, patch: PreferencesPatch) {
        let mut inner = self.inner.borrow_mut();
        if inner.snapshot.preferences.apply(patch) {
            inner.retarget();
        }
    }
}

fn load_value<T: serde::de::DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key, error = %err, "failed to read stored value, using default");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "stored value is unreadable, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LocationCandidate,
        error::FETCH_FAILED_MESSAGE,
        messages::tests::FixedIndex,
        model::{TimeFormat, WindSpeedUnit},
        normalize::tests::fixture,
        store::MemoryStore,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Reply = Result<RawForecastPayload, ForecastError>;

    /// Provider that records requests and answers from a queue. A queued
    /// `Gate` waits for the test to release it.
    #[derive(Debug, Default)]
    struct FakeProvider {
        requests: Mutex<Vec<(f64, f64, UnitOptions)>>,
        replies: Mutex<Vec<Queued>>,
    }

    #[derive(Debug)]
    enum Queued {
        Now(Reply),
        Gate(oneshot::Receiver<Reply>),
    }

    impl FakeProvider {
        fn answering(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(replies.into_iter().map(Queued::Now).collect()),
            })
        }

        fn gated(count: usize) -> (Arc<Self>, Vec<oneshot::Sender<Reply>>) {
            let (senders, receivers): (Vec<_>, Vec<_>) = (0..count).map(|_| oneshot::channel()).unzip();
            let provider = Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(receivers.into_iter().map(Queued::Gate).collect()),
            });
            (provider, senders)
        }

        fn requests(&self) -> Vec<(f64, f64, UnitOptions)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ForecastProvider for FakeProvider {
        async fn fetch_forecast(&self, latitude: f64, longitude: f64, units: UnitOptions) -> Reply {
            self.requests.lock().unwrap().push((latitude, longitude, units));
            let next = {
                let mut replies = self.replies.lock().unwrap();
                if replies.is_empty() { None } else { Some(replies.remove(0)) }
            };
            match next {
                Some(Queued::Now(reply)) => reply,
                Some(Queued::Gate(rx)) => rx.await.unwrap_or_else(|_| Err(server_error())),
                None => Err(server_error()),
            }
        }

        async fn search_locations(&self, _query: &str) -> Result<Vec<LocationCandidate>, ForecastError> {
            Ok(Vec::new())
        }

        async fn reverse_lookup(&self, _lat: f64, _lon: f64) -> Result<Option<LocationCandidate>, ForecastError> {
            Ok(None)
        }
    }

    fn server_error() -> ForecastError {
        ForecastError::Provider { status: 500, body: "Internal Server Error".into() }
    }

    fn fixed_now() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(8, 0, 0).unwrap().and_utc()
    }

    fn state_with(provider: Arc<dyn ForecastProvider>) -> WeatherState {
        WeatherState::new(provider)
            .with_random_source(Box::new(FixedIndex(0)))
            .with_clock(Box::new(fixed_now))
    }

    fn paris() -> Location {
        Location {
            id: "2988507".into(),
            name: "Paris, Île-de-France".into(),
            nickname: None,
            emoji: None,
            latitude: 48.8534,
            longitude: 2.3488,
            region: Some("Île-de-France".into()),
            country: Some("France".into()),
            is_default: false,
            is_favorite: false,
        }
    }

    #[test]
    fn new_state_is_loading_with_seed() {
        let state = state_with(FakeProvider::answering(vec![]));
        let snapshot = state.snapshot();
        assert!(snapshot.is_loading);
        assert!(!snapshot.is_refreshing);
        assert!(state.needs_refresh());
        assert_eq!(snapshot.current_location, Location::seed());
        assert_eq!(snapshot.saved_locations.len(), 1);
    }

    #[tokio::test]
    async fn successful_refresh_commits_forecast() {
        let provider = FakeProvider::answering(vec![Ok(fixture(48, 7))]);
        let state = state_with(provider.clone());

        state.refresh().await;

        let snapshot = state.snapshot();
        assert!(!snapshot.is_loading && !snapshot.is_refreshing);
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.hourly_forecast.len(), 24);
        assert_eq!(snapshot.hourly_forecast[0].time, "8 AM");
        assert_eq!(snapshot.daily_forecast.len(), 7);
        assert_eq!(snapshot.last_updated, Some(fixed_now()));
        assert!(snapshot.current_weather.is_some());
        assert!(!state.needs_refresh());

        let seed = Location::seed();
        assert_eq!(provider.requests(), vec![(seed.latitude, seed.longitude, UnitOptions::default())]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_forecast() {
        let provider = FakeProvider::answering(vec![Ok(fixture(48, 7)), Err(server_error())]);
        let state = state_with(provider);

        state.refresh().await;
        let before = state.snapshot();

        state.refresh().await;
        let after = state.snapshot();

        assert_eq!(after.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
        assert!(!after.is_loading && !after.is_refreshing);
        assert_eq!(after.hourly_forecast, before.hourly_forecast);
        assert_eq!(after.daily_forecast, before.daily_forecast);
        assert_eq!(after.current_weather, before.current_weather);
        assert_eq!(after.last_updated, before.last_updated);
    }

    #[tokio::test]
    async fn first_refresh_failure_clears_loading() {
        let state = state_with(FakeProvider::answering(vec![Err(server_error())]));
        state.refresh().await;

        let snapshot = state.snapshot();
        assert!(snapshot.error.is_some());
        assert!(!snapshot.is_loading && !snapshot.is_refreshing);
        assert!(snapshot.hourly_forecast.is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_is_reported_like_other_failures() {
        let state = state_with(FakeProvider::answering(vec![Ok(RawForecastPayload::default())]));
        state.refresh().await;
        assert_eq!(state.snapshot().error.as_deref(), Some(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn next_refresh_clears_error() {
        let state = state_with(FakeProvider::answering(vec![Err(server_error()), Ok(fixture(48, 7))]));
        state.refresh().await;
        state.refresh().await;
        assert_eq!(state.snapshot().error, None);
    }

    #[tokio::test]
    async fn wind_unit_change_requests_new_unit() {
        let provider = FakeProvider::answering(vec![Ok(fixture(48, 7)), Ok(fixture(48, 7))]);
        let state = state_with(provider.clone());
        state.refresh().await;

        state.update_preferences(PreferencesPatch {
            wind_speed_unit: Some(WindSpeedUnit::Kmh),
            ..Default::default()
        });
        assert!(state.needs_refresh());
        assert!(state.refresh_if_needed().await);

        let requests = provider.requests();
        assert_eq!(requests[0].2.wind_speed_unit, WindSpeedUnit::Mph);
        assert_eq!(requests[1].2.wind_speed_unit, WindSpeedUnit::Kmh);
    }

    #[tokio::test]
    async fn cosmetic_changes_do_not_refresh() {
        let provider = FakeProvider::answering(vec![Ok(fixture(48, 7))]);
        let state = state_with(provider.clone());
        state.refresh().await;

        state.update_preferences(PreferencesPatch { cute_language: Some(false), ..Default::default() });
        state.rename_location("1", "Casa").unwrap();
        state.toggle_favorite("1").unwrap();

        assert!(!state.needs_refresh());
        assert!(!state.refresh_if_needed().await);
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn time_format_change_marks_refresh() {
        let state = state_with(FakeProvider::answering(vec![Ok(fixture(48, 7))]));
        state.refresh().await;
        state.update_preferences(PreferencesPatch { time_format: Some(TimeFormat::H24), ..Default::default() });
        assert!(state.needs_refresh());
    }

    #[tokio::test]
    async fn stale_response_for_previous_location_is_discarded() {
        let (provider, mut gates) = FakeProvider::gated(2);
        let state = state_with(provider.clone());
        let late_for_paris = gates.pop().unwrap();
        let late_for_atlanta = gates.pop().unwrap();

        let mut stale = fixture(48, 7);
        stale.current.as_mut().unwrap().temperature_2m = Some(-40.0);
        let mut fresh = fixture(48, 7);
        fresh.current.as_mut().unwrap().temperature_2m = Some(21.0);

        let first = state.refresh();
        let second = async {
            tokio::task::yield_now().await;
            state.set_current_location(paris());
            state.refresh().await;
        };
        let release = async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            // Paris answers first, then the stale Atlanta response arrives.
            let _ = late_for_paris.send(Ok(fresh));
            tokio::task::yield_now().await;
            let _ = late_for_atlanta.send(Ok(stale));
        };
        tokio::join!(first, second, release);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.current_location.id, paris().id);
        assert_eq!(snapshot.current_weather.unwrap().temperature, 21);
        assert!(!snapshot.is_refreshing);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].0, paris().latitude);
    }

    #[tokio::test]
    async fn discarded_last_response_ends_initial_load() {
        let (provider, mut gates) = FakeProvider::gated(1);
        let state = state_with(provider);
        let gate = gates.pop().unwrap();

        let first = state.refresh();
        let retarget = async {
            tokio::task::yield_now().await;
            state.set_current_location(paris());
            let _ = gate.send(Ok(fixture(48, 7)));
        };
        tokio::join!(first, retarget);

        let snapshot = state.snapshot();
        assert!(!snapshot.is_loading && !snapshot.is_refreshing);
        assert!(snapshot.current_weather.is_none());
        assert_eq!(snapshot.error, None);
        assert!(state.needs_refresh());
    }

    #[tokio::test]
    async fn stale_failure_does_not_set_error() {
        let (provider, mut gates) = FakeProvider::gated(2);
        let state = state_with(provider);
        let for_kmh = gates.pop().unwrap();
        let for_mph = gates.pop().unwrap();

        let first = state.refresh();
        let second = async {
            tokio::task::yield_now().await;
            state.update_preferences(PreferencesPatch {
                wind_speed_unit: Some(WindSpeedUnit::Kmh),
                ..Default::default()
            });
            state.refresh().await;
        };
        let release = async {
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            let _ = for_kmh.send(Ok(fixture(48, 7)));
            tokio::task::yield_now().await;
            let _ = for_mph.send(Err(server_error()));
        };
        tokio::join!(first, second, release);

        let snapshot = state.snapshot();
        assert_eq!(snapshot.error, None);
        assert_eq!(snapshot.hourly_forecast.len(), 24);
        assert!(!snapshot.is_refreshing && !snapshot.is_loading);
    }

    #[test]
    fn location_collection_rules() {
        let state = state_with(FakeProvider::answering(vec![]));

        state.add_location(paris()).unwrap();
        assert_eq!(state.add_location(paris()), Err(LocationError::AlreadySaved(paris().id)));
        assert_eq!(state.remove_location("1"), Err(LocationError::DefaultNotRemovable("1".into())));
        assert_eq!(state.remove_location("nope"), Err(LocationError::NotFound("nope".into())));

        state.remove_location(&paris().id).unwrap();
        assert_eq!(state.read(|s| s.saved_locations.len()), 1);
    }

    #[test]
    fn location_mutations_leave_forecast_alone() {
        let state = state_with(FakeProvider::answering(vec![]));
        state.add_location(paris()).unwrap();

        state.rename_location(&paris().id, "  City of Light ").unwrap();
        state.set_location_emoji(&paris().id, "🥐").unwrap();
        assert!(state.toggle_favorite(&paris().id).unwrap());

        let snapshot = state.snapshot();
        let saved = snapshot.saved_locations.iter().find(|l| l.id == paris().id).unwrap();
        assert_eq!(saved.nickname.as_deref(), Some("City of Light"));
        assert_eq!(saved.emoji.as_deref(), Some("🥐"));
        assert!(saved.is_favorite);
        assert!(snapshot.hourly_forecast.is_empty());
        assert!(snapshot.current_weather.is_none());
    }

    #[test]
    fn blank_rename_is_ignored() {
        let state = state_with(FakeProvider::answering(vec![]));
        state.rename_location("1", "   ").unwrap();
        assert_eq!(state.read(|s| s.current_location.nickname.clone()), Some("Home".into()));
    }

    #[test]
    fn renaming_active_location_updates_it_too() {
        let state = state_with(FakeProvider::answering(vec![]));
        state.rename_location("1", "Peach City").unwrap();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.current_location.nickname.as_deref(), Some("Peach City"));
        assert_eq!(snapshot.saved_locations[0].nickname.as_deref(), Some("Peach City"));
    }

    #[tokio::test]
    async fn selecting_a_location_marks_refresh() {
        let state = state_with(FakeProvider::answering(vec![Ok(fixture(48, 7))]));
        state.refresh().await;
        state.add_location(paris()).unwrap();
        assert!(!state.needs_refresh());

        state.select_location(&paris().id).unwrap();
        assert!(state.needs_refresh());
        assert_eq!(state.select_location("missing"), Err(LocationError::NotFound("missing".into())));

        // Re-selecting the same place is not a change.
        state.refresh().await;
        state.select_location(&paris().id).unwrap();
        assert!(!state.needs_refresh());
    }

    #[test]
    fn favorites_sort_first() {
        let state = state_with(FakeProvider::answering(vec![]));
        let mut other = paris();
        other.id = "3".into();
        state.add_location(paris()).unwrap();
        state.add_location(other).unwrap();
        state.toggle_favorite("1").unwrap();
        state.toggle_favorite("3").unwrap();

        let snapshot = state.snapshot();
        let ids: Vec<&str> = snapshot.sorted_locations().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2988507"]);
    }

    #[test]
    fn persist_then_restore() {
        let mut store = MemoryStore::new();
        let state = state_with(FakeProvider::answering(vec![]));
        state.add_location(paris()).unwrap();
        state.select_location(&paris().id).unwrap();
        state.update_preferences(PreferencesPatch { user_name: Some("Ana".into()), ..Default::default() });
        state.persist(&mut store).unwrap();

        let restored = WeatherState::restore(FakeProvider::answering(vec![]), &store);
        let snapshot = restored.snapshot();
        assert_eq!(snapshot.current_location.id, paris().id);
        assert_eq!(snapshot.saved_locations.len(), 2);
        assert_eq!(snapshot.preferences.user_name, "Ana");
        assert!(snapshot.is_loading);
        assert!(snapshot.current_weather.is_none());
    }

    #[test]
    fn restore_falls_back_on_garbage() {
        let mut store = MemoryStore::new();
        store.write(PREFERENCES_KEY, "not json").unwrap();
        store.write(SAVED_LOCATIONS_KEY, "[]").unwrap();

        let snapshot = WeatherState::restore(FakeProvider::answering(vec![]), &store).snapshot();
        assert_eq!(snapshot.preferences, Preferences::default());
        assert!(snapshot.saved_locations.is_empty());
        assert_eq!(snapshot.current_location, Location::seed());
    }
}
