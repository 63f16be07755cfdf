//! In-memory weather store.
//!
//! Same semantics as the PostgreSQL store, kept in process memory behind a
//! single `RwLock`. Every write takes the lock once, so replacements are
//! atomic with respect to readers.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use weather_common::{
    reconcile, CityKey, DailyKey, DailyWeather, FullWeather, FullWeatherUpdate, HourlyKey,
    HourlyWeather, Keyed, Location, RealtimeWeather, WeatherError, WeatherResult,
};

use crate::repository::WeatherRepository;

#[derive(Default)]
struct Tables {
    locations: BTreeMap<String, Location>,
    realtime: HashMap<String, RealtimeWeather>,
    hourly: HashMap<String, BTreeMap<HourlyKey, HourlyWeather>>,
    daily: HashMap<String, BTreeMap<DailyKey, DailyWeather>>,
}

impl Tables {
    fn active(&self, code: &str) -> Option<&Location> {
        self.locations.get(code).filter(|l| !l.trashed)
    }

    fn require_active(&self, code: &str) -> WeatherResult<&Location> {
        self.active(code)
            .ok_or_else(|| WeatherError::LocationNotFound(code.to_string()))
    }

    fn by_city(&self, key: &CityKey) -> Option<&Location> {
        self.locations
            .values()
            .find(|l| !l.trashed && l.matches_city(&key.country_code, &key.city_name))
    }

    fn hourly_of(&self, code: &str) -> Vec<HourlyWeather> {
        self.hourly
            .get(code)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    fn daily_of(&self, code: &str) -> Vec<DailyWeather> {
        self.daily
            .get(code)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    fn apply_hourly(&mut self, code: &str, records: Vec<HourlyWeather>) -> Vec<HourlyWeather> {
        let table = self.hourly.entry(code.to_string()).or_default();
        let stored: Vec<HourlyWeather> = table.values().cloned().collect();
        let plan = reconcile(&stored, records);

        debug!(
            location = code,
            deleted = plan.to_delete.len(),
            upserted = plan.to_upsert.len(),
            "Reconciled hourly forecast"
        );

        for key in &plan.to_delete {
            table.remove(key);
        }
        for record in plan.to_upsert {
            table.insert(record.key(), record);
        }
        table.values().cloned().collect()
    }

    fn apply_daily(&mut self, code: &str, records: Vec<DailyWeather>) -> Vec<DailyWeather> {
        let table = self.daily.entry(code.to_string()).or_default();
        let stored: Vec<DailyWeather> = table.values().cloned().collect();
        let plan = reconcile(&stored, records);

        debug!(
            location = code,
            deleted = plan.to_delete.len(),
            upserted = plan.to_upsert.len(),
            "Reconciled daily forecast"
        );

        for key in &plan.to_delete {
            table.remove(key);
        }
        for record in plan.to_upsert {
            table.insert(record.key(), record);
        }
        table.values().cloned().collect()
    }
}

/// Process-local store used by tests and `--in-memory` mode.
#[derive(Default)]
pub struct MemoryWeatherStore {
    tables: RwLock<Tables>,
}

impl MemoryWeatherStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WeatherRepository for MemoryWeatherStore {
    async fn ping(&self) -> WeatherResult<()> {
        Ok(())
    }

    async fn location_exists(&self, code: &str) -> WeatherResult<bool> {
        Ok(self.tables.read().await.locations.contains_key(code))
    }

    async fn add_location(&self, location: &Location) -> WeatherResult<Location> {
        let mut tables = self.tables.write().await;
        if tables.locations.contains_key(&location.code) {
            return Err(WeatherError::duplicate_location(&location.code));
        }

        let mut stored = location.clone();
        stored.trashed = false;
        tables.locations.insert(stored.code.clone(), stored.clone());
        Ok(stored)
    }

    async fn list_locations(&self) -> WeatherResult<Vec<Location>> {
        let tables = self.tables.read().await;
        Ok(tables
            .locations
            .values()
            .filter(|l| !l.trashed)
            .cloned()
            .collect())
    }

    async fn find_location(&self, code: &str) -> WeatherResult<Option<Location>> {
        Ok(self.tables.read().await.active(code).cloned())
    }

    async fn find_location_by_city(&self, key: &CityKey) -> WeatherResult<Option<Location>> {
        Ok(self.tables.read().await.by_city(key).cloned())
    }

    async fn update_location(&self, location: &Location) -> WeatherResult<Location> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .locations
            .get_mut(&location.code)
            .filter(|l| !l.trashed)
            .ok_or_else(|| WeatherError::unknown_location(&location.code))?;

        stored.city_name = location.city_name.clone();
        stored.region_name = location.region_name.clone();
        stored.country_name = location.country_name.clone();
        stored.country_code = location.country_code.clone();
        stored.enabled = location.enabled;
        Ok(stored.clone())
    }

    async fn trash_location(&self, code: &str) -> WeatherResult<()> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .locations
            .get_mut(code)
            .filter(|l| !l.trashed)
            .ok_or_else(|| WeatherError::unknown_location(code))?;

        stored.trashed = true;
        Ok(())
    }

    async fn find_realtime(&self, code: &str) -> WeatherResult<Option<RealtimeWeather>> {
        let tables = self.tables.read().await;
        if tables.active(code).is_none() {
            return Ok(None);
        }
        Ok(tables.realtime.get(code).cloned())
    }

    async fn find_realtime_by_city(
        &self,
        key: &CityKey,
    ) -> WeatherResult<Option<(Location, RealtimeWeather)>> {
        let tables = self.tables.read().await;
        let found = tables.by_city(key).and_then(|location| {
            tables
                .realtime
                .get(&location.code)
                .map(|weather| (location.clone(), weather.clone()))
        });
        Ok(found)
    }

    async fn save_realtime(&self, weather: &RealtimeWeather) -> WeatherResult<RealtimeWeather> {
        let mut tables = self.tables.write().await;
        tables.require_active(&weather.location_code)?;
        tables
            .realtime
            .insert(weather.location_code.clone(), weather.clone());
        Ok(weather.clone())
    }

    async fn list_hourly(&self, code: &str) -> WeatherResult<Vec<HourlyWeather>> {
        let tables = self.tables.read().await;
        if tables.active(code).is_none() {
            return Ok(Vec::new());
        }
        Ok(tables.hourly_of(code))
    }

    async fn list_hourly_after(
        &self,
        code: &str,
        current_hour: i32,
    ) -> WeatherResult<Vec<HourlyWeather>> {
        let mut hours = self.list_hourly(code).await?;
        hours.retain(|h| h.hour_of_day > current_hour);
        Ok(hours)
    }

    async fn replace_hourly(
        &self,
        code: &str,
        records: Vec<HourlyWeather>,
    ) -> WeatherResult<Vec<HourlyWeather>> {
        let mut tables = self.tables.write().await;
        tables.require_active(code)?;
        Ok(tables.apply_hourly(code, records))
    }

    async fn list_daily(&self, code: &str) -> WeatherResult<Vec<DailyWeather>> {
        let tables = self.tables.read().await;
        if tables.active(code).is_none() {
            return Ok(Vec::new());
        }
        Ok(tables.daily_of(code))
    }

    async fn replace_daily(
        &self,
        code: &str,
        records: Vec<DailyWeather>,
    ) -> WeatherResult<Vec<DailyWeather>> {
        let mut tables = self.tables.write().await;
        tables.require_active(code)?;
        Ok(tables.apply_daily(code, records))
    }

    async fn replace_full(
        &self,
        code: &str,
        mut update: FullWeatherUpdate,
    ) -> WeatherResult<FullWeather> {
        let mut tables = self.tables.write().await;
        let location = tables.require_active(code)?.clone();

        update.assign_location(code);

        tables
            .realtime
            .insert(code.to_string(), update.realtime.clone());
        let hourly = tables.apply_hourly(code, update.hourly);
        let daily = tables.apply_daily(code, update.daily);

        Ok(FullWeather {
            location,
            realtime: Some(update.realtime),
            hourly,
            daily,
        })
    }
}
