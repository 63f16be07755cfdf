//! The repository seam between the HTTP layer and a storage backend.

use async_trait::async_trait;

use weather_common::{
    CityKey, DailyWeather, FullWeather, FullWeatherUpdate, HourlyWeather, Location,
    RealtimeWeather, WeatherResult,
};

/// Storage operations for locations and their weather.
///
/// Trashed locations are invisible to every lookup except
/// [`location_exists`](WeatherRepository::location_exists), so a soft-deleted
/// code can never be registered again.
///
/// Replacement methods take the complete list for a location and reconcile it
/// against what is stored: identities missing from the list are removed, every
/// listed record is written. The whole replacement is atomic.
#[async_trait]
pub trait WeatherRepository: Send + Sync {
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> WeatherResult<()>;

    // === Location registry ===

    async fn location_exists(&self, code: &str) -> WeatherResult<bool>;

    /// Fails with `DuplicateResource` if the code is already taken.
    async fn add_location(&self, location: &Location) -> WeatherResult<Location>;

    /// Untrashed locations ordered by code.
    async fn list_locations(&self) -> WeatherResult<Vec<Location>>;

    async fn find_location(&self, code: &str) -> WeatherResult<Option<Location>>;

    async fn find_location_by_city(&self, key: &CityKey) -> WeatherResult<Option<Location>>;

    /// Updates every descriptive field. The code identifies the row.
    async fn update_location(&self, location: &Location) -> WeatherResult<Location>;

    /// Soft delete.
    async fn trash_location(&self, code: &str) -> WeatherResult<()>;

    // === Realtime ===

    async fn find_realtime(&self, code: &str) -> WeatherResult<Option<RealtimeWeather>>;

    async fn find_realtime_by_city(
        &self,
        key: &CityKey,
    ) -> WeatherResult<Option<(Location, RealtimeWeather)>>;

    /// Insert or overwrite the snapshot for `weather.location_code`.
    async fn save_realtime(&self, weather: &RealtimeWeather) -> WeatherResult<RealtimeWeather>;

    // === Hourly ===

    async fn list_hourly(&self, code: &str) -> WeatherResult<Vec<HourlyWeather>>;

    /// Hours strictly after `current_hour`, ordered by hour.
    async fn list_hourly_after(
        &self,
        code: &str,
        current_hour: i32,
    ) -> WeatherResult<Vec<HourlyWeather>>;

    async fn replace_hourly(
        &self,
        code: &str,
        records: Vec<HourlyWeather>,
    ) -> WeatherResult<Vec<HourlyWeather>>;

    // === Daily ===

    /// Ordered by month, then day.
    async fn list_daily(&self, code: &str) -> WeatherResult<Vec<DailyWeather>>;

    async fn replace_daily(
        &self,
        code: &str,
        records: Vec<DailyWeather>,
    ) -> WeatherResult<Vec<DailyWeather>>;

    // === Full ===

    /// Overwrite the realtime snapshot and reconcile both forecasts in one unit.
    async fn replace_full(&self, code: &str, update: FullWeatherUpdate)
        -> WeatherResult<FullWeather>;
}
