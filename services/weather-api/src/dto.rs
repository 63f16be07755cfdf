//! Request and response bodies.
//!
//! Input structs default every missing field so that absent values surface
//! as validation errors rather than deserialization failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use weather_common::{
    DailyWeather, FullWeather, FullWeatherUpdate, HourlyWeather, Location, RealtimeWeather,
};

/// Timestamp format used for `last_updated`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDto {
    pub code: String,
    pub city_name: String,
    pub region_name: String,
    pub country_name: String,
    pub country_code: String,
    pub enabled: bool,
}

impl From<Location> for LocationDto {
    fn from(location: Location) -> Self {
        Self {
            code: location.code,
            city_name: location.city_name,
            region_name: location.region_name,
            country_name: location.country_name,
            country_code: location.country_code,
            enabled: location.enabled,
        }
    }
}

impl From<LocationDto> for Location {
    fn from(dto: LocationDto) -> Self {
        Location {
            code: dto.code,
            city_name: dto.city_name,
            region_name: dto.region_name,
            country_name: dto.country_name,
            country_code: dto.country_code,
            enabled: dto.enabled,
            trashed: false,
        }
    }
}

/// Realtime conditions. `location` and `last_updated` are output-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeWeatherDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub temperature: i32,
    pub humidity: i32,
    pub precipitation: i32,
    pub wind_speed: i32,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl RealtimeWeatherDto {
    /// Render a stored snapshot, labelled with `location` when given.
    pub fn from_record(weather: &RealtimeWeather, location: Option<&Location>) -> Self {
        Self {
            location: location.map(|l| l.to_string()),
            temperature: weather.temperature,
            humidity: weather.humidity,
            precipitation: weather.precipitation,
            wind_speed: weather.wind_speed,
            status: weather.status.clone(),
            last_updated: Some(weather.last_updated.format(TIMESTAMP_FORMAT).to_string()),
        }
    }

    pub fn into_record(self, code: &str, now: DateTime<Utc>) -> RealtimeWeather {
        RealtimeWeather {
            location_code: code.to_string(),
            temperature: self.temperature,
            humidity: self.humidity,
            precipitation: self.precipitation,
            wind_speed: self.wind_speed,
            status: self.status,
            last_updated: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HourlyWeatherDto {
    pub hour_of_day: i32,
    pub temperature: i32,
    pub precipitation: i32,
    pub status: String,
}

impl From<HourlyWeather> for HourlyWeatherDto {
    fn from(weather: HourlyWeather) -> Self {
        Self {
            hour_of_day: weather.hour_of_day,
            temperature: weather.temperature,
            precipitation: weather.precipitation,
            status: weather.status,
        }
    }
}

impl HourlyWeatherDto {
    pub fn into_record(self, code: &str) -> HourlyWeather {
        HourlyWeather {
            location_code: code.to_string(),
            hour_of_day: self.hour_of_day,
            temperature: self.temperature,
            precipitation: self.precipitation,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyWeatherDto {
    pub day_of_month: i32,
    pub month: i32,
    pub min_temp: i32,
    pub max_temp: i32,
    pub precipitation: i32,
    pub status: String,
}

impl From<DailyWeather> for DailyWeatherDto {
    fn from(weather: DailyWeather) -> Self {
        Self {
            day_of_month: weather.day_of_month,
            month: weather.month,
            min_temp: weather.min_temp,
            max_temp: weather.max_temp,
            precipitation: weather.precipitation,
            status: weather.status,
        }
    }
}

impl DailyWeatherDto {
    pub fn into_record(self, code: &str) -> DailyWeather {
        DailyWeather {
            location_code: code.to_string(),
            day_of_month: self.day_of_month,
            month: self.month,
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            precipitation: self.precipitation,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecastDto {
    pub location: String,
    pub hourly_forecast: Vec<HourlyWeatherDto>,
}

impl HourlyForecastDto {
    pub fn new(location: &Location, hours: Vec<HourlyWeather>) -> Self {
        Self {
            location: location.to_string(),
            hourly_forecast: hours.into_iter().map(HourlyWeatherDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastDto {
    pub location: String,
    pub daily_forecast: Vec<DailyWeatherDto>,
}

impl DailyForecastDto {
    pub fn new(location: &Location, days: Vec<DailyWeather>) -> Self {
        Self {
            location: location.to_string(),
            daily_forecast: days.into_iter().map(DailyWeatherDto::from).collect(),
        }
    }
}

/// The full aggregate. Realtime conditions carry no `location` of their own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FullWeatherDto {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realtime_weather: Option<RealtimeWeatherDto>,
    pub hourly_forecast: Vec<HourlyWeatherDto>,
    pub daily_forecast: Vec<DailyWeatherDto>,
}

impl From<FullWeather> for FullWeatherDto {
    fn from(full: FullWeather) -> Self {
        Self {
            location: full.location.to_string(),
            realtime_weather: full
                .realtime
                .as_ref()
                .map(|weather| RealtimeWeatherDto::from_record(weather, None)),
            hourly_forecast: full.hourly.into_iter().map(HourlyWeatherDto::from).collect(),
            daily_forecast: full.daily.into_iter().map(DailyWeatherDto::from).collect(),
        }
    }
}

impl FullWeatherDto {
    /// A missing realtime block becomes an all-default one, which fails validation.
    pub fn into_update(self, code: &str, now: DateTime<Utc>) -> FullWeatherUpdate {
        FullWeatherUpdate {
            realtime: self
                .realtime_weather
                .unwrap_or_default()
                .into_record(code, now),
            hourly: self
                .hourly_forecast
                .into_iter()
                .map(|dto| dto.into_record(code))
                .collect(),
            daily: self
                .daily_forecast
                .into_iter()
                .map(|dto| dto.into_record(code))
                .collect(),
        }
    }
}
