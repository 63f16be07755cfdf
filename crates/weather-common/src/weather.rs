//! Weather records attached to a location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Location;
use crate::reconcile::Keyed;

/// Current conditions for a location. At most one per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeWeather {
    pub location_code: String,
    pub temperature: i32,
    pub humidity: i32,
    pub precipitation: i32,
    pub wind_speed: i32,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

/// One hour of a location's hourly forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub location_code: String,
    pub hour_of_day: i32,
    pub temperature: i32,
    pub precipitation: i32,
    pub status: String,
}

/// Identity of an hourly record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourlyKey {
    pub hour_of_day: i32,
}

impl Keyed for HourlyWeather {
    type Key = HourlyKey;

    fn key(&self) -> HourlyKey {
        HourlyKey {
            hour_of_day: self.hour_of_day,
        }
    }
}

/// One day of a location's daily forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub location_code: String,
    pub day_of_month: i32,
    pub month: i32,
    pub min_temp: i32,
    pub max_temp: i32,
    pub precipitation: i32,
    pub status: String,
}

/// Identity of a daily record. Ordered by month first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DailyKey {
    pub month: i32,
    pub day_of_month: i32,
}

impl Keyed for DailyWeather {
    type Key = DailyKey;

    fn key(&self) -> DailyKey {
        DailyKey {
            month: self.month,
            day_of_month: self.day_of_month,
        }
    }
}

/// Everything known about a location in one aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct FullWeather {
    pub location: Location,
    pub realtime: Option<RealtimeWeather>,
    pub hourly: Vec<HourlyWeather>,
    pub daily: Vec<DailyWeather>,
}

/// A replacement payload for the full-weather update.
#[derive(Debug, Clone)]
pub struct FullWeatherUpdate {
    pub realtime: RealtimeWeather,
    pub hourly: Vec<HourlyWeather>,
    pub daily: Vec<DailyWeather>,
}

impl FullWeatherUpdate {
    /// Point every record at `code`.
    pub fn assign_location(&mut self, code: &str) {
        self.realtime.location_code = code.to_string();
        for item in &mut self.hourly {
            item.location_code = code.to_string();
        }
        for item in &mut self.daily {
            item.location_code = code.to_string();
        }
    }
}
