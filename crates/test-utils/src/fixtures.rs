//! Common test fixtures for the weather services.
//!
//! Locations mirror the ones the geolocation sample ranges resolve to, so a
//! test can go from IP to stored weather without extra setup.

use chrono::{TimeZone, Utc};
use weather_common::{DailyWeather, HourlyWeather, Location, RealtimeWeather};

pub fn new_york() -> Location {
    Location::new(
        "NYC_USA",
        "New York City",
        "New York",
        "United States of America",
        "US",
    )
}

pub fn delhi() -> Location {
    Location::new("DELHI_IN", "Delhi", "Delhi", "India", "IN")
}

pub fn los_angeles() -> Location {
    Location::new(
        "LACA_US",
        "Los Angeles",
        "California",
        "United States of America",
        "US",
    )
}

pub fn realtime(code: &str) -> RealtimeWeather {
    RealtimeWeather {
        location_code: code.to_string(),
        temperature: 12,
        humidity: 32,
        precipitation: 88,
        wind_speed: 5,
        status: "Cloudy".to_string(),
        last_updated: Utc.with_ymd_and_hms(2024, 7, 16, 10, 0, 0).unwrap(),
    }
}

pub fn hourly(code: &str, hour_of_day: i32, temperature: i32, status: &str) -> HourlyWeather {
    HourlyWeather {
        location_code: code.to_string(),
        hour_of_day,
        temperature,
        precipitation: 70,
        status: status.to_string(),
    }
}

pub fn daily(code: &str, day_of_month: i32, month: i32, status: &str) -> DailyWeather {
    DailyWeather {
        location_code: code.to_string(),
        day_of_month,
        month,
        min_temp: 23,
        max_temp: 32,
        precipitation: 40,
        status: status.to_string(),
    }
}

/// Three hours of forecast starting at 10:00.
pub fn hourly_forecast(code: &str) -> Vec<HourlyWeather> {
    vec![
        hourly(code, 10, 13, "Cloudy"),
        hourly(code, 11, 15, "Sunny"),
        hourly(code, 12, 16, "Sunny"),
    ]
}

/// Two days of forecast in July.
pub fn daily_forecast(code: &str) -> Vec<DailyWeather> {
    vec![daily(code, 16, 7, "Cloudy"), daily(code, 17, 7, "Sunny")]
}
