//! Field constraints for incoming records.

use std::collections::HashSet;

use crate::error::{FieldError, WeatherError, WeatherResult};
use crate::location::Location;
use crate::reconcile::Keyed;
use crate::weather::{DailyWeather, FullWeatherUpdate, HourlyWeather, RealtimeWeather};

const TEMPERATURE_RANGE: (i32, i32) = (-50, 50);
const PERCENT_RANGE: (i32, i32) = (0, 100);
const WIND_SPEED_RANGE: (i32, i32) = (0, 200);
const STATUS_LENGTH: (usize, usize) = (3, 50);

/// A record whose fields can be checked against the service's constraints.
pub trait Validate {
    /// Return every violated constraint; empty when the record is valid.
    fn violations(&self) -> Vec<FieldError>;

    fn validate(&self) -> WeatherResult<()> {
        let errors = self.violations();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(WeatherError::Validation(errors))
        }
    }
}

/// Collects violations for one record.
struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn range(&mut self, field: &str, value: i32, (min, max): (i32, i32), message: &str) -> &mut Self {
        if value < min || value > max {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    fn length(&mut self, field: &str, value: &str, (min, max): (usize, usize), message: &str) -> &mut Self {
        let len = value.chars().count();
        if len < min || len > max {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    fn finish(&mut self) -> Vec<FieldError> {
        std::mem::take(&mut self.errors)
    }
}

fn check_status(checker: &mut Checker, status: &str) {
    if status.trim().is_empty() {
        checker.errors.push(FieldError::new("status", "Status must not be empty"));
    } else {
        checker.length(
            "status",
            status,
            STATUS_LENGTH,
            "Status must be in between 3-50 characters",
        );
    }
}

impl Validate for Location {
    fn violations(&self) -> Vec<FieldError> {
        Checker::new()
            .length("code", &self.code, (3, 12), "Location code must have 3-12 characters")
            .length("city_name", &self.city_name, (3, 128), "City name must have 3-128 characters")
            .length("region_name", &self.region_name, (0, 128), "Region name must not exceed 128 characters")
            .length("country_name", &self.country_name, (3, 64), "Country name must have 3-64 characters")
            .length("country_code", &self.country_code, (2, 2), "Country code must have 2 characters")
            .finish()
    }
}

impl Validate for RealtimeWeather {
    fn violations(&self) -> Vec<FieldError> {
        let mut checker = Checker::new();
        checker
            .range("temperature", self.temperature, TEMPERATURE_RANGE, "Temperature must be in the range of -50 to 50 Celsius degree")
            .range("humidity", self.humidity, PERCENT_RANGE, "Humidity must be in the range of 0 to 100 percentage")
            .range("precipitation", self.precipitation, PERCENT_RANGE, "Precipitation must be in the range of 0 to 100 percentage")
            .range("wind_speed", self.wind_speed, WIND_SPEED_RANGE, "Wind speed must be in the range of 0 to 200 km/h");
        check_status(&mut checker, &self.status);
        checker.finish()
    }
}

impl Validate for HourlyWeather {
    fn violations(&self) -> Vec<FieldError> {
        let mut checker = Checker::new();
        checker
            .range("hour_of_day", self.hour_of_day, (0, 23), "Hour of day must be in between 0-23")
            .range("temperature", self.temperature, TEMPERATURE_RANGE, "Temperature must be in the range of -50 to 50 Celsius degree")
            .range("precipitation", self.precipitation, PERCENT_RANGE, "Precipitation must be in the range of 0 to 100 percentage");
        check_status(&mut checker, &self.status);
        checker.finish()
    }
}

impl Validate for DailyWeather {
    fn violations(&self) -> Vec<FieldError> {
        let mut checker = Checker::new();
        checker
            .range("day_of_month", self.day_of_month, (1, 31), "Day of month must be in between 1-31")
            .range("month", self.month, (1, 12), "Month must be in between 1-12")
            .range("min_temp", self.min_temp, TEMPERATURE_RANGE, "Minimum temperature must be in the range of -50 to 50 Celsius degree")
            .range("max_temp", self.max_temp, TEMPERATURE_RANGE, "Maximum temperature must be in the range of -50 to 50 Celsius degree")
            .range("precipitation", self.precipitation, PERCENT_RANGE, "Precipitation must be in the range of 0 to 100 percentage");
        check_status(&mut checker, &self.status);
        checker.finish()
    }
}

/// Describe a duplicated identity for the error message.
pub trait DescribeKey: Keyed {
    fn describe_key(&self) -> String;
}

impl DescribeKey for HourlyWeather {
    fn describe_key(&self) -> String {
        format!("Duplicate hour_of_day {}", self.hour_of_day)
    }
}

impl DescribeKey for DailyWeather {
    fn describe_key(&self) -> String {
        format!("Duplicate day {}/{}", self.day_of_month, self.month)
    }
}

/// Violations for a replacement list, with fields reported as `name[i].field`.
///
/// Two records sharing an identity are reported against the later one.
pub fn list_violations<T: Validate + DescribeKey>(name: &str, items: &[T]) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (i, item) in items.iter().enumerate() {
        for err in item.violations() {
            errors.push(FieldError::new(format!("{}[{}].{}", name, i, err.field), err.message));
        }
        if !seen.insert(item.key()) {
            errors.push(FieldError::new(format!("{}[{}]", name, i), item.describe_key()));
        }
    }

    errors
}

impl Validate for FullWeatherUpdate {
    fn violations(&self) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = self
            .realtime
            .violations()
            .into_iter()
            .map(|e| FieldError::new(format!("realtime_weather.{}", e.field), e.message))
            .collect();
        errors.extend(list_violations("hourly_forecast", &self.hourly));
        errors.extend(list_violations("daily_forecast", &self.daily));
        errors
    }
}

/// Validate a replacement list in one pass.
pub fn validate_list<T: Validate + DescribeKey>(name: &str, items: &[T]) -> WeatherResult<()> {
    let errors = list_violations(name, items);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(WeatherError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn hourly(hour: i32, temperature: i32, precipitation: i32, status: &str) -> HourlyWeather {
        HourlyWeather {
            location_code: "NYC_USA".to_string(),
            hour_of_day: hour,
            temperature,
            precipitation,
            status: status.to_string(),
        }
    }

    #[test]
    fn test_valid_hourly() {
        assert!(hourly(10, 13, 70, "Cloudy").validate().is_ok());
    }

    #[test]
    fn test_hourly_out_of_range() {
        let errors = hourly(24, 133, 120, "Cloudy").violations();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();

        assert_eq!(errors.len(), 3);
        assert!(messages.contains(&"Hour of day must be in between 0-23"));
        assert!(messages.contains(&"Temperature must be in the range of -50 to 50 Celsius degree"));
        assert!(messages.contains(&"Precipitation must be in the range of 0 to 100 percentage"));
    }

    #[test]
    fn test_status_length() {
        let errors = hourly(10, 13, 70, "Ok").violations();
        assert_eq!(errors, vec![FieldError::new("status", "Status must be in between 3-50 characters")]);

        let errors = hourly(10, 13, 70, "   ").violations();
        assert_eq!(errors[0].message, "Status must not be empty");

        let long = "x".repeat(51);
        assert_eq!(hourly(10, 13, 70, &long).violations().len(), 1);
    }

    #[test]
    fn test_length_counts_padding() {
        // Surrounding spaces count toward the length; only all-blank is rejected
        assert!(hourly(10, 13, 70, "  ab  ").validate().is_ok());
        assert_eq!(
            hourly(10, 13, 70, " a").violations(),
            vec![FieldError::new("status", "Status must be in between 3-50 characters")]
        );

        let mut location = Location::new(" NY ", "New York City", "New York", "United States of America", "US");
        assert!(location.validate().is_ok());
        location.code = " NYC_USA_LONG ".to_string();
        let fields: Vec<_> = location.violations().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["code"]);
    }

    #[test]
    fn test_realtime_bounds() {
        let realtime = RealtimeWeather {
            location_code: "NYC_USA".to_string(),
            temperature: -51,
            humidity: 101,
            precipitation: 50,
            wind_speed: 250,
            status: "Sunny".to_string(),
            last_updated: Utc::now(),
        };

        let fields: Vec<_> = realtime.violations().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["temperature", "humidity", "wind_speed"]);
    }

    #[test]
    fn test_daily_bounds() {
        let daily = DailyWeather {
            location_code: "NYC_USA".to_string(),
            day_of_month: 0,
            month: 13,
            min_temp: 23,
            max_temp: 32,
            precipitation: 40,
            status: "Cloudy".to_string(),
        };

        let fields: Vec<_> = daily.violations().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["day_of_month", "month"]);
    }

    #[test]
    fn test_location_constraints() {
        let mut location = Location::new("LACA_US", "Los Angeles", "California", "United States of America", "US");
        assert!(location.validate().is_ok());

        location.code = "LA".to_string();
        location.country_code = "USA".to_string();
        let fields: Vec<_> = location.violations().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["code", "country_code"]);
    }

    #[test]
    fn test_list_paths_and_duplicates() {
        let items = vec![
            hourly(10, 13, 70, "Cloudy"),
            hourly(11, 15, 120, "Sunny"),
            hourly(10, 14, 60, "Rainy"),
        ];

        let errors = list_violations("hourly_forecast", &items);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "hourly_forecast[1].precipitation");
        assert_eq!(errors[1].field, "hourly_forecast[2]");
        assert_eq!(errors[1].message, "Duplicate hour_of_day 10");
    }

    #[test]
    fn test_full_update_prefixes_fields() {
        let update = FullWeatherUpdate {
            realtime: RealtimeWeather {
                location_code: "NYC_USA".to_string(),
                temperature: 51,
                humidity: 32,
                precipitation: 88,
                wind_speed: 5,
                status: "Cloudy".to_string(),
                last_updated: Utc::now(),
            },
            hourly: vec![hourly(10, 13, 70, "Cloudy"), hourly(10, 14, 70, "Sunny")],
            daily: Vec::new(),
        };

        let fields: Vec<String> = update.violations().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["realtime_weather.temperature", "hourly_forecast[1]"]);
    }
}
