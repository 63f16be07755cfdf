//! Common types and rules shared across the weather services.

pub mod error;
pub mod location;
pub mod reconcile;
pub mod validation;
pub mod weather;

pub use error::{FieldError, WeatherError, WeatherResult};
pub use location::{CityKey, Location};
pub use reconcile::{reconcile, Keyed, Reconciliation};
pub use validation::{list_violations, validate_list, DescribeKey, Validate};
pub use weather::{
    DailyKey, DailyWeather, FullWeather, FullWeatherUpdate, HourlyKey, HourlyWeather,
    RealtimeWeather,
};
