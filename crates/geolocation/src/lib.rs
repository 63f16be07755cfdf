//! Offline IP geolocation.
//!
//! Resolves a client IP address to a (city, region, country) tuple using an
//! IP2Location BIN database (DB3 or any richer edition).

pub mod error;
pub mod reader;

use serde::Serialize;
use weather_common::CityKey;

pub use error::{GeoError, GeoResult};
pub use reader::{DbHeader, Ip2LocationDb};

/// The place an IP address belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoLocation {
    pub city_name: String,
    pub region_name: String,
    pub country_name: String,
    pub country_code: String,
}

impl GeoLocation {
    /// The registry key a location for this place would be stored under.
    pub fn city_key(&self) -> CityKey {
        CityKey::new(&self.country_code, &self.city_name)
    }
}

/// Anything that can turn an IP address into a location.
pub trait GeoLocator: Send + Sync {
    fn locate(&self, ip: &str) -> GeoResult<GeoLocation>;
}

/// Stands in when no database could be opened; every lookup fails.
#[derive(Debug, Clone)]
pub struct UnavailableLocator {
    reason: String,
}

impl UnavailableLocator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl GeoLocator for UnavailableLocator {
    fn locate(&self, _ip: &str) -> GeoResult<GeoLocation> {
        Err(GeoError::InvalidDatabase(self.reason.clone()))
    }
}
