//! Location registry entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered location, keyed by its short code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub code: String,
    pub city_name: String,
    pub region_name: String,
    pub country_name: String,
    pub country_code: String,
    pub enabled: bool,
    /// Soft-deleted locations stay in the store but are invisible to lookups.
    #[serde(default)]
    pub trashed: bool,
}

impl Location {
    pub fn new(
        code: impl Into<String>,
        city_name: impl Into<String>,
        region_name: impl Into<String>,
        country_name: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            city_name: city_name.into(),
            region_name: region_name.into(),
            country_name: country_name.into(),
            country_code: country_code.into(),
            enabled: true,
            trashed: false,
        }
    }

    /// Whether this location matches a geolocation result.
    pub fn matches_city(&self, country_code: &str, city_name: &str) -> bool {
        self.country_code == country_code && self.city_name == city_name
    }
}

/// Renders as "City, Region, Country"; the region is skipped when empty.
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, ", self.city_name)?;
        if !self.region_name.is_empty() {
            write!(f, "{}, ", self.region_name)?;
        }
        write!(f, "{}", self.country_name)
    }
}

/// The (country code, city name) pair used to find a location from an IP lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CityKey {
    pub country_code: String,
    pub city_name: String,
}

impl CityKey {
    pub fn new(country_code: impl Into<String>, city_name: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            city_name: city_name.into(),
        }
    }
}
