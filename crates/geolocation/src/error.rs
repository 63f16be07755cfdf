//! Geolocation errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("No geolocation record for IP address: {0}")]
    NotFound(String),

    #[error("Invalid geolocation database: {0}")]
    InvalidDatabase(String),

    #[error("Geolocation database has no IPv6 data for address: {0}")]
    Ipv6Unsupported(String),

    #[error("Error reading geolocation database: {0}")]
    Io(#[from] std::io::Error),
}

pub type GeoResult<T> = Result<T, GeoError>;
