//! Error types for the weather services.

use thiserror::Error;

/// Result type alias using WeatherError.
pub type WeatherResult<T> = Result<T, WeatherError>;

/// Primary error type for weather operations.
#[derive(Debug, Error)]
pub enum WeatherError {
    // === Lookup Errors ===
    #[error("No location found with the given code: {0}")]
    LocationNotFound(String),

    #[error("No location found with the given country code: {country_code} and city name: {city_name}")]
    LocationNotFoundByCity {
        country_code: String,
        city_name: String,
    },

    #[error("{0}")]
    ResourceNotFound(String),

    #[error("{0}")]
    DuplicateResource(String),

    // === Request Errors ===
    #[error("{0}")]
    BadRequest(String),

    #[error("Validation failed for the following fields: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Geolocation(String),

    #[error("Missing or invalid API key")]
    Unauthorized,

    // === Infrastructure Errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// A single failed field constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl WeatherError {
    /// Location missing from the registry, in the registry's own wording.
    pub fn unknown_location(code: &str) -> Self {
        WeatherError::ResourceNotFound(format!(
            "Sorry! cannot find location with code: {}",
            code
        ))
    }

    pub fn duplicate_location(code: &str) -> Self {
        WeatherError::DuplicateResource(format!(
            "Sorry! location code {} already exist!",
            code
        ))
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WeatherError::BadRequest(_)
            | WeatherError::Validation(_)
            | WeatherError::Geolocation(_) => 400,

            WeatherError::Unauthorized => 401,

            WeatherError::LocationNotFound(_)
            | WeatherError::LocationNotFoundByCity { .. }
            | WeatherError::ResourceNotFound(_) => 404,

            WeatherError::DuplicateResource(_) => 409,

            WeatherError::DatabaseError(_) => 500,
        }
    }

    /// Per-field messages for validation failures, empty otherwise.
    pub fn field_messages(&self) -> Vec<String> {
        match self {
            WeatherError::Validation(errors) => errors.iter().map(|e| e.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}
