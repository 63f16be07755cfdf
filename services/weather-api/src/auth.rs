//! API key check for mutating routes.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use weather_common::WeatherError;

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Present in a handler's arguments when the request may write.
///
/// Passes every request when no key is configured.
#[derive(Debug, Clone, Copy)]
pub struct WriteAccess;

pub fn key_matches(expected: Option<&str>, presented: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => presented == Some(expected),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for WriteAccess
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let expected = parts
            .extensions
            .get::<Arc<AppState>>()
            .and_then(|state| state.api_key.clone());

        let presented = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        if key_matches(expected.as_deref(), presented) {
            Ok(WriteAccess)
        } else {
            debug!(method = %parts.method, uri = %parts.uri, "Write rejected");
            Err(WeatherError::Unauthorized.into())
        }
    }
}
