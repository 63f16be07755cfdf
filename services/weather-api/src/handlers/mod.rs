//! HTTP request handlers.

pub mod daily;
pub mod full;
pub mod health;
pub mod hourly;
pub mod locations;
pub mod realtime;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};

use weather_common::{CityKey, Location, WeatherError};

use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// JSON body whose rejections use the service's error format.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}

/// An untrashed location by code, or 404.
pub(crate) async fn require_location(state: &AppState, code: &str) -> Result<Location, ApiError> {
    state
        .repo
        .find_location(code)
        .await?
        .ok_or_else(|| WeatherError::LocationNotFound(code.to_string()).into())
}

/// The city a client address resolves to. Failures are counted and become 400.
pub(crate) fn locate_client(state: &AppState, ip: &str) -> Result<CityKey, ApiError> {
    match state.locator.locate(ip) {
        Ok(geo) => Ok(geo.city_key()),
        Err(e) => {
            metrics::record_geolocation("error");
            Err(e.into())
        }
    }
}

/// The registered location a client address belongs to.
///
/// Geolocation failures are 400; a city with no registered location is 404.
pub(crate) async fn location_for_ip(state: &AppState, ip: &str) -> Result<Location, ApiError> {
    let key = locate_client(state, ip)?;

    match state.repo.find_location_by_city(&key).await? {
        Some(location) => {
            metrics::record_geolocation("hit");
            Ok(location)
        }
        None => {
            metrics::record_geolocation("miss");
            Err(WeatherError::LocationNotFoundByCity {
                country_code: key.country_code,
                city_name: key.city_name,
            }
            .into())
        }
    }
}
