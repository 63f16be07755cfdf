//! Hourly forecast handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{Extension, FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use weather_common::{validate_list, HourlyWeather, Location, WeatherError};

use super::{location_for_ip, require_location, JsonBody};
use crate::auth::WriteAccess;
use crate::client_ip::ClientIp;
use crate::dto::{HourlyForecastDto, HourlyWeatherDto};
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

pub const CURRENT_HOUR_HEADER: &str = "X-Current-Hour";

/// The caller's local hour from `X-Current-Hour`, 0 to 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentHour(pub i32);

pub fn parse_current_hour(value: Option<&str>) -> Option<i32> {
    value
        .and_then(|v| v.trim().parse::<i32>().ok())
        .filter(|hour| (0..=23).contains(hour))
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentHour
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CURRENT_HOUR_HEADER)
            .and_then(|v| v.to_str().ok());

        parse_current_hour(value)
            .map(CurrentHour)
            .ok_or_else(|| ApiError::bad_request("Missing or invalid X-Current-Hour header"))
    }
}

fn forecast_response(location: &Location, hours: Vec<HourlyWeather>) -> Response {
    if hours.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(HourlyForecastDto::new(location, hours)).into_response()
}

/// GET /api/v1/hourly
pub async fn hourly_by_ip_handler(
    CurrentHour(hour): CurrentHour,
    Extension(state): Extension<Arc<AppState>>,
    ClientIp(ip): ClientIp,
) -> Result<Response, ApiError> {
    let location = location_for_ip(&state, &ip).await?;
    let hours = state.repo.list_hourly_after(&location.code, hour).await?;

    Ok(forecast_response(&location, hours))
}

/// GET /api/v1/hourly/:code
pub async fn hourly_by_code_handler(
    CurrentHour(hour): CurrentHour,
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let location = require_location(&state, &code).await?;
    let hours = state.repo.list_hourly_after(&code, hour).await?;

    Ok(forecast_response(&location, hours))
}

/// PUT /api/v1/hourly/:code
pub async fn update_hourly_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
    JsonBody(items): JsonBody<Vec<HourlyWeatherDto>>,
) -> Result<Json<HourlyForecastDto>, ApiError> {
    if items.is_empty() {
        return Err(WeatherError::BadRequest("Hourly forecast data cannot be empty".to_string()).into());
    }

    let records: Vec<HourlyWeather> = items.into_iter().map(|dto| dto.into_record(&code)).collect();
    validate_list("hourly_forecast", &records)?;

    let location = require_location(&state, &code).await?;
    let updated = state.repo.replace_hourly(&code, records).await?;
    metrics::record_replacement("hourly", updated.len());
    info!(code = %code, hours = updated.len(), "Hourly forecast replaced");

    Ok(Json(HourlyForecastDto::new(&location, updated)))
}
