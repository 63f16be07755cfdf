//! Daily forecast handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use weather_common::{validate_list, DailyWeather, Location, WeatherError};

use super::{location_for_ip, require_location, JsonBody};
use crate::auth::WriteAccess;
use crate::client_ip::ClientIp;
use crate::dto::{DailyForecastDto, DailyWeatherDto};
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

fn forecast_response(location: &Location, days: Vec<DailyWeather>) -> Response {
    if days.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(DailyForecastDto::new(location, days)).into_response()
}

/// GET /api/v1/daily
pub async fn daily_by_ip_handler(
    Extension(state): Extension<Arc<AppState>>,
    ClientIp(ip): ClientIp,
) -> Result<Response, ApiError> {
    let location = location_for_ip(&state, &ip).await?;
    let days = state.repo.list_daily(&location.code).await?;

    Ok(forecast_response(&location, days))
}

/// GET /api/v1/daily/:code
pub async fn daily_by_code_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let location = require_location(&state, &code).await?;
    let days = state.repo.list_daily(&code).await?;

    Ok(forecast_response(&location, days))
}

/// PUT /api/v1/daily/:code
pub async fn update_daily_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
    JsonBody(items): JsonBody<Vec<DailyWeatherDto>>,
) -> Result<Json<DailyForecastDto>, ApiError> {
    if items.is_empty() {
        return Err(WeatherError::BadRequest("Daily forecast data cannot be empty".to_string()).into());
    }

    let records: Vec<DailyWeather> = items.into_iter().map(|dto| dto.into_record(&code)).collect();
    validate_list("daily_forecast", &records)?;

    let location = require_location(&state, &code).await?;
    let updated = state.repo.replace_daily(&code, records).await?;
    metrics::record_replacement("daily", updated.len());
    info!(code = %code, days = updated.len(), "Daily forecast replaced");

    Ok(Json(DailyForecastDto::new(&location, updated)))
}
