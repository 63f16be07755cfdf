//! Full weather handlers: realtime, hourly and daily in one document.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::Utc;
use tracing::info;

use weather_common::{FullWeather, Location, Validate, WeatherError};

use super::{location_for_ip, require_location, JsonBody};
use crate::auth::WriteAccess;
use crate::client_ip::ClientIp;
use crate::dto::FullWeatherDto;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

async fn assemble(state: &AppState, location: Location) -> Result<FullWeather, ApiError> {
    let realtime = state.repo.find_realtime(&location.code).await?;
    let hourly = state.repo.list_hourly(&location.code).await?;
    let daily = state.repo.list_daily(&location.code).await?;

    Ok(FullWeather {
        location,
        realtime,
        hourly,
        daily,
    })
}

/// GET /api/v1/full
pub async fn full_by_ip_handler(
    Extension(state): Extension<Arc<AppState>>,
    ClientIp(ip): ClientIp,
) -> Result<Json<FullWeatherDto>, ApiError> {
    let location = location_for_ip(&state, &ip).await?;
    let full = assemble(&state, location).await?;

    Ok(Json(full.into()))
}

/// GET /api/v1/full/:code
pub async fn full_by_code_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<FullWeatherDto>, ApiError> {
    let location = require_location(&state, &code).await?;
    let full = assemble(&state, location).await?;

    Ok(Json(full.into()))
}

/// PUT /api/v1/full/:code
pub async fn update_full_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
    JsonBody(dto): JsonBody<FullWeatherDto>,
) -> Result<Json<FullWeatherDto>, ApiError> {
    if dto.hourly_forecast.is_empty() {
        return Err(WeatherError::BadRequest("Hourly weather data cannot be empty".to_string()).into());
    }
    if dto.daily_forecast.is_empty() {
        return Err(WeatherError::BadRequest("Daily weather data cannot be empty".to_string()).into());
    }

    let update = dto.into_update(&code, Utc::now());
    update.validate()?;

    require_location(&state, &code).await?;
    let full = state.repo.replace_full(&code, update).await?;
    metrics::record_replacement("full", full.hourly.len() + full.daily.len());
    info!(
        code = %code,
        hours = full.hourly.len(),
        days = full.daily.len(),
        "Full weather replaced"
    );

    Ok(Json(full.into()))
}
