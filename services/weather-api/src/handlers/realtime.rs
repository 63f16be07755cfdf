//! Realtime weather handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use chrono::Utc;
use tracing::info;

use weather_common::{Validate, WeatherError};

use super::{locate_client, require_location, JsonBody};
use crate::auth::WriteAccess;
use crate::client_ip::ClientIp;
use crate::dto::RealtimeWeatherDto;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// GET /api/v1/realtime
pub async fn realtime_by_ip_handler(
    Extension(state): Extension<Arc<AppState>>,
    ClientIp(ip): ClientIp,
) -> Result<Json<RealtimeWeatherDto>, ApiError> {
    let key = locate_client(&state, &ip)?;

    let Some((location, weather)) = state.repo.find_realtime_by_city(&key).await? else {
        metrics::record_geolocation("miss");
        return Err(WeatherError::LocationNotFoundByCity {
            country_code: key.country_code,
            city_name: key.city_name,
        }
        .into());
    };
    metrics::record_geolocation("hit");

    Ok(Json(RealtimeWeatherDto::from_record(&weather, Some(&location))))
}

/// GET /api/v1/realtime/:code
pub async fn realtime_by_code_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RealtimeWeatherDto>, ApiError> {
    let location = require_location(&state, &code).await?;
    let weather = state
        .repo
        .find_realtime(&code)
        .await?
        .ok_or_else(|| WeatherError::LocationNotFound(code.clone()))?;

    Ok(Json(RealtimeWeatherDto::from_record(&weather, Some(&location))))
}

/// PUT /api/v1/realtime/:code
pub async fn update_realtime_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
    JsonBody(dto): JsonBody<RealtimeWeatherDto>,
) -> Result<Json<RealtimeWeatherDto>, ApiError> {
    let weather = dto.into_record(&code, Utc::now());
    weather.validate()?;

    let location = require_location(&state, &code).await?;
    let saved = state.repo.save_realtime(&weather).await?;
    info!(code = %code, "Realtime weather updated");

    Ok(Json(RealtimeWeatherDto::from_record(&saved, Some(&location))))
}
