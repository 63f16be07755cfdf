//! Location registry handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use weather_common::{Location, Validate, WeatherError};

use super::JsonBody;
use crate::auth::WriteAccess;
use crate::dto::LocationDto;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/v1/locations
pub async fn add_location_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(dto): JsonBody<LocationDto>,
) -> Result<Response, ApiError> {
    let location = Location::from(dto);
    location.validate()?;

    let created = state.repo.add_location(&location).await?;
    info!(code = %created.code, "Location added");

    let uri = format!("/api/v1/locations/{}", created.code);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, uri)],
        Json(LocationDto::from(created)),
    )
        .into_response())
}

/// GET /api/v1/locations
pub async fn list_locations_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let locations = state.repo.list_locations().await?;

    if locations.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<LocationDto> = locations.into_iter().map(LocationDto::from).collect();
    Ok(Json(body).into_response())
}

/// GET /api/v1/locations/:code
pub async fn get_location_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<LocationDto>, ApiError> {
    let location = state
        .repo
        .find_location(&code)
        .await?
        .ok_or_else(|| WeatherError::unknown_location(&code))?;

    Ok(Json(location.into()))
}

/// PUT /api/v1/locations
pub async fn update_location_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    JsonBody(dto): JsonBody<LocationDto>,
) -> Result<Json<LocationDto>, ApiError> {
    let location = Location::from(dto);
    location.validate()?;

    let updated = state.repo.update_location(&location).await?;
    info!(code = %updated.code, "Location updated");

    Ok(Json(updated.into()))
}

/// DELETE /api/v1/locations/:code
pub async fn delete_location_handler(
    _access: WriteAccess,
    Extension(state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.repo.trash_location(&code).await?;
    info!(code = %code, "Location trashed");

    Ok(StatusCode::NO_CONTENT)
}
