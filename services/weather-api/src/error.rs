//! JSON error responses.
//!
//! Handlers return [`ApiError`]. Its `IntoResponse` impl writes the body and
//! stashes a copy in the response extensions; [`attach_request_path`] then
//! re-renders the body with the request path, which handlers never see.

use axum::{
    extract::{rejection::JsonRejection, Request},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, warn};

use geolocation::GeoError;
use weather_common::WeatherError;

/// An error that becomes a JSON response.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Vec<String>,
}

/// Wire format of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub path: String,
    pub message: String,
    pub status_code: u16,
    pub timestamp: String,
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn body(&self, path: &str) -> ErrorBody {
        ErrorBody {
            path: path.to_string(),
            message: self.message.clone(),
            status_code: self.status.as_u16(),
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            errors: self.errors.clone(),
        }
    }

    fn render(&self, path: &str) -> Response {
        (self.status, Json(self.body(path))).into_response()
    }
}

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        let status =
            StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            errors: err.field_messages(),
            message: err.to_string(),
        }
    }
}

impl From<GeoError> for ApiError {
    fn from(err: GeoError) -> Self {
        WeatherError::Geolocation(err.to_string()).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), message = %self.message, "Request failed");
        } else {
            warn!(status = self.status.as_u16(), message = %self.message, "Request rejected");
        }

        let mut response = self.render("");
        response.extensions_mut().insert(self);
        response
    }
}

/// Fill in the `path` field of error bodies.
pub async fn attach_request_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    match response.extensions().get::<ApiError>() {
        Some(err) => err.render(&path),
        None => response,
    }
}
