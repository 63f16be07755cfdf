//! Prometheus metrics.
//!
//! Request counters and latencies are recorded by [`track_requests`]; the
//! exporter handle renders them on `GET /metrics`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Extension, MatchedPath, Request},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

/// Install the global Prometheus recorder.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// Count every request by route template, method and status.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = request.method().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "weather_http_requests_total",
        "route" => route.clone(),
        "method" => method,
        "status" => status
    )
    .increment(1);
    histogram!("weather_http_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());

    response
}

/// Record the outcome of a client IP lookup.
pub fn record_geolocation(outcome: &'static str) {
    counter!("weather_geolocation_lookups_total", "outcome" => outcome).increment(1);
}

/// Record how many forecast records a replacement wrote.
pub fn record_replacement(kind: &'static str, records: usize) {
    counter!("weather_forecast_replacements_total", "kind" => kind).increment(1);
    histogram!("weather_forecast_replacement_records", "kind" => kind).record(records as f64);
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}
