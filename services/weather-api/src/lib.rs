//! Weather API Service Library
//!
//! Location registry plus realtime, hourly and daily weather over REST,
//! with client IP geolocation for the "weather where I am" endpoints.

pub mod auth;
pub mod client_ip;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Location registry
        .route(
            "/locations",
            get(handlers::locations::list_locations_handler)
                .post(handlers::locations::add_location_handler)
                .put(handlers::locations::update_location_handler),
        )
        .route(
            "/locations/:code",
            get(handlers::locations::get_location_handler)
                .delete(handlers::locations::delete_location_handler),
        )
        // Realtime
        .route("/realtime", get(handlers::realtime::realtime_by_ip_handler))
        .route(
            "/realtime/:code",
            get(handlers::realtime::realtime_by_code_handler)
                .put(handlers::realtime::update_realtime_handler),
        )
        // Hourly
        .route("/hourly", get(handlers::hourly::hourly_by_ip_handler))
        .route(
            "/hourly/:code",
            get(handlers::hourly::hourly_by_code_handler)
                .put(handlers::hourly::update_hourly_handler),
        )
        // Daily
        .route("/daily", get(handlers::daily::daily_by_ip_handler))
        .route(
            "/daily/:code",
            get(handlers::daily::daily_by_code_handler).put(handlers::daily::update_daily_handler),
        )
        // Full
        .route("/full", get(handlers::full::full_by_ip_handler))
        .route(
            "/full/:code",
            get(handlers::full::full_by_code_handler).put(handlers::full::update_full_handler),
        );

    Router::new()
        .nest("/api/v1", api)
        // Health
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(metrics::metrics_handler))
        // Middleware
        .layer(middleware::from_fn(error::attach_request_path))
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
