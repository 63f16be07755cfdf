//! End-to-end tests for the weather API router.
//!
//! The router runs against the in-memory store and a synthetic IP2Location
//! image, so no database or network is needed.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tower::ServiceExt;

use geolocation::{GeoLocator, Ip2LocationDb, UnavailableLocator};
use storage::{MemoryWeatherStore, WeatherRepository};
use test_utils::{fixtures, sample_geo_database};
use weather_api::{build_router, state::AppState};

const NEW_YORK_IP: &str = "108.30.178.78";
const DELHI_IP: &str = "103.48.198.141";
const SYDNEY_IP: &str = "203.0.113.7";

struct TestApp {
    router: Router,
    store: Arc<MemoryWeatherStore>,
}

fn sample_locator() -> Arc<dyn GeoLocator> {
    Arc::new(Ip2LocationDb::from_bytes(Bytes::from(sample_geo_database(true))).unwrap())
}

fn test_app_with(locator: Arc<dyn GeoLocator>, api_key: Option<&str>) -> TestApp {
    let store = Arc::new(MemoryWeatherStore::new());
    let repo: Arc<dyn WeatherRepository> = store.clone();
    let state = AppState::new(repo, locator, api_key.map(str::to_string));

    TestApp {
        router: build_router(Arc::new(state)),
        store,
    }
}

fn test_app() -> TestApp {
    test_app_with(sample_locator(), None)
}

/// New York with realtime, hourly and daily data.
async fn seed_new_york(store: &MemoryWeatherStore) {
    store.add_location(&fixtures::new_york()).await.unwrap();
    store.save_realtime(&fixtures::realtime("NYC_USA")).await.unwrap();
    store
        .replace_hourly("NYC_USA", fixtures::hourly_forecast("NYC_USA"))
        .await
        .unwrap();
    store
        .replace_daily("NYC_USA", fixtures::daily_forecast("NYC_USA"))
        .await
        .unwrap();
}

fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

fn get(uri: &str) -> Request<Body> {
    request(Method::GET, uri).body(Body::empty()).unwrap()
}

fn get_from(uri: &str, ip: &str) -> Request<Body> {
    request(Method::GET, uri)
        .header("X-Forwarded-For", ip)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: Method, uri: &str, body: Value) -> Request<Body> {
    request(method, uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &TestApp, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn new_york_json() -> Value {
    json!({
        "code": "NYC_USA",
        "city_name": "New York City",
        "region_name": "New York",
        "country_name": "United States of America",
        "country_code": "US",
        "enabled": true
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, _, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "weather-api");
}

#[tokio::test]
async fn test_ready() {
    let app = test_app();
    let (status, _, body) = send(&app, get("/ready")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let app = test_app();
    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Locations
// ============================================================================

#[tokio::test]
async fn test_add_location() {
    let app = test_app();
    let (status, headers, body) =
        send(&app, with_json(Method::POST, "/api/v1/locations", new_york_json())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(headers[header::LOCATION], "/api/v1/locations/NYC_USA");
    assert_eq!(body, new_york_json());
    assert!(app.store.location_exists("NYC_USA").await.unwrap());
}

#[tokio::test]
async fn test_add_duplicate_location() {
    let app = test_app();
    send(&app, with_json(Method::POST, "/api/v1/locations", new_york_json())).await;
    let (status, _, body) =
        send(&app, with_json(Method::POST, "/api/v1/locations", new_york_json())).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Sorry! location code NYC_USA already exist!");
    assert_eq!(body["status_code"], 409);
    assert_eq!(body["path"], "/api/v1/locations");
}

#[tokio::test]
async fn test_add_invalid_location() {
    let app = test_app();
    let (status, _, body) = send(
        &app,
        with_json(
            Method::POST,
            "/api/v1/locations",
            json!({"code": "NY", "city_name": "New York City", "country_name": "United States of America", "country_code": "USA"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert_eq!(
        errors,
        vec![
            "code: Location code must have 3-12 characters",
            "country_code: Country code must have 2 characters",
        ]
    );
}

#[tokio::test]
async fn test_malformed_json() {
    let app = test_app();
    let req = request(Method::POST, "/api/v1/locations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"code\": "))
        .unwrap();
    let (status, _, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status_code"], 400);
}

#[tokio::test]
async fn test_list_locations() {
    let app = test_app();
    let (status, _, _) = send(&app, get("/api/v1/locations")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    app.store.add_location(&fixtures::new_york()).await.unwrap();
    app.store.add_location(&fixtures::delhi()).await.unwrap();

    let (status, _, body) = send(&app, get("/api/v1/locations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["code"], "DELHI_IN");
    assert_eq!(body[1]["code"], "NYC_USA");
}

#[tokio::test]
async fn test_get_unknown_location() {
    let app = test_app();
    let (status, _, body) = send(&app, get("/api/v1/locations/ABC_XY")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sorry! cannot find location with code: ABC_XY");
    assert_eq!(body["path"], "/api/v1/locations/ABC_XY");
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn test_update_location() {
    let app = test_app();
    app.store.add_location(&fixtures::new_york()).await.unwrap();

    let mut changed = new_york_json();
    changed["city_name"] = json!("New York");
    changed["enabled"] = json!(false);
    let (status, _, body) = send(&app, with_json(Method::PUT, "/api/v1/locations", changed)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["city_name"], "New York");
    assert_eq!(body["enabled"], false);

    let (status, _, body) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/locations",
            json!({"code": "LACA_US", "city_name": "Los Angeles", "region_name": "California",
                   "country_name": "United States of America", "country_code": "US", "enabled": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Sorry! cannot find location with code: LACA_US");
}

#[tokio::test]
async fn test_delete_location() {
    let app = test_app();
    app.store.add_location(&fixtures::new_york()).await.unwrap();

    let delete = || request(Method::DELETE, "/api/v1/locations/NYC_USA").body(Body::empty()).unwrap();

    let (status, _, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, get("/api/v1/locations/NYC_USA")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Trashed codes stay reserved.
    let (status, _, _) =
        send(&app, with_json(Method::POST, "/api/v1/locations", new_york_json())).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Realtime
// ============================================================================

#[tokio::test]
async fn test_realtime_by_ip() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) = send(&app, get_from("/api/v1/realtime", NEW_YORK_IP)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "New York City, New York, United States of America");
    assert_eq!(body["temperature"], 12);
    assert_eq!(body["wind_speed"], 5);
    assert_eq!(body["last_updated"], "2024-07-16T10:00:00Z");
}

#[tokio::test]
async fn test_realtime_by_ip_uses_peer_address() {
    let app = test_app();
    app.store.add_location(&fixtures::delhi()).await.unwrap();
    app.store.save_realtime(&fixtures::realtime("DELHI_IN")).await.unwrap();

    let peer: SocketAddr = format!("{}:50000", DELHI_IP).parse().unwrap();
    let mut req = get("/api/v1/realtime");
    req.extensions_mut().insert(ConnectInfo(peer));
    let (status, _, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "Delhi, Delhi, India");
}

#[tokio::test]
async fn test_realtime_by_ip_geolocation_failures() {
    let app = test_app();
    seed_new_york(&app.store).await;

    // Unknown range in the database
    let (status, _, _) = send(&app, get_from("/api/v1/realtime", "127.0.0.1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Not an address at all
    let (status, _, _) = send(&app, get_from("/api/v1/realtime", "abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No client address anywhere
    let (status, _, body) = send(&app, get("/api/v1/realtime")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unable to determine client IP address");
}

#[tokio::test]
async fn test_realtime_by_ip_unregistered_city() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) = send(&app, get_from("/api/v1/realtime", SYDNEY_IP)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "No location found with the given country code: AU and city name: Sydney"
    );
}

#[tokio::test]
async fn test_realtime_without_database() {
    let app = test_app_with(Arc::new(UnavailableLocator::new("not loaded")), None);
    seed_new_york(&app.store).await;

    let (status, _, _) = send(&app, get_from("/api/v1/realtime", NEW_YORK_IP)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Code-based lookups are unaffected.
    let (status, _, _) = send(&app, get("/api/v1/realtime/NYC_USA")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_realtime_by_code() {
    let app = test_app();
    seed_new_york(&app.store).await;
    app.store.add_location(&fixtures::delhi()).await.unwrap();

    let (status, _, body) = send(&app, get("/api/v1/realtime/NYC_USA")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Cloudy");

    // Registered location without a snapshot
    let (status, _, body) = send(&app, get("/api/v1/realtime/DELHI_IN")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No location found with the given code: DELHI_IN");
}

#[tokio::test]
async fn test_update_realtime() {
    let app = test_app();
    app.store.add_location(&fixtures::new_york()).await.unwrap();

    let (status, _, body) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/realtime/NYC_USA",
            json!({"temperature": 20, "humidity": 40, "precipitation": 10,
                   "wind_speed": 12, "status": "Sunny", "last_updated": "1999-01-01T00:00:00Z"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperature"], 20);
    assert_eq!(body["location"], "New York City, New York, United States of America");
    assert_ne!(body["last_updated"], "1999-01-01T00:00:00Z");

    let stored = app.store.find_realtime("NYC_USA").await.unwrap().unwrap();
    assert_eq!(stored.status, "Sunny");
}

#[tokio::test]
async fn test_update_realtime_invalid() {
    let app = test_app();
    app.store.add_location(&fixtures::new_york()).await.unwrap();

    let (status, _, body) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/realtime/NYC_USA",
            json!({"temperature": 120, "humidity": 40, "precipitation": 10,
                   "wind_speed": 12, "status": "Sunny"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["temperature: Temperature must be in the range of -50 to 50 Celsius degree"])
    );
}

#[tokio::test]
async fn test_update_realtime_unknown_location() {
    let app = test_app();
    let (status, _, _) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/realtime/ABC_XY",
            json!({"temperature": 20, "humidity": 40, "precipitation": 10,
                   "wind_speed": 12, "status": "Sunny"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Hourly
// ============================================================================

fn hourly_get(uri: &str, hour: &str) -> Request<Body> {
    request(Method::GET, uri)
        .header("X-Current-Hour", hour)
        .header("X-Forwarded-For", NEW_YORK_IP)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_hourly_requires_current_hour() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, _) = send(&app, get("/api/v1/hourly/NYC_USA")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, hourly_get("/api/v1/hourly/NYC_USA", "noon")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(&app, get_from("/api/v1/hourly", NEW_YORK_IP)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hourly_by_code() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) = send(&app, hourly_get("/api/v1/hourly/NYC_USA", "10")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "New York City, New York, United States of America");
    let hours: Vec<i64> = body["hourly_forecast"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["hour_of_day"].as_i64().unwrap())
        .collect();
    assert_eq!(hours, vec![11, 12]);

    let (status, _, _) = send(&app, hourly_get("/api/v1/hourly/NYC_USA", "12")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, _) = send(&app, hourly_get("/api/v1/hourly/ABC_XY", "10")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hourly_by_ip() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) = send(&app, hourly_get("/api/v1/hourly", "9")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hourly_forecast"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_hourly_reconciles() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/hourly/NYC_USA",
            json!([
                {"hour_of_day": 14, "temperature": 18, "precipitation": 20, "status": "Clear"},
                {"hour_of_day": 11, "temperature": 25, "precipitation": 10, "status": "Sunny"}
            ]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hourly_forecast"][0]["hour_of_day"], 11);
    assert_eq!(body["hourly_forecast"][0]["temperature"], 25);
    assert_eq!(body["hourly_forecast"][1]["hour_of_day"], 14);
    assert_eq!(body["hourly_forecast"].as_array().unwrap().len(), 2);

    let stored = app.store.list_hourly("NYC_USA").await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_update_hourly_rejects_bad_lists() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) =
        send(&app, with_json(Method::PUT, "/api/v1/hourly/NYC_USA", json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Hourly forecast data cannot be empty");

    let (status, _, body) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/hourly/NYC_USA",
            json!([
                {"hour_of_day": 10, "temperature": 18, "precipitation": 20, "status": "Clear"},
                {"hour_of_day": 10, "temperature": 19, "precipitation": 120, "status": "Clear"}
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!([
            "hourly_forecast[1].precipitation: Precipitation must be in the range of 0 to 100 percentage",
            "hourly_forecast[1]: Duplicate hour_of_day 10"
        ])
    );

    // Nothing was written
    assert_eq!(app.store.list_hourly("NYC_USA").await.unwrap().len(), 3);
}

// ============================================================================
// Daily
// ============================================================================

#[tokio::test]
async fn test_daily_by_code_and_ip() {
    let app = test_app();
    seed_new_york(&app.store).await;
    app.store.add_location(&fixtures::delhi()).await.unwrap();

    let (status, _, body) = send(&app, get("/api/v1/daily/NYC_USA")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["daily_forecast"][0]["day_of_month"], 16);
    assert_eq!(body["daily_forecast"][1]["day_of_month"], 17);

    let (status, _, body) = send(&app, get_from("/api/v1/daily", NEW_YORK_IP)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "New York City, New York, United States of America");

    let (status, _, _) = send(&app, get_from("/api/v1/daily", DELHI_IP)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_update_daily() {
    let app = test_app();
    app.store.add_location(&fixtures::new_york()).await.unwrap();

    let (status, _, body) =
        send(&app, with_json(Method::PUT, "/api/v1/daily/NYC_USA", json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Daily forecast data cannot be empty");

    let (status, _, body) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/daily/NYC_USA",
            json!([
                {"day_of_month": 1, "month": 8, "min_temp": 20, "max_temp": 30, "precipitation": 10, "status": "Sunny"},
                {"day_of_month": 31, "month": 7, "min_temp": 21, "max_temp": 31, "precipitation": 15, "status": "Cloudy"}
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["daily_forecast"][0]["month"], 7);
    assert_eq!(body["daily_forecast"][1]["month"], 8);

    let (status, _, _) = send(
        &app,
        with_json(
            Method::PUT,
            "/api/v1/daily/ABC_XY",
            json!([{"day_of_month": 1, "month": 8, "min_temp": 20, "max_temp": 30, "precipitation": 10, "status": "Sunny"}]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Full
// ============================================================================

fn full_update_json() -> Value {
    json!({
        "realtime_weather": {
            "temperature": 15, "humidity": 50, "precipitation": 30,
            "wind_speed": 8, "status": "Windy"
        },
        "hourly_forecast": [
            {"hour_of_day": 20, "temperature": 14, "precipitation": 30, "status": "Windy"}
        ],
        "daily_forecast": [
            {"day_of_month": 18, "month": 7, "min_temp": 12, "max_temp": 22, "precipitation": 30, "status": "Windy"}
        ]
    })
}

#[tokio::test]
async fn test_full_by_code() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) = send(&app, get("/api/v1/full/NYC_USA")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["location"], "New York City, New York, United States of America");
    assert!(body["realtime_weather"].get("location").is_none());
    assert_eq!(body["realtime_weather"]["humidity"], 32);
    assert_eq!(body["hourly_forecast"].as_array().unwrap().len(), 3);
    assert_eq!(body["daily_forecast"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_full_by_ip_without_realtime() {
    let app = test_app();
    app.store.add_location(&fixtures::delhi()).await.unwrap();

    let (status, _, body) = send(&app, get_from("/api/v1/full", DELHI_IP)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("realtime_weather").is_none());
    assert_eq!(body["hourly_forecast"], json!([]));
}

#[tokio::test]
async fn test_update_full() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let (status, _, body) =
        send(&app, with_json(Method::PUT, "/api/v1/full/NYC_USA", full_update_json())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["realtime_weather"]["status"], "Windy");
    assert_eq!(body["hourly_forecast"].as_array().unwrap().len(), 1);
    assert_eq!(body["daily_forecast"][0]["day_of_month"], 18);

    let stored = app.store.list_daily("NYC_USA").await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn test_update_full_rejects_empty_lists() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let mut payload = full_update_json();
    payload["hourly_forecast"] = json!([]);
    let (status, _, body) =
        send(&app, with_json(Method::PUT, "/api/v1/full/NYC_USA", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Hourly weather data cannot be empty");

    let mut payload = full_update_json();
    payload["daily_forecast"] = json!([]);
    let (status, _, body) =
        send(&app, with_json(Method::PUT, "/api/v1/full/NYC_USA", payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Daily weather data cannot be empty");
}

#[tokio::test]
async fn test_update_full_validation() {
    let app = test_app();
    seed_new_york(&app.store).await;

    let mut payload = full_update_json();
    payload["realtime_weather"]["humidity"] = json!(101);
    let (status, _, body) =
        send(&app, with_json(Method::PUT, "/api/v1/full/NYC_USA", payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["errors"],
        json!(["realtime_weather.humidity: Humidity must be in the range of 0 to 100 percentage"])
    );
}

// ============================================================================
// Write authorization
// ============================================================================

#[tokio::test]
async fn test_writes_require_api_key() {
    let app = test_app_with(sample_locator(), Some("s3cret"));

    let (status, _, body) =
        send(&app, with_json(Method::POST, "/api/v1/locations", new_york_json())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status_code"], 401);

    let req = request(Method::POST, "/api/v1/locations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", "wrong")
        .body(Body::from(new_york_json().to_string()))
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = request(Method::POST, "/api/v1/locations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-API-Key", "s3cret")
        .body(Body::from(new_york_json().to_string()))
        .unwrap();
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    // Reads stay open
    let (status, _, _) = send(&app, get("/api/v1/locations/NYC_USA")).await;
    assert_eq!(status, StatusCode::OK);
}
