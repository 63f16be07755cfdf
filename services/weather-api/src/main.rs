//! Weather API Server
//!
//! Location registry and realtime, hourly and daily weather over REST.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use weather_api::build_router;
use weather_api::config::ApiConfig;
use weather_api::state::AppState;

/// Weather API Server
#[derive(Parser, Debug)]
#[command(name = "weather-api")]
#[command(about = "Location-based realtime, hourly and daily weather service")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "WEATHER_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "WEATHER_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 10, env = "WEATHER_DB_MAX_CONNECTIONS")]
    db_max_connections: u32,

    /// IP2Location BIN database (DB3 or richer)
    #[arg(
        long,
        default_value = "data/IP2LOCATION-LITE-DB3.BIN",
        env = "IP2LOCATION_DB_PATH"
    )]
    ip2location_db: PathBuf,

    /// Key required in X-API-Key for write requests
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Keep everything in memory instead of PostgreSQL
    #[arg(long, env = "WEATHER_IN_MEMORY")]
    in_memory: bool,

    /// Create database tables on startup
    #[arg(long, env = "WEATHER_MIGRATE")]
    migrate: bool,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = weather_api::metrics::install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    info!("Starting weather API server");

    let config = ApiConfig::new(
        &args.listen,
        args.database_url,
        args.db_max_connections,
        args.in_memory,
        args.migrate,
        args.ip2location_db,
        args.api_key,
    )?;

    // Initialize application state
    let state = Arc::new(
        AppState::from_config(&config)
            .await
            .context("Failed to initialize application state")?
            .with_metrics(prometheus_handle),
    );

    let app = build_router(state);

    info!("Weather API listening on {}", config.listen_addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
    })
    .await
    .context("Server failed")?;

    Ok(())
}
