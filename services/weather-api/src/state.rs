//! Application state for the weather API.

use std::sync::Arc;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

use geolocation::{GeoLocator, Ip2LocationDb, UnavailableLocator};
use storage::{MemoryWeatherStore, PgWeatherStore, WeatherRepository};

use crate::config::{ApiConfig, StoreConfig};

/// Shared application state.
pub struct AppState {
    /// Location and weather persistence.
    pub repo: Arc<dyn WeatherRepository>,

    /// Client IP to city resolution.
    pub locator: Arc<dyn GeoLocator>,

    /// Required `X-API-Key` for write requests, if any.
    pub api_key: Option<String>,

    /// Prometheus exporter, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn WeatherRepository>,
        locator: Arc<dyn GeoLocator>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            repo,
            locator,
            api_key,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Create an AppState from configuration.
    pub async fn from_config(config: &ApiConfig) -> Result<Self> {
        let repo: Arc<dyn WeatherRepository> = match &config.store {
            StoreConfig::Postgres {
                database_url,
                max_connections,
                migrate,
            } => {
                let store = PgWeatherStore::connect(database_url, *max_connections).await?;
                if *migrate {
                    store.migrate().await?;
                }
                Arc::new(store)
            }
            StoreConfig::Memory => {
                warn!("Using in-memory store; data is lost on shutdown");
                Arc::new(MemoryWeatherStore::new())
            }
        };

        // A missing database is not fatal; IP-based lookups answer 400 instead.
        let locator: Arc<dyn GeoLocator> = match Ip2LocationDb::open(&config.ip2location_db_path) {
            Ok(db) => Arc::new(db),
            Err(e) => {
                warn!(
                    path = %config.ip2location_db_path.display(),
                    error = %e,
                    "Could not load IP2Location database"
                );
                Arc::new(UnavailableLocator::new(e.to_string()))
            }
        };

        if config.api_key.is_some() {
            info!("Write requests require X-API-Key");
        }

        Ok(Self::new(repo, locator, config.api_key.clone()))
    }
}
