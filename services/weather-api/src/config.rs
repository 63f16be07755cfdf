//! Service configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Where locations and weather are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgres {
        database_url: String,
        max_connections: u32,
        migrate: bool,
    },
    Memory,
}

/// Runtime configuration collected from CLI arguments and the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen_addr: SocketAddr,
    pub store: StoreConfig,
    /// IP2Location BIN file used to resolve client addresses.
    pub ip2location_db_path: PathBuf,
    /// When set, POST/PUT/DELETE requests must carry a matching `X-API-Key`.
    pub api_key: Option<String>,
}

impl ApiConfig {
    pub fn new(
        listen: &str,
        database_url: Option<String>,
        max_connections: u32,
        in_memory: bool,
        migrate: bool,
        ip2location_db_path: PathBuf,
        api_key: Option<String>,
    ) -> Result<Self> {
        let listen_addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("Invalid listen address: {}", listen))?;

        let store = if in_memory {
            StoreConfig::Memory
        } else {
            let Some(database_url) = database_url.filter(|u| !u.trim().is_empty()) else {
                bail!("DATABASE_URL is required unless --in-memory is set");
            };
            if max_connections == 0 {
                bail!("WEATHER_DB_MAX_CONNECTIONS must be at least 1");
            }
            StoreConfig::Postgres {
                database_url,
                max_connections,
                migrate,
            }
        };

        Ok(Self {
            listen_addr,
            store,
            ip2location_db_path,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}
