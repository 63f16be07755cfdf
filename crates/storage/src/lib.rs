//! Persistence for the weather services.
//!
//! Provides:
//! - The `WeatherRepository` trait every handler talks to
//! - PostgreSQL storage for production deployments
//! - An in-memory store for tests and local development

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::MemoryWeatherStore;
pub use postgres::PgWeatherStore;
pub use repository::WeatherRepository;
