//! services/scraper/src/error.rs
//!
//! Defines the primary error type for the scraping service.

use crate::config::ConfigError;
use news_scraper_core::ports::PortError;

/// The primary error type for the `scraper` service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents a malformed fixture or output document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Represents a standard Input/Output error (e.g., reading the fixture file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
