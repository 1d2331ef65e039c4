//! services/catalog/src/error.rs
//!
//! Defines the primary error type for the catalog service binary.

use crate::config::ConfigError;
use vocab_core::ports::PortError;

/// The primary error type for the `catalog` service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., opening an import file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
