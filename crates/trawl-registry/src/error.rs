//! Registry error types.

use std::path::PathBuf;

use thiserror::Error;
use trawl_config::ConfigError;
use trawl_core::SnapshotError;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Every resolution layer failed, the built-in default included.
    #[error("no usable source configuration: {0}")]
    ConfigUnavailable(String),

    #[error("invalid source snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),

    #[error("local snapshot store at {} failed: {source}", .path.display())]
    LocalStore {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("shared store error: {0}")]
    SharedStore(String),

    /// A shared write was requested but no shared store is configured or ready.
    #[error("shared store is not configured or not ready")]
    SharedUnavailable,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<object_store::Error> for RegistryError {
    fn from(e: object_store::Error) -> Self {
        Self::SharedStore(e.to_string())
    }
}
