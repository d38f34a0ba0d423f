//! Catalog error types.

use thiserror::Error;
use trawl_registry::RegistryError;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The key names no enabled, dispatchable source in the active snapshot.
    #[error("unknown or disabled source '{0}'")]
    UnknownSource(String),

    /// Source resolution failed; no query can run.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
