//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML layer or `TRAWL_*` variable could not be merged or extracted.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// The shared store backend is selected but its credentials are missing.
    #[error("Configuration section '{section}' is not configured (missing required fields)")]
    NotConfigured { section: String },

    /// A field is out of range (zero timeouts, zero attempt budget, ...).
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// `shared.backend` names a backend trawl does not know.
    #[error("unsupported shared store backend '{0}' (expected 'none' or 'r2')")]
    UnsupportedBackend(String),
}
