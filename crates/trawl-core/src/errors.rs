//! Snapshot validation errors.
//!
//! Per-source call failures are never errors in trawl; they are carried as
//! [`crate::OutcomeStatus`] data. The errors here cover malformed source
//! configuration only.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Two sources in one snapshot share the same key.
    #[error("duplicate source key '{key}' in snapshot")]
    DuplicateKey { key: String },

    /// The serialized snapshot is not a JSON array of source records.
    #[error("malformed snapshot payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
