//! Per-source call outcomes.
//!
//! Every dispatched source produces exactly one [`SourceOutcome`]. Failures
//! are data here, never `Err`: a federated search with every source down is
//! still a well-formed (empty) result.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::item::{Item, Pagination};

/// Terminal status of one source's call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Reachable, returned at least one record.
    Success,
    /// Attempt budget exhausted, last attempt timed out.
    Timeout,
    /// Attempt budget exhausted, last attempt failed in transport or with a 5xx.
    TransportError,
    /// Reachable but answered with a 4xx or an unparseable payload.
    UpstreamError,
    /// Reachable, nothing found.
    Empty,
}

impl OutcomeStatus {
    /// Whether this status counts toward "N of M sources unavailable".
    #[must_use]
    pub const fn is_unavailable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::TransportError | Self::UpstreamError
        )
    }
}

/// Diagnostic detail attached to a non-successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ErrorKind {
    #[error("timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream answered HTTP {0}")]
    HttpStatus(u16),

    #[error("unparseable payload: {0}")]
    BadPayload(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result of one source's call within a query. Written once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceOutcome {
    pub source_key: String,
    pub status: OutcomeStatus,
    /// Normalized items; empty for every status but `Success`.
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// HTTP attempts made, retries included.
    pub attempts: u32,
}

impl SourceOutcome {
    /// An outcome carrying no items.
    pub fn failed(
        source_key: impl Into<String>,
        status: OutcomeStatus,
        error: Option<ErrorKind>,
        attempts: u32,
    ) -> Self {
        Self {
            source_key: source_key.into(),
            status,
            items: Vec::new(),
            error,
            pagination: None,
            attempts,
        }
    }

    #[must_use]
    pub fn summary(&self) -> OutcomeSummary {
        OutcomeSummary {
            source_key: self.source_key.clone(),
            status: self.status,
            error: self.error.as_ref().map(ToString::to_string),
            item_count: self.items.len(),
            attempts: self.attempts,
        }
    }
}

/// Item-free view of an outcome for diagnostics and UI messaging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutcomeSummary {
    pub source_key: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub item_count: usize,
    pub attempts: u32,
}
