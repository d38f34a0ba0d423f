//! Ordered source snapshots.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

use crate::errors::SnapshotError;
use crate::query::SourceSelection;
use crate::source::{EnabledPolicy, Source, SourceRecord, SourceSummary, SourceView};

/// Configuration layer a snapshot was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotOrigin {
    Local,
    Shared,
    Default,
}

impl SnapshotOrigin {
    /// Interpretation of a missing `enabled` field for records from this layer.
    #[must_use]
    pub const fn enabled_policy(self) -> EnabledPolicy {
        match self {
            Self::Local | Self::Default => EnabledPolicy::ExplicitTrue,
            Self::Shared => EnabledPolicy::DefaultOn,
        }
    }
}

/// The full ordered set of sources considered authoritative at a point in time.
///
/// Sources are kept sorted by [`Source::order`] (stable, so equal ranks keep
/// their persisted position) and keys are unique. A snapshot is never mutated
/// after construction; the registry swaps in a new one on commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SourceSnapshot {
    pub origin: SnapshotOrigin,
    pub loaded_at: DateTime<Utc>,
    sources: Vec<Source>,
}

impl SourceSnapshot {
    /// Build a snapshot, sorting by order and rejecting duplicate keys.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateKey`] if two sources share a non-empty key.
    pub fn new(origin: SnapshotOrigin, mut sources: Vec<Source>) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::new();
        for source in &sources {
            if !source.key.is_empty() && !seen.insert(source.key.as_str()) {
                return Err(SnapshotError::DuplicateKey {
                    key: source.key.clone(),
                });
            }
        }
        sources.sort_by_key(|source| source.order);

        Ok(Self {
            origin,
            loaded_at: Utc::now(),
            sources,
        })
    }

    /// Decode a persisted snapshot (a JSON array of source records).
    ///
    /// Non-object array entries are skipped. Missing fields are filled in
    /// according to the origin layer's [`EnabledPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if the payload is not a JSON array,
    /// or [`SnapshotError::DuplicateKey`] if keys collide.
    pub fn decode(bytes: &[u8], origin: SnapshotOrigin) -> Result<Self, SnapshotError> {
        let values: Vec<Value> = serde_json::from_slice(bytes)?;
        let policy = origin.enabled_policy();
        let sources = values
            .iter()
            .filter_map(SourceRecord::from_value)
            .enumerate()
            .map(|(position, record)| record.into_source(position, policy))
            .collect();
        Self::new(origin, sources)
    }

    /// Encode the snapshot in its persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Malformed`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec_pretty(&self.sources)?)
    }

    /// Re-tag the snapshot with a different origin (e.g. after adopting a
    /// shared snapshot into the local layer).
    #[must_use]
    pub fn with_origin(mut self, origin: SnapshotOrigin) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.key == key)
    }

    /// Look up a source that ordinary queries may call.
    #[must_use]
    pub fn dispatchable(&self, key: &str) -> Option<&Source> {
        self.get(key).filter(|source| source.is_dispatchable())
    }

    /// Sources eligible for a query, in snapshot order.
    ///
    /// Disabled sources and sources without a usable endpoint are never
    /// eligible, even when named explicitly in the selection.
    #[must_use]
    pub fn eligible(&self, selection: &SourceSelection) -> Vec<&Source> {
        self.sources
            .iter()
            .filter(|source| source.is_dispatchable() && selection.includes(&source.key))
            .collect()
    }

    /// Render the snapshot for an audience.
    #[must_use]
    pub fn view(&self, view: SourceView) -> Vec<SourceSummary> {
        self.sources
            .iter()
            .filter(|source| view == SourceView::Full || source.enabled)
            .map(|source| source.summary(view))
            .collect()
    }
}
