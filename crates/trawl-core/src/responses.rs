//! Assembled response shapes handed to the presentation layer.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Serialize;

use crate::item::{Item, Pagination};
use crate::outcome::{ErrorKind, OutcomeStatus, OutcomeSummary, SourceOutcome};

/// Items from one source, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SourceGroup {
    pub source_key: String,
    pub source_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    pub items: Vec<Item>,
}

/// Final result of a federated search.
///
/// `outcomes` holds exactly one entry per eligible source. `groups` lists the
/// sources that contributed items, in source order; sources that failed or
/// found nothing appear only in `outcomes`.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FanoutResult {
    pub keyword: String,
    /// Eligible source keys in source order.
    pub sources: Vec<String>,
    pub outcomes: BTreeMap<String, SourceOutcome>,
    pub groups: Vec<SourceGroup>,
}

impl FanoutResult {
    /// Result for a query with no eligible sources.
    pub fn empty(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            sources: Vec::new(),
            outcomes: BTreeMap::new(),
            groups: Vec::new(),
        }
    }

    /// Number of sources dispatched to.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    /// Sources that timed out, failed in transport, or answered with an error.
    #[must_use]
    pub fn unavailable(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| outcome.status.is_unavailable())
            .count()
    }

    #[must_use]
    pub fn outcome(&self, source_key: &str) -> Option<&SourceOutcome> {
        self.outcomes.get(source_key)
    }

    /// Outcome summaries in source order.
    #[must_use]
    pub fn summaries(&self) -> Vec<OutcomeSummary> {
        self.sources
            .iter()
            .filter_map(|key| self.outcomes.get(key))
            .map(SourceOutcome::summary)
            .collect()
    }

    /// The grouped result with one item removed and emptied groups dropped.
    #[must_use]
    pub fn recommendations(&self, exclude_unique_id: &str) -> Vec<SourceGroup> {
        self.groups
            .iter()
            .map(|group| SourceGroup {
                items: group
                    .items
                    .iter()
                    .filter(|item| item.unique_id != exclude_unique_id)
                    .cloned()
                    .collect(),
                ..group.clone()
            })
            .filter(|group| !group.items.is_empty())
            .collect()
    }
}

/// One page of a single source's listing (or a detail lookup).
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ListingPage {
    pub source_key: String,
    pub source_name: String,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub pagination: Pagination,
    pub items: Vec<Item>,
}
