//! Normalization of raw upstream records into attributed [`Item`]s.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use trawl_core::{
    ATTRIBUTION_FIELDS, FanoutResult, Item, OutcomeStatus, Source, SourceGroup, SourceOutcome,
    native_id_of,
};
use trawl_upstream::UpstreamReply;

/// Turns replies into outcomes and outcomes into the grouped result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultAggregator {
    per_source_cap: Option<usize>,
}

impl ResultAggregator {
    /// `None` keeps every item (single-source listing).
    #[must_use]
    pub const fn new(per_source_cap: Option<usize>) -> Self {
        Self { per_source_cap }
    }

    /// Attribute and cap one source's records, preserving upstream order.
    ///
    /// Attribution comes from `source`, never from the payload: upstream
    /// copies of the attribution fields are discarded. Records without a
    /// native id are dropped, as are repeats of an id already seen.
    #[must_use]
    pub fn normalize(&self, records: &[Map<String, Value>], source: &Source) -> Vec<Item> {
        let cap = self.per_source_cap.unwrap_or(usize::MAX);
        let mut seen = HashSet::new();
        records
            .iter()
            .filter_map(|record| {
                let native_id = native_id_of(record)?;
                if !seen.insert(native_id.clone()) {
                    return None;
                }
                let mut fields = record.clone();
                for reserved in ATTRIBUTION_FIELDS {
                    fields.remove(reserved);
                }
                Some(Item {
                    unique_id: Item::unique_id_for(&source.key, &native_id),
                    source_key: source.key.clone(),
                    source_name: source.name.clone(),
                    source_description: source.description.clone(),
                    fields,
                })
            })
            .take(cap)
            .collect()
    }

    /// Build the write-once outcome for one source's reply.
    ///
    /// A `Success` reply whose records all lack ids becomes `Empty`.
    #[must_use]
    pub fn outcome(&self, source: &Source, reply: UpstreamReply) -> SourceOutcome {
        let (items, pagination) = match &reply.page {
            Some(page) => (self.normalize(&page.records, source), Some(page.pagination)),
            None => (Vec::new(), None),
        };
        let status = match reply.status {
            OutcomeStatus::Success if items.is_empty() => OutcomeStatus::Empty,
            status => status,
        };
        SourceOutcome {
            source_key: source.key.clone(),
            status,
            items,
            error: reply.error,
            pagination,
            attempts: reply.attempts,
        }
    }

    /// Assemble the final result. Groups follow `sources` order (the
    /// snapshot's source order) and only sources with items get a group.
    #[must_use]
    pub fn assemble(
        &self,
        keyword: &str,
        sources: &[Source],
        outcomes: BTreeMap<String, SourceOutcome>,
    ) -> FanoutResult {
        let groups = sources
            .iter()
            .filter_map(|source| {
                let outcome = outcomes.get(&source.key)?;
                if outcome.status != OutcomeStatus::Success || outcome.items.is_empty() {
                    return None;
                }
                Some(SourceGroup {
                    source_key: source.key.clone(),
                    source_name: source.name.clone(),
                    source_description: source.description.clone(),
                    items: outcome.items.clone(),
                })
            })
            .collect();

        FanoutResult {
            keyword: keyword.to_string(),
            sources: sources.iter().map(|source| source.key.clone()).collect(),
            outcomes,
            groups,
        }
    }
}
