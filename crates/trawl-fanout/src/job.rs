//! Per-query job state.

use std::collections::BTreeMap;
use std::fmt;

use tokio_util::sync::CancellationToken;
use trawl_core::{ErrorKind, FanoutResult, OutcomeStatus, Source, SourceOutcome};

use crate::aggregator::ResultAggregator;

/// Opaque identifier of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub(crate) u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// One in-flight query. Owned by the dispatching task and dropped with it.
#[derive(Debug)]
pub(crate) struct FanoutJob {
    pub(crate) id: JobId,
    keyword: String,
    sources: Vec<Source>,
    completed: usize,
    outcomes: BTreeMap<String, SourceOutcome>,
    pub(crate) cancel: CancellationToken,
}

impl FanoutJob {
    pub(crate) fn new(
        id: JobId,
        keyword: &str,
        sources: Vec<Source>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id,
            keyword: keyword.to_string(),
            sources,
            completed: 0,
            outcomes: BTreeMap::new(),
            cancel,
        }
    }

    pub(crate) fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub(crate) fn source(&self, key: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.key == key)
    }

    pub(crate) fn total(&self) -> usize {
        self.sources.len()
    }

    pub(crate) const fn completed(&self) -> usize {
        self.completed
    }

    /// Store an outcome. Outcomes are write-once; a second one for the same
    /// source, or one for a source this job never dispatched, is ignored.
    pub(crate) fn record(&mut self, outcome: SourceOutcome) -> bool {
        if self.source(&outcome.source_key).is_none()
            || self.outcomes.contains_key(&outcome.source_key)
        {
            tracing::warn!(job = %self.id, source = %outcome.source_key, "ignoring duplicate outcome");
            return false;
        }
        self.outcomes.insert(outcome.source_key.clone(), outcome);
        self.completed += 1;
        true
    }

    /// Assemble the result. Sources whose task died without reporting get a
    /// `TransportError` outcome so every dispatched source has exactly one.
    pub(crate) fn finish(mut self, aggregator: &ResultAggregator) -> FanoutResult {
        for source in &self.sources {
            self.outcomes.entry(source.key.clone()).or_insert_with(|| {
                SourceOutcome::failed(
                    source.key.clone(),
                    OutcomeStatus::TransportError,
                    Some(ErrorKind::Internal("source task ended without an outcome".to_string())),
                    0,
                )
            });
        }
        aggregator.assemble(&self.keyword, &self.sources, self.outcomes)
    }
}
