//! Concurrent dispatch of one query to every eligible source.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use trawl_core::{FanoutResult, SearchQuery, Source, SourceSnapshot};
use trawl_upstream::{UpstreamClient, UpstreamReply};

use crate::aggregator::ResultAggregator;
use crate::job::{FanoutJob, JobId};
use crate::slot::FanoutSlot;

/// Fans a [`SearchQuery`] out to every eligible source at once.
///
/// All calls start together regardless of source order; order only shapes
/// the assembled result. The coordinator waits for every call to settle and
/// never short-circuits on failure.
pub struct FanoutCoordinator {
    client: Arc<UpstreamClient>,
    max_concurrency: Option<usize>,
    next_job: AtomicU64,
}

impl FanoutCoordinator {
    pub fn new(client: Arc<UpstreamClient>) -> Self {
        Self {
            client,
            max_concurrency: None,
            next_job: AtomicU64::new(0),
        }
    }

    /// Gate dispatch with a semaphore of `limit` permits. `None` is unbounded.
    #[must_use]
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|n| *n > 0);
        self
    }

    /// Run `query` against `snapshot`, superseding the slot's previous job.
    ///
    /// `on_progress(completed, total)` fires once per settled source and
    /// never after this job is superseded or cancelled. Returns `None` when
    /// superseded; the caller simply never sees a stale result.
    pub async fn dispatch<F>(
        &self,
        slot: &FanoutSlot,
        query: &SearchQuery,
        snapshot: Arc<SourceSnapshot>,
        mut on_progress: F,
    ) -> Option<FanoutResult>
    where
        F: FnMut(usize, usize),
    {
        let id = JobId(self.next_job.fetch_add(1, Ordering::Relaxed) + 1);
        let cancel = CancellationToken::new();
        slot.supersede(id, cancel.clone());

        let eligible: Vec<Source> = snapshot
            .eligible(&query.selection)
            .into_iter()
            .cloned()
            .collect();
        let aggregator = ResultAggregator::new(query.per_source_cap);

        if eligible.is_empty() {
            tracing::debug!(job = %id, keyword = %query.keyword, "no eligible sources");
            return slot
                .release(id)
                .then(|| FanoutResult::empty(&query.keyword));
        }

        let mut job = FanoutJob::new(id, &query.keyword, eligible, cancel);
        let mut tasks = self.spawn_calls(&job, query);
        let total = job.total();
        tracing::debug!(job = %id, keyword = %query.keyword, total, "fan-out dispatched");

        loop {
            let joined = tokio::select! {
                biased;
                () = job.cancel.cancelled() => None,
                joined = tasks.join_next() => Some(joined),
            };
            let Some(joined) = joined else {
                tasks.abort_all();
                tracing::debug!(job = %id, completed = job.completed(), total, "fan-out job dropped");
                return None;
            };
            let Some(joined) = joined else {
                break;
            };

            let (key, reply) = match joined {
                Ok(settled) => settled,
                Err(error) => {
                    tracing::warn!(job = %id, %error, "source task failed");
                    continue;
                }
            };
            // Cancelled mid-call; the cancelled branch above ends the job.
            let Some(reply) = reply else {
                continue;
            };
            let Some(source) = job.source(&key) else {
                continue;
            };

            let outcome = aggregator.outcome(source, reply);
            tracing::debug!(
                job = %id,
                source = %key,
                status = ?outcome.status,
                items = outcome.items.len(),
                attempts = outcome.attempts,
                "source settled"
            );
            if job.cancel.is_cancelled() {
                continue;
            }
            if job.record(outcome) {
                on_progress(job.completed(), total);
            }
        }

        if job.cancel.is_cancelled() || !slot.release(id) {
            tracing::debug!(job = %id, "fan-out job dropped before completion");
            return None;
        }
        let result = job.finish(&aggregator);
        tracing::info!(
            job = %id,
            keyword = %result.keyword,
            sources = result.total(),
            unavailable = result.unavailable(),
            items = result.item_count(),
            "fan-out complete"
        );
        Some(result)
    }

    /// Cancel `id` if it is the slot's live job.
    pub fn cancel(&self, slot: &FanoutSlot, id: JobId) -> bool {
        slot.cancel(id)
    }

    fn spawn_calls(
        &self,
        job: &FanoutJob,
        query: &SearchQuery,
    ) -> JoinSet<(String, Option<UpstreamReply>)> {
        let request = query.request();
        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut tasks = JoinSet::new();

        for source in job.sources() {
            let client = Arc::clone(&self.client);
            let cancel = job.cancel.clone();
            let limiter = limiter.clone();
            let key = source.key.clone();
            let endpoint = source.endpoint.clone();
            let request = request.clone();
            let timeout = query.per_source_timeout;

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => tokio::select! {
                        biased;
                        () = cancel.cancelled() => return (key, None),
                        permit = limiter.acquire_owned() => permit.ok(),
                    },
                    None => None,
                };
                let reply = client
                    .call_with_cancel(&endpoint, &request, timeout, &cancel)
                    .await;
                (key, reply)
            });
        }

        tasks
    }
}
