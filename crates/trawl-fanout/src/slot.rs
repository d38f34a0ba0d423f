//! The single "current job" reference of one logical query slot.

use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::job::JobId;

#[derive(Debug)]
struct ActiveJob {
    id: JobId,
    cancel: CancellationToken,
}

/// Holds at most one live job. Installing a new job cancels the previous one.
///
/// A search box is one slot; two independent searches need two slots.
#[derive(Debug, Default)]
pub struct FanoutSlot {
    active: Mutex<Option<ActiveJob>>,
}

impl FanoutSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live job, if any.
    #[must_use]
    pub fn current_job(&self) -> Option<JobId> {
        self.lock().as_ref().map(|job| job.id)
    }

    /// Cancel `id` if it is still the live job. Idempotent.
    pub fn cancel(&self, id: JobId) -> bool {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|job| job.id == id) {
            if let Some(job) = active.take() {
                job.cancel.cancel();
                tracing::debug!(job = %id, "fan-out job cancelled");
                return true;
            }
        }
        false
    }

    /// Cancel whatever job is live (caller teardown).
    pub fn cancel_current(&self) -> Option<JobId> {
        let job = self.lock().take()?;
        job.cancel.cancel();
        tracing::debug!(job = %job.id, "fan-out job cancelled");
        Some(job.id)
    }

    pub(crate) fn supersede(&self, id: JobId, cancel: CancellationToken) {
        let previous = self.lock().replace(ActiveJob { id, cancel });
        if let Some(previous) = previous {
            previous.cancel.cancel();
            tracing::debug!(job = %previous.id, by = %id, "fan-out job superseded");
        }
    }

    /// Clear the slot once `id` has produced its result. `false` means `id`
    /// was superseded or cancelled and its result must be discarded.
    pub(crate) fn release(&self, id: JobId) -> bool {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|job| job.id == id) {
            active.take();
            return true;
        }
        false
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveJob>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
