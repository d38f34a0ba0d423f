//! Federated search defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_per_source_cap() -> usize {
    12
}

const fn default_per_source_timeout_ms() -> u64 {
    8_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Max items one source contributes to a search result.
    #[serde(default = "default_per_source_cap")]
    pub per_source_cap: usize,

    /// Per-attempt timeout for each source during a fan-out.
    #[serde(default = "default_per_source_timeout_ms")]
    pub per_source_timeout_ms: u64,

    /// Max concurrent source calls per search; 0 means unbounded.
    #[serde(default)]
    pub max_concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_source_cap: default_per_source_cap(),
            per_source_timeout_ms: default_per_source_timeout_ms(),
            max_concurrency: 0,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub const fn per_source_timeout(&self) -> Duration {
        Duration::from_millis(self.per_source_timeout_ms)
    }

    #[must_use]
    pub const fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrency == 0 {
            None
        } else {
            Some(self.max_concurrency)
        }
    }
}
