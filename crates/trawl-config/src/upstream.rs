//! Upstream HTTP call policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const fn default_timeout_ms() -> u64 {
    8_000
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_backoff_ms() -> u64 {
    1_000
}

/// Many catalog sources run on self-signed or expired certificates.
const fn default_accept_invalid_certs() -> bool {
    true
}

fn default_user_agent() -> String {
    String::from("trawl/0.1")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Per-attempt timeout for single-source listing and detail calls.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempt budget per call, the first attempt included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed wait between attempts after a transient failure.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Skip TLS certificate validation for upstream calls.
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            accept_invalid_certs: default_accept_invalid_certs(),
            user_agent: default_user_agent(),
        }
    }
}

impl UpstreamConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}
