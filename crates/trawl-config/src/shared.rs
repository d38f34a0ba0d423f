//! Shared (remote) source snapshot store.
//!
//! The shared layer is an S3-compatible bucket (Cloudflare R2 in practice)
//! holding one JSON snapshot object under `sources_key`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_backend() -> String {
    String::from("none")
}

fn default_bucket_name() -> String {
    String::from("trawl")
}

fn default_sources_key() -> String {
    String::from("trawl/sources.json")
}

const fn default_ready_timeout_ms() -> u64 {
    2_000
}

/// Which shared store implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedBackend {
    None,
    R2,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SharedConfig {
    /// `none` or `r2`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Cloudflare account ID.
    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub access_key_id: String,

    #[serde(default)]
    pub secret_access_key: String,

    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Custom endpoint URL. If empty, built from `account_id`.
    #[serde(default)]
    pub endpoint: String,

    /// Object key of the shared snapshot.
    #[serde(default = "default_sources_key")]
    pub sources_key: String,

    /// How long a readiness probe may take before the store counts as down.
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            account_id: String::new(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: default_bucket_name(),
            endpoint: String::new(),
            sources_key: default_sources_key(),
            ready_timeout_ms: default_ready_timeout_ms(),
        }
    }
}

impl SharedConfig {
    /// Parse `backend`. Case-insensitive; empty means `none`.
    pub fn backend(&self) -> Result<SharedBackend, ConfigError> {
        match self.backend.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SharedBackend::None),
            "r2" => Ok(SharedBackend::R2),
            other => Err(ConfigError::UnsupportedBackend(other.to_string())),
        }
    }

    /// Check if the R2 credentials have the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        (!self.account_id.is_empty() || !self.endpoint.is_empty())
            && !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.bucket_name.is_empty()
    }

    /// Returns the custom `endpoint` if set, otherwise builds from `account_id`.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        if self.endpoint.is_empty() {
            format!("https://{}.r2.cloudflarestorage.com", self.account_id)
        } else {
            self.endpoint.clone()
        }
    }

    #[must_use]
    pub const fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}
