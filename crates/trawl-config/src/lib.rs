//! # trawl-config
//!
//! Layered configuration loading for trawl using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TRAWL_*` prefix, `__` as separator)
//! 2. Project-level `.trawl/config.toml`
//! 3. User-level `~/.config/trawl/config.toml`
//! 4. Built-in defaults
//!
//! Figment maps `TRAWL_SEARCH__PER_SOURCE_CAP` -> `search.per_source_cap`,
//! `TRAWL_SHARED__BACKEND` -> `shared.backend`, etc.
//!
//! ```no_run
//! use trawl_config::TrawlConfig;
//!
//! let config = TrawlConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("sources live in {}", config.storage.sources_path().display());
//! ```

mod bootstrap;
mod error;
mod search;
mod shared;
mod storage;
mod upstream;

pub use bootstrap::BootstrapConfig;
pub use error::ConfigError;
pub use search::SearchConfig;
pub use shared::{SharedBackend, SharedConfig};
pub use storage::StorageConfig;
pub use upstream::UpstreamConfig;

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TrawlConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl TrawlConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT read `.env`; use [`TrawlConfig::load_with_dotenv`] for that.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load `.env` from the current directory (if any), then [`TrawlConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can merge extra providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".trawl/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TRAWL_").split("__"))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &str, value: u64) -> Result<(), ConfigError> {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            Ok(())
        }

        positive("upstream.timeout_ms", self.upstream.timeout_ms)?;
        positive("upstream.max_attempts", u64::from(self.upstream.max_attempts))?;
        positive(
            "search.per_source_cap",
            u64::try_from(self.search.per_source_cap).unwrap_or(u64::MAX),
        )?;
        positive("search.per_source_timeout_ms", self.search.per_source_timeout_ms)?;

        if self.storage.sources_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.sources_file".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.shared.backend()? == SharedBackend::R2 {
            if !self.shared.is_configured() {
                return Err(ConfigError::NotConfigured {
                    section: "shared".to_string(),
                });
            }
            if self.shared.sources_key.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "shared.sources_key".to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trawl").join("config.toml"))
    }
}
