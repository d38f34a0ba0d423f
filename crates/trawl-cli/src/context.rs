use std::sync::Arc;

use anyhow::Context;
use trawl_config::TrawlConfig;
use trawl_fanout::{Catalog, CatalogSettings, FanoutSlot};
use trawl_registry::SourceRegistry;
use trawl_upstream::UpstreamClient;

/// Everything a command needs, built once per invocation.
pub struct AppContext {
    pub config: TrawlConfig,
    pub catalog: Catalog,
    /// The CLI runs one search at a time, so a single slot suffices.
    pub slot: FanoutSlot,
}

impl AppContext {
    pub fn init(config: TrawlConfig) -> anyhow::Result<Self> {
        let registry = SourceRegistry::from_config(&config).context("failed to open source registry")?;
        let client =
            UpstreamClient::from_config(&config.upstream).context("failed to build upstream HTTP client")?;
        let catalog = Catalog::new(
            Arc::new(registry),
            Arc::new(client),
            CatalogSettings::from_config(&config),
        );

        tracing::debug!(
            sources_path = %config.storage.sources_path().display(),
            shared = catalog.registry().has_shared_store(),
            "application context ready"
        );

        Ok(Self {
            config,
            catalog,
            slot: FanoutSlot::new(),
        })
    }
}
