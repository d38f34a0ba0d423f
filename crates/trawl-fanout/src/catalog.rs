//! The operations a presentation layer calls: sources, listing, detail, search.

use std::sync::Arc;
use std::time::Duration;

use trawl_config::TrawlConfig;
use trawl_core::{
    CatalogRequest, FanoutResult, ListingPage, Pagination, SearchQuery, Source,
    SourceSummary, SourceView,
};
use trawl_registry::SourceRegistry;
use trawl_upstream::UpstreamClient;

use crate::aggregator::ResultAggregator;
use crate::coordinator::FanoutCoordinator;
use crate::error::CatalogError;
use crate::slot::FanoutSlot;

/// Tunables for [`Catalog`], usually taken from `[upstream]` and `[search]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Per-attempt timeout for listing and detail calls.
    pub listing_timeout: Duration,
    pub search_cap: usize,
    pub search_timeout: Duration,
    pub max_concurrency: Option<usize>,
}

impl CatalogSettings {
    #[must_use]
    pub fn from_config(config: &TrawlConfig) -> Self {
        Self {
            listing_timeout: config.upstream.timeout(),
            search_cap: config.search.per_source_cap,
            search_timeout: config.search.per_source_timeout(),
            max_concurrency: config.search.concurrency_limit(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self::from_config(&TrawlConfig::default())
    }
}

pub struct Catalog {
    registry: Arc<SourceRegistry>,
    client: Arc<UpstreamClient>,
    coordinator: FanoutCoordinator,
    settings: CatalogSettings,
}

impl Catalog {
    pub fn new(
        registry: Arc<SourceRegistry>,
        client: Arc<UpstreamClient>,
        settings: CatalogSettings,
    ) -> Self {
        let coordinator = FanoutCoordinator::new(Arc::clone(&client))
            .with_max_concurrency(settings.max_concurrency);
        Self {
            registry,
            client,
            coordinator,
            settings,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// The active sources as seen by `view`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Registry`] if no snapshot can be resolved.
    pub async fn sources(&self, view: SourceView) -> Result<Vec<SourceSummary>, CatalogError> {
        Ok(self.registry.resolve().await?.view(view))
    }

    /// One page of a source's listing. Items are not capped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSource`] for a missing, disabled or
    /// endpointless source. Upstream failures are reported in the page's
    /// `status` instead.
    pub async fn list(&self, source_key: &str, page: u32) -> Result<ListingPage, CatalogError> {
        let page = page.max(1);
        self.single_source(source_key, &CatalogRequest::List { page }, page)
            .await
    }

    /// Full records for `ids` from one source.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSource`] as for [`Catalog::list`].
    pub async fn detail(
        &self,
        source_key: &str,
        ids: &[String],
    ) -> Result<ListingPage, CatalogError> {
        let request = CatalogRequest::Detail { ids: ids.to_vec() };
        self.single_source(source_key, &request, 1).await
    }

    /// A search query carrying the configured cap and timeout.
    pub fn search_query(&self, keyword: impl Into<String>) -> SearchQuery {
        SearchQuery::new(keyword)
            .with_cap(Some(self.settings.search_cap))
            .with_timeout(self.settings.search_timeout)
    }

    /// Resolve sources and fan `query` out through `slot`.
    ///
    /// `Ok(None)` means the job was superseded or cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Registry`] only when source resolution fails;
    /// per-source failures are data on the result.
    pub async fn search<F>(
        &self,
        slot: &FanoutSlot,
        query: &SearchQuery,
        on_progress: F,
    ) -> Result<Option<FanoutResult>, CatalogError>
    where
        F: FnMut(usize, usize),
    {
        let snapshot = self.registry.resolve().await?;
        Ok(self
            .coordinator
            .dispatch(slot, query, snapshot, on_progress)
            .await)
    }

    async fn single_source(
        &self,
        source_key: &str,
        request: &CatalogRequest,
        requested_page: u32,
    ) -> Result<ListingPage, CatalogError> {
        let snapshot = self.registry.resolve().await?;
        let source: Source = snapshot
            .dispatchable(source_key)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownSource(source_key.to_string()))?;

        let reply = self
            .client
            .call(&source.endpoint, request, self.settings.listing_timeout)
            .await;
        let reported_page = reply.page.as_ref().and_then(|page| page.reported_page);
        let outcome = ResultAggregator::new(None).outcome(&source, reply);
        if outcome.status.is_unavailable() {
            tracing::warn!(
                source = %source.key,
                status = ?outcome.status,
                error = ?outcome.error,
                "single-source call failed"
            );
        }

        let pagination = Pagination {
            page: reported_page.unwrap_or(requested_page),
            ..outcome.pagination.unwrap_or_default()
        };
        Ok(ListingPage {
            source_key: source.key,
            source_name: source.name,
            status: outcome.status,
            error: outcome.error,
            pagination,
            items: outcome.items,
        })
    }
}
