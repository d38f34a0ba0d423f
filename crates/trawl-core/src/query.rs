//! Query types: which sources to ask, and what to ask them.

use std::collections::BTreeSet;
use std::time::Duration;

/// Default number of items a single source may contribute to a search.
pub const DEFAULT_SEARCH_CAP: usize = 12;

/// Default per-source call timeout.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(8);

/// Which sources a query targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceSelection {
    /// Every enabled source in the snapshot.
    #[default]
    All,
    /// Only the named sources (still subject to being enabled).
    Keys(BTreeSet<String>),
}

impl SourceSelection {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keys(keys.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn includes(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Keys(keys) => keys.contains(key),
        }
    }
}

/// A federated keyword search. Immutable once dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: String,
    pub selection: SourceSelection,
    /// Max items kept per source; `None` keeps everything.
    pub per_source_cap: Option<usize>,
    pub per_source_timeout: Duration,
}

impl SearchQuery {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            selection: SourceSelection::All,
            per_source_cap: Some(DEFAULT_SEARCH_CAP),
            per_source_timeout: DEFAULT_SOURCE_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_selection(mut self, selection: SourceSelection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub const fn with_cap(mut self, cap: Option<usize>) -> Self {
        self.per_source_cap = cap;
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.per_source_timeout = timeout;
        self
    }

    /// The upstream request every eligible source receives.
    #[must_use]
    pub fn request(&self) -> CatalogRequest {
        CatalogRequest::Search {
            keyword: self.keyword.clone(),
        }
    }
}

/// One upstream catalog call, in the `provide/vod` parameter dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    /// A page of the source's default listing.
    List { page: u32 },
    /// Keyword search.
    Search { keyword: String },
    /// Full records for specific native ids.
    Detail { ids: Vec<String> },
}

impl CatalogRequest {
    /// Query-string parameters for this request.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("ac", String::from("detail"))];
        match self {
            Self::List { page } => params.push(("pg", (*page).max(1).to_string())),
            Self::Search { keyword } => params.push(("wd", keyword.clone())),
            Self::Detail { ids } => params.push(("ids", ids.join(","))),
        }
        params
    }
}
