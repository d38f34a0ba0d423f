//! # trawl-core
//!
//! Core types shared across all trawl crates.
//!
//! This crate provides the foundational catalog data model:
//! - [`Source`] records and their wire-compatible [`SourceRecord`] form
//! - Ordered, validated [`SourceSnapshot`]s tagged with the layer they came from
//! - Query types ([`SearchQuery`], [`SourceSelection`], [`CatalogRequest`])
//! - The per-source outcome taxonomy ([`OutcomeStatus`], [`ErrorKind`], [`SourceOutcome`])
//! - Normalized, attributed [`Item`]s and the assembled response shapes
//!   ([`FanoutResult`], [`SourceGroup`], [`ListingPage`])

pub mod errors;
pub mod item;
pub mod outcome;
pub mod query;
pub mod responses;
pub mod snapshot;
pub mod source;

pub use errors::SnapshotError;
pub use item::{ATTRIBUTION_FIELDS, Item, NATIVE_ID_FIELD, Pagination, native_id_of};
pub use outcome::{ErrorKind, OutcomeStatus, OutcomeSummary, SourceOutcome};
pub use query::{
    CatalogRequest, DEFAULT_SEARCH_CAP, DEFAULT_SOURCE_TIMEOUT, SearchQuery, SourceSelection,
};
pub use responses::{FanoutResult, ListingPage, SourceGroup};
pub use snapshot::{SnapshotOrigin, SourceSnapshot};
pub use source::{EnabledPolicy, Source, SourceRecord, SourceSummary, SourceView};
