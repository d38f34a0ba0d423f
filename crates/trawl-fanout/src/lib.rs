//! # trawl-fanout
//!
//! The federated search engine:
//! - [`FanoutCoordinator`] dispatches one query to every eligible source
//!   concurrently and waits for all of them to settle
//! - [`FanoutSlot`] holds the single live job of a logical query slot;
//!   starting a new job cancels the old one
//! - [`ResultAggregator`] attributes, de-duplicates and caps records, then
//!   groups them by source order
//! - [`Catalog`] ties the registry, the upstream client and the coordinator
//!   together for a presentation layer

mod aggregator;
mod catalog;
mod coordinator;
mod error;
mod job;
mod slot;

pub use aggregator::ResultAggregator;
pub use catalog::{Catalog, CatalogSettings};
pub use coordinator::FanoutCoordinator;
pub use error::CatalogError;
pub use job::JobId;
pub use slot::FanoutSlot;
