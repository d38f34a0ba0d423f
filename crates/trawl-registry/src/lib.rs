//! # trawl-registry
//!
//! Resolves which catalog sources exist, from three layers:
//! 1. the local snapshot file (authoritative once present),
//! 2. the shared object store (adopted and written through on cold start),
//! 3. the built-in default source.
//!
//! Shared-store failures are logged and degrade to the next layer.

mod error;
mod local;
mod registry;
mod shared;

pub use error::RegistryError;
pub use local::{FileSnapshotStore, SnapshotStore};
pub use registry::{SourceRegistry, default_source};
pub use shared::{ObjectSharedStore, SharedStore};
