//! Layered source resolution.

use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use trawl_config::{BootstrapConfig, SharedBackend, TrawlConfig};
use trawl_core::{SnapshotOrigin, Source, SourceSnapshot};

use crate::error::RegistryError;
use crate::local::{FileSnapshotStore, SnapshotStore};
use crate::shared::{ObjectSharedStore, SharedStore};

/// Resolves the active [`SourceSnapshot`].
///
/// The first [`SourceRegistry::resolve`] walks local → shared → built-in
/// default and caches the winner; later calls return the cached snapshot
/// without touching either store. [`SourceRegistry::commit`] swaps in a new
/// snapshot. Jobs holding the previous `Arc` keep seeing it unchanged.
pub struct SourceRegistry {
    local: Box<dyn SnapshotStore>,
    shared: Option<Arc<dyn SharedStore>>,
    default_source: Source,
    current: RwLock<Option<Arc<SourceSnapshot>>>,
    bootstrap: Mutex<()>,
}

impl SourceRegistry {
    pub fn new(
        local: impl SnapshotStore + 'static,
        shared: Option<Arc<dyn SharedStore>>,
        default_source: Source,
    ) -> Self {
        Self {
            local: Box::new(local),
            shared,
            default_source,
            current: RwLock::new(None),
            bootstrap: Mutex::new(()),
        }
    }

    /// Build the registry described by `[storage]`, `[shared]` and `[bootstrap]`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Config`] for an unknown shared backend and
    /// [`RegistryError::SharedStore`] if the object store cannot be built.
    pub fn from_config(config: &TrawlConfig) -> Result<Self, RegistryError> {
        let local = FileSnapshotStore::new(config.storage.sources_path());
        let shared: Option<Arc<dyn SharedStore>> = match config.shared.backend()? {
            SharedBackend::None => None,
            SharedBackend::R2 => Some(Arc::new(ObjectSharedStore::r2(&config.shared)?)),
        };
        Ok(Self::new(local, shared, default_source(&config.bootstrap)))
    }

    /// The cached snapshot, if resolution has happened.
    #[must_use]
    pub fn current(&self) -> Option<Arc<SourceSnapshot>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn has_shared_store(&self) -> bool {
        self.shared.is_some()
    }

    /// Return the active snapshot, bootstrapping it on first use.
    ///
    /// Concurrent first callers wait for a single bootstrap; none of them
    /// re-queries the shared store once a snapshot is cached.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::ConfigUnavailable`] only when every layer is
    /// empty or unreachable and the built-in default has no dispatchable source.
    pub async fn resolve(&self) -> Result<Arc<SourceSnapshot>, RegistryError> {
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        // Held across the store round trips so the chain runs once per process.
        let _guard = self.bootstrap.lock().await;
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        let snapshot = Arc::new(self.bootstrap_chain().await?);
        self.install(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Persist `snapshot` locally and make it active.
    ///
    /// With `sync_to_shared` the same bytes are written to the shared store
    /// after the local write succeeds. A failed shared write leaves the new
    /// snapshot active locally.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::LocalStore`] if the local write fails (nothing
    /// changes), or [`RegistryError::SharedUnavailable`] /
    /// [`RegistryError::SharedStore`] if the opted-in shared write fails.
    pub async fn commit(
        &self,
        snapshot: SourceSnapshot,
        sync_to_shared: bool,
    ) -> Result<Arc<SourceSnapshot>, RegistryError> {
        let snapshot = snapshot.with_origin(SnapshotOrigin::Local);
        let bytes = snapshot.encode()?;
        self.local.write_snapshot(&bytes)?;

        let snapshot = Arc::new(snapshot);
        self.install(Arc::clone(&snapshot));
        tracing::info!(sources = snapshot.len(), "committed source snapshot");

        if sync_to_shared {
            let shared = self.shared.as_ref().ok_or(RegistryError::SharedUnavailable)?;
            if !shared.is_ready().await {
                return Err(RegistryError::SharedUnavailable);
            }
            shared.set(bytes).await?;
            tracing::info!(sources = snapshot.len(), "synced source snapshot to shared store");
        }

        Ok(snapshot)
    }

    /// Read the shared snapshot without adopting it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SharedStore`] if a ready store fails the read
    /// and [`RegistryError::InvalidSnapshot`] if its content does not decode.
    pub async fn fetch_shared(&self) -> Result<Option<SourceSnapshot>, RegistryError> {
        let Some(shared) = &self.shared else {
            return Ok(None);
        };
        if !shared.is_ready().await {
            tracing::warn!("shared store not ready; nothing to preview");
            return Ok(None);
        }
        match shared.get().await? {
            Some(bytes) => Ok(Some(SourceSnapshot::decode(&bytes, SnapshotOrigin::Shared)?)),
            None => Ok(None),
        }
    }

    fn cached(&self) -> Option<Arc<SourceSnapshot>> {
        self.current().filter(|snapshot| !snapshot.is_empty())
    }

    fn install(&self, snapshot: Arc<SourceSnapshot>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    async fn bootstrap_chain(&self) -> Result<SourceSnapshot, RegistryError> {
        // A corrupt local file is left alone so it can be inspected and fixed.
        let mut local_writable = true;
        match self.read_local() {
            Ok(Some(snapshot)) if !snapshot.is_empty() => {
                tracing::info!(sources = snapshot.len(), "using local source snapshot");
                return Ok(snapshot);
            }
            Ok(_) => tracing::debug!("local source snapshot absent or empty"),
            Err(error) => {
                tracing::warn!(%error, "local source snapshot unreadable; trying next layer");
                local_writable = false;
            }
        }

        if let Some(snapshot) = self.read_shared().await {
            tracing::info!(sources = snapshot.len(), "adopted shared source snapshot");
            if local_writable {
                self.persist_locally(&snapshot);
            }
            return Ok(snapshot);
        }

        let snapshot = SourceSnapshot::new(SnapshotOrigin::Default, vec![self.default_source.clone()])?;
        if !snapshot.sources().iter().any(Source::is_dispatchable) {
            return Err(RegistryError::ConfigUnavailable(format!(
                "built-in default source '{}' is not dispatchable",
                self.default_source.key
            )));
        }
        tracing::warn!(source = %self.default_source.key, "falling back to built-in default source");
        if local_writable {
            self.persist_locally(&snapshot);
        }
        Ok(snapshot)
    }

    fn read_local(&self) -> Result<Option<SourceSnapshot>, RegistryError> {
        self.local
            .read_snapshot()?
            .map(|bytes| SourceSnapshot::decode(&bytes, SnapshotOrigin::Local))
            .transpose()
            .map_err(RegistryError::from)
    }

    /// Every shared-store failure degrades to `None`.
    async fn read_shared(&self) -> Option<SourceSnapshot> {
        let shared = self.shared.as_ref()?;
        if !shared.is_ready().await {
            tracing::warn!("shared store not ready; skipping shared layer");
            return None;
        }
        let bytes = match shared.get().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(%error, "shared store read failed; skipping shared layer");
                return None;
            }
        };
        match SourceSnapshot::decode(&bytes, SnapshotOrigin::Shared) {
            Ok(snapshot) if !snapshot.is_empty() => Some(snapshot),
            Ok(_) => None,
            Err(error) => {
                tracing::warn!(%error, "shared source snapshot invalid; skipping shared layer");
                None
            }
        }
    }

    fn persist_locally(&self, snapshot: &SourceSnapshot) {
        let written = snapshot
            .encode()
            .map_err(RegistryError::from)
            .and_then(|bytes| self.local.write_snapshot(&bytes));
        if let Err(error) = written {
            tracing::warn!(%error, "could not persist source snapshot locally");
        }
    }
}

/// The built-in fallback source from `[bootstrap]`.
#[must_use]
pub fn default_source(config: &BootstrapConfig) -> Source {
    Source {
        key: config.key.clone(),
        name: config.name.clone(),
        description: Some(config.description.clone()).filter(|d| !d.is_empty()),
        endpoint: config.endpoint.clone(),
        enabled: true,
        order: 0,
    }
}
