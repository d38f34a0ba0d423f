//! The shared layer: a best-effort remote copy of the source snapshot.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use trawl_config::SharedConfig;

use crate::error::RegistryError;

/// Remote snapshot storage. Never required for correctness.
#[async_trait]
pub trait SharedStore: Send + Sync {
    /// Liveness probe. Callers skip the store entirely when this is `false`.
    async fn is_ready(&self) -> bool;

    /// Fetch the snapshot bytes, `None` if the object does not exist.
    async fn get(&self) -> Result<Option<Vec<u8>>, RegistryError>;

    /// Overwrite the snapshot. Last writer wins.
    async fn set(&self, bytes: Vec<u8>) -> Result<(), RegistryError>;
}

/// [`SharedStore`] over any `object_store` backend, holding one object.
pub struct ObjectSharedStore {
    store: Arc<dyn ObjectStore>,
    key: Path,
    /// Deadline for the readiness probe and for each read or write.
    ready_timeout: Duration,
}

impl ObjectSharedStore {
    pub fn new(store: Arc<dyn ObjectStore>, key: &str, ready_timeout: Duration) -> Self {
        Self {
            store,
            key: Path::from(key),
            ready_timeout,
        }
    }

    /// Build an S3-compatible (Cloudflare R2) store from the `[shared]` section.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SharedStore`] if the builder rejects the settings.
    pub fn r2(config: &SharedConfig) -> Result<Self, RegistryError> {
        let store = AmazonS3Builder::new()
            .with_endpoint(config.endpoint_url())
            .with_bucket_name(&config.bucket_name)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_region("auto")
            .build()?;
        Ok(Self::new(
            Arc::new(store),
            &config.sources_key,
            config.ready_timeout(),
        ))
    }
}

#[async_trait]
impl SharedStore for ObjectSharedStore {
    async fn is_ready(&self) -> bool {
        match tokio::time::timeout(self.ready_timeout, self.store.head(&self.key)).await {
            Ok(Ok(_) | Err(object_store::Error::NotFound { .. })) => true,
            Ok(Err(error)) => {
                tracing::warn!(%error, key = %self.key, "shared store probe failed");
                false
            }
            Err(_) => {
                tracing::warn!(key = %self.key, "shared store probe timed out");
                false
            }
        }
    }

    async fn get(&self) -> Result<Option<Vec<u8>>, RegistryError> {
        tokio::time::timeout(self.ready_timeout, self.fetch())
            .await
            .map_err(|_| self.timed_out("read"))?
    }

    async fn set(&self, bytes: Vec<u8>) -> Result<(), RegistryError> {
        tokio::time::timeout(
            self.ready_timeout,
            self.store.put(&self.key, PutPayload::from(bytes)),
        )
        .await
        .map_err(|_| self.timed_out("write"))??;
        Ok(())
    }
}

impl ObjectSharedStore {
    async fn fetch(&self) -> Result<Option<Vec<u8>>, RegistryError> {
        match self.store.get(&self.key).await {
            Ok(result) => Ok(Some(result.bytes().await?.to_vec())),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn timed_out(&self, op: &str) -> RegistryError {
        RegistryError::SharedStore(format!(
            "{op} of {} timed out after {} ms",
            self.key,
            self.ready_timeout.as_millis()
        ))
    }
}
