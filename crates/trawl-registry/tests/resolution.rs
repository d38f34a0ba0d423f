//! Resolution chain and commit behavior of `SourceRegistry`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use object_store::memory::InMemory;
use pretty_assertions::assert_eq;
use serde_json::json;
use trawl_core::{SnapshotOrigin, Source, SourceSnapshot};
use trawl_registry::{
    FileSnapshotStore, ObjectSharedStore, RegistryError, SharedStore, SnapshotStore,
    SourceRegistry,
};

/// Shared store double that counts every interaction.
#[derive(Default)]
struct CountingShared {
    ready: bool,
    fail_reads: bool,
    content: Mutex<Option<Vec<u8>>>,
    probes: AtomicUsize,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingShared {
    fn ready_with(content: Option<serde_json::Value>) -> Arc<Self> {
        Arc::new(Self {
            ready: true,
            content: Mutex::new(content.map(|v| serde_json::to_vec(&v).unwrap())),
            ..Default::default()
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn calls(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
            + self.gets.load(Ordering::SeqCst)
            + self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SharedStore for CountingShared {
    async fn is_ready(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.ready
    }

    async fn get(&self) -> Result<Option<Vec<u8>>, RegistryError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(RegistryError::SharedStore("connection reset".into()));
        }
        Ok(self.content.lock().unwrap().clone())
    }

    async fn set(&self, bytes: Vec<u8>) -> Result<(), RegistryError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        *self.content.lock().unwrap() = Some(bytes);
        Ok(())
    }
}

fn source(key: &str, order: i64) -> Source {
    Source {
        key: key.into(),
        name: key.to_uppercase(),
        description: None,
        endpoint: format!("https://{key}.example/api.php/provide/vod/"),
        enabled: true,
        order,
    }
}

fn fallback() -> Source {
    source("fallback", 0)
}

fn registry_with(
    dir: &tempfile::TempDir,
    shared: Option<Arc<CountingShared>>,
) -> (SourceRegistry, FileSnapshotStore) {
    let local = FileSnapshotStore::new(dir.path().join("sources.json"));
    let shared = shared.map(|s| s as Arc<dyn SharedStore>);
    (
        SourceRegistry::new(local.clone(), shared, fallback()),
        local,
    )
}

fn keys(snapshot: &SourceSnapshot) -> Vec<&str> {
    snapshot.sources().iter().map(|s| s.key.as_str()).collect()
}

#[tokio::test]
async fn local_snapshot_is_authoritative_without_shared_calls() {
    let dir = tempfile::tempdir().unwrap();
    let shared = CountingShared::ready_with(Some(json!([{"key": "s", "url": "https://s.example/"}])));
    let (registry, local) = registry_with(&dir, Some(shared.clone()));
    local
        .write_snapshot(
            &serde_json::to_vec(&json!([
                {"key": "a", "name": "A", "url": "https://a.example/", "enabled": true},
                {"key": "b", "name": "B", "url": "https://b.example/", "enabled": true},
            ]))
            .unwrap(),
        )
        .unwrap();

    let snapshot = registry.resolve().await.unwrap();

    assert_eq!(snapshot.origin, SnapshotOrigin::Local);
    assert_eq!(keys(&snapshot), vec!["a", "b"]);
    assert_eq!(shared.calls(), 0);
}

#[tokio::test]
async fn shared_snapshot_is_adopted_and_written_through() {
    let dir = tempfile::tempdir().unwrap();
    let shared = CountingShared::ready_with(Some(json!([
        {"key": "s1", "name": "S1", "url": "https://s1.example/"},
        {"key": "s2", "name": "S2", "url": "https://s2.example/", "enabled": false},
    ])));
    let (registry, local) = registry_with(&dir, Some(shared.clone()));

    let snapshot = registry.resolve().await.unwrap();
    assert_eq!(snapshot.origin, SnapshotOrigin::Shared);
    // Missing `enabled` means on in the shared layer.
    assert!(snapshot.get("s1").unwrap().enabled);
    assert!(!snapshot.get("s2").unwrap().enabled);

    let persisted = SourceSnapshot::decode(
        &local.read_snapshot().unwrap().expect("written through"),
        SnapshotOrigin::Local,
    )
    .unwrap();
    assert_eq!(keys(&persisted), vec!["s1", "s2"]);
    assert!(persisted.get("s1").unwrap().enabled);
}

#[tokio::test]
async fn unreachable_shared_falls_back_to_default_once() {
    let dir = tempfile::tempdir().unwrap();
    let shared = CountingShared::unreachable();
    let (registry, local) = registry_with(&dir, Some(shared.clone()));

    let first = registry.resolve().await.unwrap();
    assert_eq!(first.origin, SnapshotOrigin::Default);
    assert_eq!(keys(&first), vec!["fallback"]);
    assert!(local.read_snapshot().unwrap().is_some());
    let calls_after_bootstrap = shared.calls();
    assert_eq!(shared.gets.load(Ordering::SeqCst), 0);

    let second = registry.resolve().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(shared.calls(), calls_after_bootstrap);
}

#[tokio::test]
async fn default_persisted_locally_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _) = registry_with(&dir, Some(CountingShared::unreachable()));
    registry.resolve().await.unwrap();

    let shared = CountingShared::ready_with(Some(json!([{"key": "s", "url": "https://s.example/"}])));
    let (restarted, _) = registry_with(&dir, Some(shared.clone()));
    let snapshot = restarted.resolve().await.unwrap();

    assert_eq!(snapshot.origin, SnapshotOrigin::Local);
    assert_eq!(keys(&snapshot), vec!["fallback"]);
    assert_eq!(shared.calls(), 0);
}

#[tokio::test]
async fn shared_read_error_degrades_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let shared = Arc::new(CountingShared {
        ready: true,
        fail_reads: true,
        ..Default::default()
    });
    let (registry, _) = registry_with(&dir, Some(shared));

    let snapshot = registry.resolve().await.unwrap();
    assert_eq!(snapshot.origin, SnapshotOrigin::Default);
}

#[tokio::test]
async fn empty_shared_snapshot_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _) = registry_with(&dir, Some(CountingShared::ready_with(Some(json!([])))));

    let snapshot = registry.resolve().await.unwrap();
    assert_eq!(snapshot.origin, SnapshotOrigin::Default);
}

#[tokio::test]
async fn corrupt_local_file_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, local) = registry_with(&dir, None);
    local.write_snapshot(b"{not json").unwrap();

    let snapshot = registry.resolve().await.unwrap();
    assert_eq!(snapshot.origin, SnapshotOrigin::Default);
    assert_eq!(local.read_snapshot().unwrap().as_deref(), Some(&b"{not json"[..]));
}

#[tokio::test]
async fn undispatchable_default_is_config_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let local = FileSnapshotStore::new(dir.path().join("sources.json"));
    let broken = Source {
        endpoint: String::new(),
        ..fallback()
    };
    let registry = SourceRegistry::new(local, None, broken);

    assert!(matches!(
        registry.resolve().await,
        Err(RegistryError::ConfigUnavailable(_))
    ));
}

#[tokio::test]
async fn commit_without_sync_leaves_shared_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let shared = CountingShared::unreachable();
    let (registry, local) = registry_with(&dir, Some(shared.clone()));
    let before = registry.resolve().await.unwrap();
    let probes = shared.calls();

    let next = SourceSnapshot::new(SnapshotOrigin::Local, vec![source("b", 1), source("a", 0)]).unwrap();
    let committed = registry.commit(next, false).await.unwrap();

    assert_eq!(keys(&committed), vec!["a", "b"]);
    assert_eq!(shared.calls(), probes);
    // The job-held snapshot is unchanged by the commit.
    assert_eq!(keys(&before), vec!["fallback"]);
    assert!(Arc::ptr_eq(&registry.resolve().await.unwrap(), &committed));

    let persisted = SourceSnapshot::decode(&local.read_snapshot().unwrap().unwrap(), SnapshotOrigin::Local).unwrap();
    assert_eq!(keys(&persisted), vec!["a", "b"]);
}

#[tokio::test]
async fn commit_with_sync_writes_shared() {
    let dir = tempfile::tempdir().unwrap();
    let shared = CountingShared::ready_with(None);
    let (registry, _) = registry_with(&dir, Some(shared.clone()));

    let next = SourceSnapshot::new(SnapshotOrigin::Local, vec![source("a", 0)]).unwrap();
    registry.commit(next, true).await.unwrap();

    assert_eq!(shared.sets.load(Ordering::SeqCst), 1);
    let preview = registry.fetch_shared().await.unwrap().expect("shared snapshot");
    assert_eq!(preview.origin, SnapshotOrigin::Shared);
    assert_eq!(keys(&preview), vec!["a"]);
}

#[tokio::test]
async fn commit_with_sync_but_no_shared_store_keeps_local() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, local) = registry_with(&dir, None);

    let next = SourceSnapshot::new(SnapshotOrigin::Local, vec![source("a", 0)]).unwrap();
    let result = registry.commit(next, true).await;

    assert!(matches!(result, Err(RegistryError::SharedUnavailable)));
    assert!(local.read_snapshot().unwrap().is_some());
    assert_eq!(keys(&registry.current().unwrap()), vec!["a"]);
}

#[tokio::test]
async fn fetch_shared_when_unreachable_is_none() {
    let dir = tempfile::tempdir().unwrap();
    let (registry, _) = registry_with(&dir, Some(CountingShared::unreachable()));
    assert!(registry.fetch_shared().await.unwrap().is_none());

    let (no_shared, _) = registry_with(&dir, None);
    assert!(no_shared.fetch_shared().await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_first_resolves_bootstrap_once() {
    let dir = tempfile::tempdir().unwrap();
    let shared = CountingShared::ready_with(Some(json!([{"key": "s", "url": "https://s.example/"}])));
    let (registry, _) = registry_with(&dir, Some(shared.clone()));
    let registry = Arc::new(registry);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move { registry.resolve().await.unwrap() }));
    }
    for handle in handles {
        assert_eq!(keys(&handle.await.unwrap()), vec!["s"]);
    }
    assert_eq!(shared.gets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn object_store_backed_shared_layer() {
    let dir = tempfile::tempdir().unwrap();
    let memory = Arc::new(InMemory::new());
    let shared = Arc::new(ObjectSharedStore::new(
        memory,
        "trawl/sources.json",
        Duration::from_secs(2),
    ));
    shared
        .set(serde_json::to_vec(&json!([{"key": "r2", "name": "R2", "url": "https://r2.example/"}])).unwrap())
        .await
        .unwrap();

    let local = FileSnapshotStore::new(dir.path().join("sources.json"));
    let registry = SourceRegistry::new(local, Some(shared), fallback());

    let snapshot = registry.resolve().await.unwrap();
    assert_eq!(snapshot.origin, SnapshotOrigin::Shared);
    assert_eq!(keys(&snapshot), vec!["r2"]);
}
