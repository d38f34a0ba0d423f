//! Catalog facade: listing, detail, search, and snapshot isolation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rstest::rstest;
use trawl_core::{OutcomeStatus, SnapshotOrigin, SourceSnapshot, SourceView};
use trawl_fanout::{Catalog, CatalogError, CatalogSettings, FanoutSlot};
use trawl_registry::{FileSnapshotStore, SourceRegistry};

use common::{Behavior, ScriptedTransport, client, source};

fn settings() -> CatalogSettings {
    CatalogSettings {
        listing_timeout: Duration::from_secs(8),
        search_cap: 12,
        search_timeout: Duration::from_secs(8),
        max_concurrency: None,
    }
}

async fn catalog(
    dir: &tempfile::TempDir,
    transport: Arc<ScriptedTransport>,
) -> Catalog {
    let registry = SourceRegistry::new(
        FileSnapshotStore::new(dir.path().join("sources.json")),
        None,
        source("fallback", true, 0),
    );
    let snapshot = SourceSnapshot::new(
        SnapshotOrigin::Local,
        vec![source("a", true, 0), source("b", false, 1), source("c", true, 2)],
    )
    .unwrap();
    registry.commit(snapshot, false).await.unwrap();
    Catalog::new(Arc::new(registry), client(transport), settings())
}

#[tokio::test(start_paused = true)]
async fn list_returns_uncapped_items_with_pagination() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([("a", Behavior::Items(40))]);
    let catalog = catalog(&dir, transport.clone()).await;

    let page = catalog.list("a", 2).await.unwrap();

    assert_eq!(page.status, OutcomeStatus::Success);
    assert_eq!(page.items.len(), 40);
    assert_eq!(page.pagination.page_count, 3);
    assert_eq!(page.source_name, "Source a");
    let url = transport.last_url("a").unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("pg".to_string(), "2".to_string())));
    assert!(pairs.contains(&("ac".to_string(), "detail".to_string())));
}

#[tokio::test(start_paused = true)]
async fn list_without_reported_page_echoes_requested_page() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([("a", Behavior::Body(r#"{"list":[{"vod_id":1}]}"#))]);
    let catalog = catalog(&dir, transport).await;

    let page = catalog.list("a", 3).await.unwrap();

    assert_eq!(page.status, OutcomeStatus::Success);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.pagination.page, 3);
    assert_eq!(page.pagination.page_count, 1);
}

#[rstest]
#[case::disabled("b")]
#[case::missing("zzz")]
#[tokio::test(start_paused = true)]
async fn list_rejects_sources_that_cannot_be_dispatched(#[case] key: &str) {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([("b", Behavior::Items(1))]);
    let catalog = catalog(&dir, transport.clone()).await;

    let err = catalog.list(key, 1).await.unwrap_err();
    assert!(matches!(err, CatalogError::UnknownSource(ref k) if k == key));
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn list_failure_is_data_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([("a", Behavior::Status(503))]);
    let catalog = catalog(&dir, transport.clone()).await;

    let page = catalog.list("a", 4).await.unwrap();

    assert_eq!(page.status, OutcomeStatus::TransportError);
    assert!(page.items.is_empty());
    assert_eq!(page.pagination.page, 4);
    assert_eq!(page.pagination.page_count, 1);
    assert_eq!(transport.calls("a"), 3);
}

#[tokio::test(start_paused = true)]
async fn detail_sends_joined_ids() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([("c", Behavior::Items(2))]);
    let catalog = catalog(&dir, transport.clone()).await;

    let page = catalog
        .detail("c", &["0".to_string(), "1".to_string()])
        .await
        .unwrap();

    let ids: Vec<&str> = page.items.iter().map(|i| i.unique_id.as_str()).collect();
    assert_eq!(ids, vec!["c:0", "c:1"]);
    let url = transport.last_url("c").unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("ids".to_string(), "0,1".to_string())));
}

#[tokio::test(start_paused = true)]
async fn search_uses_configured_cap() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([("a", Behavior::Items(30)), ("c", Behavior::Items(5))]);
    let catalog = catalog(&dir, transport).await;
    let query = catalog.search_query("dune");

    let result = catalog
        .search(&FanoutSlot::new(), &query, |_, _| {})
        .await
        .unwrap()
        .unwrap();

    let sizes: Vec<(&str, usize)> = result
        .groups
        .iter()
        .map(|g| (g.source_key.as_str(), g.items.len()))
        .collect();
    assert_eq!(sizes, vec![("a", 12), ("c", 5)]);
}

#[tokio::test(start_paused = true)]
async fn commit_during_search_does_not_change_the_running_job() {
    let dir = tempfile::tempdir().unwrap();
    let transport = ScriptedTransport::new([
        ("a", Behavior::Delayed(Duration::from_secs(3), 1)),
        ("c", Behavior::Delayed(Duration::from_secs(3), 1)),
        ("z", Behavior::Items(1)),
    ]);
    let catalog = catalog(&dir, transport.clone()).await;
    let query = catalog.search_query("x");
    let slot = FanoutSlot::new();

    let search = catalog.search(&slot, &query, |_, _| {});
    let commit = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let next = SourceSnapshot::new(SnapshotOrigin::Local, vec![source("z", true, 0)]).unwrap();
        catalog.registry().commit(next, false).await.unwrap();
    };
    let (result, ()) = tokio::join!(search, commit);

    let result = result.unwrap().unwrap();
    assert_eq!(result.sources, vec!["a", "c"]);
    assert_eq!(transport.calls("z"), 0);

    let sources = catalog.sources(SourceView::Full).await.unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].key, "z");
}

#[tokio::test(start_paused = true)]
async fn public_view_hides_disabled_sources_and_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = catalog(&dir, ScriptedTransport::new([])).await;

    let public = catalog.sources(SourceView::Public).await.unwrap();
    let keys: Vec<&str> = public.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "c"]);
    assert!(public.iter().all(|s| s.endpoint.is_none()));

    let full = catalog.sources(SourceView::Full).await.unwrap();
    assert_eq!(full.len(), 3);
    assert!(full.iter().all(|s| s.endpoint.is_some()));
}
