//! Shared fixtures: a scripted transport keyed by host, and source builders.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use trawl_core::{SnapshotOrigin, Source, SourceSnapshot};
use trawl_upstream::{RawResponse, RetryPolicy, Transport, TransportError, UpstreamClient};

/// How the fake host behind a source answers.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// `n` records with native ids `0..n`.
    Items(usize),
    /// Same as `Items`, after a delay.
    Delayed(Duration, usize),
    /// Never answers.
    Hang,
    Status(u16),
    Body(&'static str),
}

#[derive(Default)]
pub struct ScriptedTransport {
    behaviors: HashMap<String, Behavior>,
    requests: Mutex<Vec<reqwest::Url>>,
}

impl ScriptedTransport {
    pub fn new<I>(behaviors: I) -> Arc<Self>
    where
        I: IntoIterator<Item = (&'static str, Behavior)>,
    {
        Arc::new(Self {
            behaviors: behaviors
                .into_iter()
                .map(|(key, behavior)| (host(key), behavior))
                .collect(),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Requests made to the source `key`.
    pub fn calls(&self, key: &str) -> usize {
        let host = host(key);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.host_str() == Some(host.as_str()))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_url(&self, key: &str) -> Option<reqwest::Url> {
        let host = host(key);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|url| url.host_str() == Some(host.as_str()))
            .cloned()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &reqwest::Url) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(url.clone());
        let behavior = url
            .host_str()
            .and_then(|host| self.behaviors.get(host))
            .cloned()
            .unwrap_or(Behavior::Status(404));

        match behavior {
            Behavior::Items(n) => Ok(items_response(n)),
            Behavior::Delayed(delay, n) => {
                tokio::time::sleep(delay).await;
                Ok(items_response(n))
            }
            Behavior::Hang => std::future::pending::<Result<RawResponse, TransportError>>().await,
            Behavior::Status(status) => Ok(RawResponse {
                status,
                body: Vec::new(),
            }),
            Behavior::Body(body) => Ok(RawResponse {
                status: 200,
                body: body.as_bytes().to_vec(),
            }),
        }
    }
}

fn items_response(n: usize) -> RawResponse {
    let list: Vec<_> = (0..n)
        .map(|id| json!({"vod_id": id, "vod_name": format!("title {id}")}))
        .collect();
    let body = json!({"code": 1, "page": "1", "pagecount": "3", "total": n, "list": list});
    RawResponse {
        status: 200,
        body: serde_json::to_vec(&body).unwrap(),
    }
}

pub fn host(key: &str) -> String {
    format!("{key}.example")
}

pub fn source(key: &str, enabled: bool, order: i64) -> Source {
    Source {
        key: key.into(),
        name: format!("Source {key}"),
        description: Some(format!("{key} mirror")),
        endpoint: format!("https://{}/api.php/provide/vod/", host(key)),
        enabled,
        order,
    }
}

pub fn snapshot(sources: Vec<Source>) -> Arc<SourceSnapshot> {
    Arc::new(SourceSnapshot::new(SnapshotOrigin::Local, sources).unwrap())
}

pub fn client(transport: Arc<ScriptedTransport>) -> Arc<UpstreamClient> {
    Arc::new(UpstreamClient::new(
        transport,
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        },
    ))
}
