//! Source records: one configured upstream catalog provider.
//!
//! Persisted snapshots use the wire names `key`, `name`, `desc`, `url` and
//! `enabled`; `description` and `endpoint` are accepted as aliases. Records are
//! read leniently through [`SourceRecord`] because the layers they come from do
//! not agree on defaults (see [`EnabledPolicy`]).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured upstream catalog provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Source {
    /// Stable unique identifier. Never changes across reorder/toggle.
    pub key: String,
    /// Display label.
    pub name: String,
    /// Optional prose shown next to the name.
    #[serde(
        rename = "desc",
        alias = "description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Catalog endpoint the upstream client calls.
    #[serde(rename = "url", alias = "endpoint", default)]
    pub endpoint: String,
    /// Disabled sources are never dispatched to.
    #[serde(default)]
    pub enabled: bool,
    /// Display and aggregation rank. Lower sorts first.
    #[serde(default)]
    pub order: i64,
}

impl Source {
    /// Whether the endpoint looks like an absolute http(s) URL.
    #[must_use]
    pub fn has_endpoint(&self) -> bool {
        let endpoint = self.endpoint.trim();
        ["http://", "https://"].iter().any(|scheme| {
            endpoint
                .strip_prefix(scheme)
                .is_some_and(|rest| !rest.is_empty())
        })
    }

    /// Whether ordinary queries may dispatch to this source.
    ///
    /// A source without a key or endpoint stays visible to the config layer
    /// but is excluded here, before any call is attempted.
    #[must_use]
    pub fn is_dispatchable(&self) -> bool {
        self.enabled && !self.key.is_empty() && self.has_endpoint()
    }

    /// Project this source for the given audience.
    #[must_use]
    pub fn summary(&self, view: SourceView) -> SourceSummary {
        SourceSummary {
            key: self.key.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            endpoint: match view {
                SourceView::Full => Some(self.endpoint.clone()),
                SourceView::Public => None,
            },
            enabled: self.enabled,
            order: self.order,
        }
    }
}

/// How a missing or non-boolean `enabled` field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnabledPolicy {
    /// Only an explicit `true` enables. Used for the local layer.
    ExplicitTrue,
    /// Only an explicit `false` disables. Used for the shared layer, whose
    /// records often predate the `enabled` field.
    DefaultOn,
}

/// Loosely-typed source record as found in a persisted snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecord {
    pub key: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub endpoint: Option<String>,
    pub enabled: Option<bool>,
    pub order: Option<i64>,
}

impl SourceRecord {
    /// Read a record from a JSON value. Non-object values yield `None`.
    ///
    /// Strings and numbers are accepted for text fields; anything else is
    /// treated as absent. `enabled` is only ever `Some` for real booleans.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let text = |names: &[&str]| names.iter().find_map(|name| map.get(*name).and_then(as_text));

        Some(Self {
            key: text(&["key"]),
            name: text(&["name"]),
            description: text(&["desc", "description"]).filter(|d| !d.is_empty()),
            endpoint: text(&["url", "endpoint"]),
            enabled: map.get("enabled").and_then(Value::as_bool),
            order: map.get("order").and_then(as_order),
        })
    }

    /// Resolve the record into a [`Source`].
    ///
    /// `position` is the record's index in its snapshot and stands in for a
    /// missing `order`.
    #[must_use]
    pub fn into_source(self, position: usize, policy: EnabledPolicy) -> Source {
        let enabled = match policy {
            EnabledPolicy::ExplicitTrue => self.enabled == Some(true),
            EnabledPolicy::DefaultOn => self.enabled != Some(false),
        };
        Source {
            key: self.key.unwrap_or_default().trim().to_string(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            endpoint: self.endpoint.unwrap_or_default().trim().to_string(),
            enabled,
            order: self
                .order
                .unwrap_or_else(|| i64::try_from(position).unwrap_or(i64::MAX)),
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_order(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Audience a source list is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceView {
    /// Every source with every field, including disabled ones and endpoints.
    Full,
    /// Enabled sources only, endpoints withheld.
    Public,
}

/// A source as shown to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceSummary {
    pub key: String,
    pub name: String,
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "url", default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub enabled: bool,
    pub order: i64,
}
