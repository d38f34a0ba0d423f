//! Normalized catalog items.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upstream field carrying a record's native id.
pub const NATIVE_ID_FIELD: &str = "vod_id";

/// Upstream field carrying a record's display title.
pub const TITLE_FIELD: &str = "vod_name";

/// Field names reserved for attribution. Upstream records may not set them.
pub const ATTRIBUTION_FIELDS: [&str; 4] = ["uniqueId", "sourceKey", "sourceName", "sourceDesc"];

/// A catalog entry: upstream-native fields plus source attribution.
///
/// Two items from different sources are always distinct, even when their
/// native ids match; `unique_id` is `"{source_key}:{native_id}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    #[serde(rename = "sourceKey")]
    pub source_key: String,
    #[serde(rename = "sourceName")]
    pub source_name: String,
    #[serde(rename = "sourceDesc", default, skip_serializing_if = "Option::is_none")]
    pub source_description: Option<String>,
    /// Upstream fields, unchanged apart from removed attribution keys.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    /// Compose the global identifier for a native id within a source.
    #[must_use]
    pub fn unique_id_for(source_key: &str, native_id: &str) -> String {
        format!("{source_key}:{native_id}")
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.fields.get(TITLE_FIELD).and_then(Value::as_str)
    }
}

/// Read a record's native id. Numbers and non-blank strings qualify.
#[must_use]
pub fn native_id_of(fields: &Map<String, Value>) -> Option<String> {
    match fields.get(NATIVE_ID_FIELD)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Pagination metadata reported by an upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Pagination {
    pub page: u32,
    /// Total pages. Defaults to 1 when the upstream omits it.
    pub page_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_count: 1,
            limit: None,
            total: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn native_id_accepts_numbers_and_strings() {
        assert_eq!(native_id_of(&fields(json!({"vod_id": 42}))).as_deref(), Some("42"));
        assert_eq!(native_id_of(&fields(json!({"vod_id": " 7a "}))).as_deref(), Some("7a"));
        assert_eq!(native_id_of(&fields(json!({"vod_id": ""}))), None);
        assert_eq!(native_id_of(&fields(json!({"vod_id": null}))), None);
        assert_eq!(native_id_of(&fields(json!({"name": "x"}))), None);
    }

    #[test]
    fn item_serializes_flat_with_attribution() {
        let item = Item {
            unique_id: Item::unique_id_for("c", "9"),
            source_key: "c".into(),
            source_name: "Source C".into(),
            source_description: None,
            fields: fields(json!({"vod_id": 9, "vod_name": "Dune"})),
        };

        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["uniqueId"], "c:9");
        assert_eq!(json["sourceKey"], "c");
        assert_eq!(json["vod_name"], "Dune");
        assert!(json.get("sourceDesc").is_none());
        assert_eq!(item.title(), Some("Dune"));
    }
}
