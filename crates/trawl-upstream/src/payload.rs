//! Decoding of the catalog JSON payload.
//!
//! Sources answer with `{"list": [...], "page": .., "pagecount": .., "limit": .., "total": ..}`.
//! Pagination numbers arrive as numbers or numeric strings depending on the
//! source; anything unreadable falls back to the defaults.

use serde_json::{Map, Value};
use trawl_core::Pagination;

/// Records and pagination decoded from one successful response.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpstreamPage {
    /// Raw record objects in upstream order. Non-object entries are skipped.
    pub records: Vec<Map<String, Value>>,
    /// `page.page` is 1 when the upstream omits it; this keeps what was sent.
    pub pagination: Pagination,
    /// The page number exactly as reported, if any.
    pub reported_page: Option<u32>,
}

impl UpstreamPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decode a 2xx body. `Err` carries a reason for a `BadPayload` outcome.
pub(crate) fn decode(body: &[u8]) -> Result<UpstreamPage, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    let Value::Object(root) = value else {
        return Err("payload is not a JSON object".to_string());
    };

    let records = match root.get("list") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| entry.as_object().cloned())
            .collect(),
        Some(_) => return Err("`list` is not an array".to_string()),
    };

    let defaults = Pagination::default();
    let reported_page = read_u32(&root, "page").filter(|p| *p > 0);
    let pagination = Pagination {
        page: reported_page.unwrap_or(defaults.page),
        page_count: read_u32(&root, "pagecount")
            .filter(|p| *p > 0)
            .unwrap_or(defaults.page_count),
        limit: read_u32(&root, "limit"),
        total: read_u64(&root, "total"),
    };

    Ok(UpstreamPage {
        records,
        pagination,
        reported_page,
    })
}

fn read_u64(root: &Map<String, Value>, field: &str) -> Option<u64> {
    match root.get(field)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_u32(root: &Map<String, Value>, field: &str) -> Option<u32> {
    read_u64(root, field).and_then(|n| u32::try_from(n).ok())
}
