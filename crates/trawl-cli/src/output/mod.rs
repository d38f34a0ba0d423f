use serde::Serialize;
use serde_json::Value;
use trawl_core::Item;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(render_value_table(&serde_json::to_value(value)?)),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(value, format)?);
    Ok(())
}

/// Print to stderr unless `--quiet` is set. Keeps stdout machine-readable.
pub fn notice(message: &str) {
    if !ui::prefs().quiet {
        eprintln!("{message}");
    }
}

/// Compact per-item row used by table output of listings and searches.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ItemRow {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub note: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        let field = |name: &str| item.fields.get(name).map_or_else(String::new, value_to_cell);
        Self {
            id: item.unique_id.clone(),
            title: item.title().unwrap_or_default().to_string(),
            kind: field("type_name"),
            note: field("vod_remarks"),
        }
    }
}

fn options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_value_table(value: &Value) -> String {
    match value {
        Value::Array(items) => render_rows(items),
        Value::Object(map) => {
            let rows = map
                .iter()
                .map(|(key, value)| vec![key.clone(), value_to_cell(value)])
                .collect::<Vec<_>>();
            table::render_table(&["field", "value"], &rows, options())
        }
        scalar => value_to_cell(scalar),
    }
}

/// Objects become one row each, columns in first-seen key order.
fn render_rows(items: &[Value]) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    let mut headers: Vec<&str> = Vec::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(&key.as_str()) {
                headers.push(key);
            }
        }
    }
    if headers.is_empty() {
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_table(&["value"], &rows, options());
    }

    let rows = items
        .iter()
        .map(|item| {
            headers
                .iter()
                .map(|header| {
                    item.get(header)
                        .map_or_else(|| String::from("-"), value_to_cell)
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    table::render_table(&headers, &rows, options())
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(text) => text.clone(),
        Value::Array(values) if values.iter().all(|value| !value.is_object()) => values
            .iter()
            .map(value_to_cell)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
