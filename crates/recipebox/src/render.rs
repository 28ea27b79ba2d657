//! Terminal rendering for recipes, sources and cache status
//!
//! Rendering functions return strings; `main` decides where they go.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use recipebox_core::{Record, SourceList};
use serde_json::Value;
use std::path::Path;

const UNTITLED: &str = "(untitled)";

/// Render one card per record.
///
/// `None` means loading failed upstream; nothing is rendered in that case.
pub fn render_records(records: Option<&[Record]>, json: bool, no_color: bool) -> Option<String> {
    let records = records?;

    if json {
        return Some(serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string()));
    }

    if records.is_empty() {
        return Some("No recipes.".to_string());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if no_color {
        table.set_header(vec!["#", "Title", "Fields", "Preview"]);
    } else {
        table.set_header(vec![
            Cell::new("#").fg(Color::Cyan),
            Cell::new("Title").fg(Color::Cyan),
            Cell::new("Fields").fg(Color::Cyan),
            Cell::new("Preview").fg(Color::Cyan),
        ]);
    }

    for (index, record) in records.iter().enumerate() {
        let position = (index + 1).to_string();
        let title = truncate(record.display_title().unwrap_or(UNTITLED), 50);
        let fields = field_count(record.as_value());
        let preview = truncate(&record.as_value().to_string(), 40);

        table.add_row(Row::from(vec![position, title, fields, preview]));
    }

    Some(table.to_string())
}

/// Numbered list of configured locators
pub fn format_sources(sources: &SourceList) -> String {
    if sources.is_empty() {
        return "No sources configured.".to_string();
    }

    sources
        .iter()
        .enumerate()
        .map(|(i, locator)| format!("{:>3}. {}", i + 1, locator))
        .collect::<Vec<_>>()
        .join("\n")
}

/// State of the cache slot as seen by `status`
#[derive(Debug)]
pub enum CacheStatus {
    Absent,
    Present { records: usize },
    Malformed { reason: String },
}

pub fn format_status(key: &str, path: &Path, sources: usize, status: &CacheStatus) -> String {
    let state = match status {
        CacheStatus::Absent => "absent (next run fetches all sources)".to_string(),
        CacheStatus::Present { records } => format!("present ({} records)", records),
        CacheStatus::Malformed { reason } => format!("malformed ({})", reason),
    };

    [
        format!("Cache key:   {}", key),
        format!("Cache file:  {}", path.display()),
        format!("Sources:     {}", sources),
        format!("Cache:       {}", state),
    ]
    .join("\n")
}

fn field_count(value: &Value) -> String {
    match value {
        Value::Object(map) => map.len().to_string(),
        _ => "-".to_string(),
    }
}

/// Truncate to `max` characters, appending "..." when cut
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
