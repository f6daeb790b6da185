//! History page rendering

use std::{fs, io, path::Path};

use tracing::info;

use crate::{tracking::ProjectRecord, utils::format_duration};

const TEMPLATE: &str = include_str!("../../assets/history.html");
const TABLE_MARKER: &str = r#"<tbody id="projectTable">"#;

/// Render the history page for `records`, one row per project.
pub fn render_history(records: &[ProjectRecord]) -> String {
    let rows: String = if records.is_empty() {
        "\n            <tr><td colspan=\"2\"><p class=\"empty\">No tracked projects yet.</p></td></tr>"
            .to_string()
    } else {
        records
            .iter()
            .map(|record| {
                format!(
                    "\n            <tr><td>{}</td><td class=\"duration\">{}</td></tr>",
                    escape_html(&record.project_id),
                    format_duration(record.total_seconds)
                )
            })
            .collect()
    };

    TEMPLATE.replacen(TABLE_MARKER, &format!("{TABLE_MARKER}{rows}"), 1)
}

/// Write the rendered page to `path`.
pub fn write_history(path: &Path, records: &[ProjectRecord]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_history(records))?;
    info!("History written to {}", path.display());
    Ok(())
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
