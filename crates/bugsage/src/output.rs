//! Output formatting helpers for the `bugsage` CLI.
//!
//! JSON output, aligned tables, and the human-readable bug views.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use bugsage_core::bug::{BugDetail, BugSummary};
use bugsage_core::history::BugHistoryEntry;
use bugsage_ui::styles::{render_bold, render_category, render_muted, render_priority, render_status};
use bugsage_ui::terminal::terminal_width;

/// Print a value as pretty-printed JSON to stdout.
pub fn output_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize JSON")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    // Ignore broken pipe errors (e.g., piped to `head`)
    let _ = writeln!(handle, "{json}");
    Ok(())
}

/// Render a table with headers and rows. Column widths come from the data;
/// the last column is cut to the terminal width.
pub fn format_table(headers: &[&str], rows: &[Vec<String>], max_width: usize) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let used: usize = widths.iter().rev().skip(1).map(|w| w + 2).sum();
    if let Some(last) = widths.last_mut() {
        *last = (*last).min(max_width.saturating_sub(used).max(8));
    }

    let mut out = render_row(headers.iter().map(|h| (*h).to_string()), &widths);
    out.push_str(&render_row(widths.iter().map(|w| "-".repeat(*w)), &widths));
    for row in rows {
        out.push_str(&render_row(row.iter().cloned(), &widths));
    }
    out
}

fn render_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", truncate(&cell, width)))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}

/// Print a table to stdout. Nothing is printed for an empty row set.
pub fn output_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }
    print!("{}", format_table(headers, rows, terminal_width()));
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let kept: String = s.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}\u{2026}")
}

pub const BUG_HEADERS: &[&str] = &["ID", "Status", "Priority", "Assignee", "Project", "Title"];

/// Column values for [`output_table`].
pub fn format_bug_row(summary: &BugSummary) -> Vec<String> {
    let bug = &summary.bug;
    vec![
        bug.bug_id.to_string(),
        bug.status.to_string(),
        bug.priority.to_string(),
        summary.assignee_name.clone().unwrap_or_else(|| "-".into()),
        summary.project_name.clone().unwrap_or_else(|| "-".into()),
        bug.title.clone(),
    ]
}

fn format_timestamp(t: &chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}

/// One history entry as `when  who  field: old -> new`.
pub fn format_history_line(entry: &BugHistoryEntry) -> String {
    let who = entry
        .changed_by_name
        .clone()
        .unwrap_or_else(|| format!("user {}", entry.changed_by));
    format!(
        "{}  {}  {}: {} -> {}",
        format_timestamp(&entry.changed_at),
        who,
        entry.field_changed,
        entry.old_value.as_deref().unwrap_or("(none)"),
        entry.new_value.as_deref().unwrap_or("(none)"),
    )
}

/// Multi-line detail view with section headers.
pub fn format_bug_detail(detail: &BugDetail) -> String {
    let summary = &detail.summary;
    let bug = &summary.bug;
    let mut lines = vec![
        render_bold(&format!("#{} {}", bug.bug_id, bug.title)),
        format!(
            "Status: {}   Priority: {}",
            render_status(bug.status),
            render_priority(bug.priority)
        ),
        format!(
            "Reporter: {}   Assignee: {}   Project: {}",
            summary.reporter_name.as_deref().unwrap_or("-"),
            summary.assignee_name.as_deref().unwrap_or("-"),
            summary.project_name.as_deref().unwrap_or("-"),
        ),
        render_muted(&format!(
            "Created {}   Updated {}",
            format_timestamp(&bug.created_at),
            format_timestamp(&bug.updated_at)
        )),
        String::new(),
        render_category("Description"),
        bug.description.clone(),
    ];

    if !detail.comments.is_empty() {
        lines.push(String::new());
        lines.push(render_category(&format!("Comments ({})", detail.comments.len())));
        for c in &detail.comments {
            let who = c.user_name.clone().unwrap_or_else(|| format!("user {}", c.user_id));
            lines.push(format!(
                "{} {}",
                render_muted(&format!("[{}] {who}:", format_timestamp(&c.created_at))),
                c.comment
            ));
        }
    }

    if !detail.attachments.is_empty() {
        lines.push(String::new());
        lines.push(render_category("Attachments"));
        for a in &detail.attachments {
            lines.push(format!("{} ({} bytes) {}", a.filename, a.file_size, render_muted(&a.file_path)));
        }
    }

    if !detail.history.is_empty() {
        lines.push(String::new());
        lines.push(render_category("History"));
        lines.extend(detail.history.iter().map(format_history_line));
    }

    lines.join("\n")
}
