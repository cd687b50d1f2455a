//! Rendering of coverage diffs
//!
//! - Markdown (pull request comments)
//! - Colored console table
//! - JSON

use anyhow::Result;
use colored::Colorize;

use crate::coverage::{CoverageDelta, FileCoverageDiff};

pub const NO_DIFFERENCES: &str = "No differences";

/// Options for the markdown report
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Root the delta badges are served from; no badges when `None`
    pub badge_base_url: Option<String>,
    /// Prefix stripped from filenames
    pub workspace: Option<String>,
}

/// Truncate to one decimal toward zero
pub fn truncate_percentage(n: f64) -> f64 {
    let truncated = n.signum() * ((n.abs() * 10.0).trunc() / 10.0);
    if truncated == 0.0 {
        // avoid rendering "-0"
        0.0
    } else {
        truncated
    }
}

/// URL of the badge showing the change from `from` to `to`
pub fn badge_url(base_url: &str, from: f64, to: f64) -> String {
    let base_url = base_url.trim_end_matches('/');
    let diff = truncate_percentage(to - from).abs();
    if diff == 0.0 {
        return format!("{}/0.svg", base_url);
    }

    let dir = if to < from { "down" } else { "up" };
    let tenths = (diff * 10.0).round() as u64;
    let (n, m) = (tenths / 10, tenths % 10);
    format!("{}/{}/{}/{}.{}.svg", base_url, dir, n, n, m)
}

/// Render one metric cell, e.g. `NEW 80%` or ` 90% ![10%](...)`
pub fn format_delta(delta: &CoverageDelta, badge_base_url: Option<&str>) -> String {
    let mut cell = String::new();

    if delta.is_added() {
        cell.push_str("NEW");
    } else if delta.is_removed() {
        cell.push_str("DELETE");
    }

    if let Some(to) = delta.to {
        cell.push_str(&format!(" {}%", truncate_percentage(to)));
    }

    if let (Some(from), Some(to), Some(base_url)) = (delta.from, delta.to, badge_base_url) {
        cell.push_str(&format!(
            " ![{}%]({})",
            truncate_percentage(to - from),
            badge_url(base_url, from, to)
        ));
    }

    cell
}

/// Strip `"{workspace}/"` from the start of `filename`
pub fn trim_workspace_path<'a>(filename: &'a str, workspace: Option<&str>) -> &'a str {
    let Some(workspace) = workspace else {
        return filename;
    };

    let prefix = format!("{}/", workspace.trim_end_matches('/'));
    filename.strip_prefix(prefix.as_str()).unwrap_or(filename)
}

/// Render the diff as a markdown comment body
pub fn render_markdown(diffs: &[FileCoverageDiff], options: &ReportOptions) -> String {
    let content = if diffs.is_empty() {
        NO_DIFFERENCES.to_string()
    } else {
        let badge_base_url = options.badge_base_url.as_deref();
        let rows: Vec<[String; 3]> = diffs
            .iter()
            .map(|d| {
                [
                    trim_workspace_path(&d.filename, options.workspace.as_deref()).to_string(),
                    format_delta(&d.lines, badge_base_url),
                    format_delta(&d.branches, badge_base_url),
                ]
            })
            .collect();
        markdown_table(["Filename", "Lines", "Branches"], &rows)
    };

    format!("## Coverage difference\n{}\n", content)
}

fn markdown_table(header: [&str; 3], rows: &[[String; 3]]) -> String {
    let mut widths = header.map(|h| h.chars().count().max(3));
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: [&str; 3]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        format!("| {} |", padded.join(" | "))
    };

    let mut lines = vec![format_row(header)];
    lines.push(format!(
        "| {} |",
        widths.map(|w| "-".repeat(w)).join(" | ")
    ));
    for row in rows {
        lines.push(format_row([row[0].as_str(), row[1].as_str(), row[2].as_str()]));
    }

    lines.join("\n")
}

/// Render the diff as JSON
pub fn render_json(diffs: &[FileCoverageDiff]) -> Result<String> {
    Ok(serde_json::to_string_pretty(diffs)?)
}

/// Render the diff as a colored table for the terminal
pub fn render_console(diffs: &[FileCoverageDiff], workspace: Option<&str>) -> String {
    let mut lines = vec!["Coverage difference".bold().to_string()];

    if diffs.is_empty() {
        lines.push(format!("  {}", NO_DIFFERENCES.dimmed()));
        return lines.join("\n");
    }

    let name_width = diffs
        .iter()
        .map(|d| trim_workspace_path(&d.filename, workspace).chars().count())
        .max()
        .unwrap_or(0)
        .max("Filename".len());

    lines.push(format!(
        "  {}  {}  {}",
        pad("Filename".dimmed().to_string(), name_width),
        pad("Lines".dimmed().to_string(), CELL_WIDTH),
        "Branches".dimmed()
    ));

    for d in diffs {
        lines.push(format!(
            "  {}  {}  {}",
            pad(trim_workspace_path(&d.filename, workspace).to_string(), name_width),
            pad(console_cell(&d.lines), CELL_WIDTH),
            console_cell(&d.branches)
        ));
    }

    lines.join("\n")
}

const CELL_WIDTH: usize = 22;

fn console_cell(delta: &CoverageDelta) -> String {
    match (delta.from, delta.to) {
        (None, Some(to)) => format!("{} {}%", "NEW".cyan(), truncate_percentage(to)),
        (Some(from), None) => format!("{} {}%", "DELETE".magenta(), truncate_percentage(from)),
        (Some(from), Some(to)) => {
            // the arrow follows the displayed change, like the badge does
            let change = truncate_percentage(to - from);
            let indicator = if change > 0.0 {
                format!("↑ +{}%", change).green()
            } else if change < 0.0 {
                format!("↓ {}%", change).red()
            } else {
                "→".dimmed()
            };
            format!("{}% {}", truncate_percentage(to), indicator)
        }
        (None, None) => String::new(),
    }
}

/// Pad to `width` visible characters
fn pad(text: String, width: usize) -> String {
    let padding = width.saturating_sub(visible_width(&text));
    format!("{}{}", text, " ".repeat(padding))
}

/// Count of visible characters, skipping ANSI escape sequences
fn visible_width(text: &str) -> usize {
    let mut count = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => count += 1,
        }
    }
    count
}
