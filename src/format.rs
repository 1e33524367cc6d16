//! Pipe-delimited rendering of query results.
//!
//! Output is bounded because it is read by an agent with a limited context
//! window; rows past the cap are counted, not shown.

/// Reply for a query that returned no rows.
pub const NO_RESULTS: &str = "No results. Rework the query and try again.";

/// Render `rows` under `columns` as a Markdown-style pipe table.
///
/// At most `max_rows` rows are rendered. When more were returned, a
/// trailing note (separated by a blank line) states how many were omitted.
#[must_use]
pub fn render_table(columns: &[String], rows: &[Vec<String>], max_rows: usize) -> String {
    if rows.is_empty() {
        return NO_RESULTS.to_owned();
    }

    let shown = rows.len().min(max_rows);
    let mut lines = Vec::with_capacity(shown + 3);

    if !columns.is_empty() {
        lines.push(format!("| {} |", columns.join(" | ")));
        lines.push(format!("|{}", "---|".repeat(columns.len())));
    }

    lines.extend(
        rows.iter()
            .take(max_rows)
            .map(|row| format!("| {} |", row.join(" | "))),
    );

    if rows.len() > max_rows {
        lines.push(format!("\n{}", omitted_note(rows.len() - max_rows)));
    }

    lines.join("\n")
}

/// Trailing note for rows cut by the cap.
#[must_use]
pub fn omitted_note(omitted: usize) -> String {
    format!("Note: too many results, {omitted} more rows omitted. Narrow the query to see them.")
}
