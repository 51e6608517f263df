//! Renders query results as an aligned text table for the model to read.
//!
//! ```text
//! Query executed successfully. Returned 3 rows.
//! Execution time: 2ms
//!
//! ArtistId | Name
//! ---------+----------
//! 1        | AC/DC
//! 2        | Accept
//! 3        | Aerosmith
//! ```

use super::executor::QueryResult;
use serde_json::Value;

pub const MAX_DISPLAY_ROWS: usize = 20;
pub const MAX_CELL_CHARS: usize = 50;

pub fn format_query_result(result: &QueryResult) -> String {
    if result.row_count == 0 {
        return "Query executed successfully but returned no rows.".to_string();
    }

    let mut output = format!(
        "Query executed successfully. Returned {} rows",
        result.row_count
    );
    if result.truncated {
        output.push_str(" (more rows available, raise the limit or narrow the query)");
    }
    output.push_str(&format!(
        ".\nExecution time: {}ms\n\n",
        result.execution_time_ms
    ));

    if result.columns.is_empty() {
        return output;
    }

    let shown: Vec<Vec<String>> = result
        .rows
        .iter()
        .take(MAX_DISPLAY_ROWS)
        .map(|row| row.iter().map(format_cell_value).collect())
        .collect();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.chars().count()).collect();
    for row in &shown {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(col, &width)| pad(col, width))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|&width| "-".repeat(width)).collect();
    output.push_str(&separator.join("-+-"));
    output.push('\n');

    for row in &shown {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| pad(cell, width))
            .collect();
        output.push_str(cells.join(" | ").trim_end());
        output.push('\n');
    }

    if result.row_count > MAX_DISPLAY_ROWS {
        output.push_str(&format!(
            "\n... and {} more rows",
            result.row_count - MAX_DISPLAY_ROWS
        ));
    }

    output
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn format_cell_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) if s.chars().count() > MAX_CELL_CHARS => {
            let head: String = s.chars().take(MAX_CELL_CHARS - 3).collect();
            format!("{}...", head)
        }
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => value.to_string(),
    }
}
