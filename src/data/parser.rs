use std::collections::HashMap;

/// Rows inspected when looking for the header.
pub const HEADER_SCAN_ROWS: usize = 50;

/// Detect the header row among the first `max_rows` rows.
///
/// Scans bottom-up for a row of the most common width whose cells are all
/// non-empty text that is neither a number nor a date. Returns `None` when the
/// table has no such row.
pub fn detect_header_row(rows: &[Vec<String>], max_rows: usize) -> Option<usize> {
    let rows = &rows[..rows.len().min(max_rows)];
    if rows.is_empty() {
        return None;
    }

    // Find most common column count
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in rows {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let most_common = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)?;

    (0..rows.len()).rev().find(|&i| {
        let row = &rows[i];
        row.len() == most_common
            && row.iter().all(|cell| {
                let trimmed = cell.trim();
                !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
            })
    })
}

/// Drop preamble lines above the header row, if one was found.
pub fn strip_preamble(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    if let Some(header) = detect_header_row(&rows, HEADER_SCAN_ROWS) {
        if header > 0 {
            tracing::debug!(skipped = header, "dropping preamble rows above header");
            rows.drain(..header);
        }
    }
    rows
}

fn is_date_like(s: &str) -> bool {
    let has_separators = s.contains('/') || s.contains(':') || s.contains('-');
    if !has_separators {
        return false;
    }
    crate::data::datetime::detect_date_format(&[s]).is_some()
}
