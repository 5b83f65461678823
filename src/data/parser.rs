use std::collections::HashMap;

use crate::data::datetime::is_date_like;

/// Detect the header row among the first `max_lines` raw rows.
/// Returns the 0-based row index of the header row, or `None` when the file
/// starts directly with data.
pub fn detect_header_row(rows: &[Vec<String>], max_lines: usize) -> Option<usize> {
    let rows: Vec<(usize, &Vec<String>)> = rows
        .iter()
        .enumerate()
        .take(max_lines)
        .filter(|(_, r)| !r.is_empty())
        .collect();
    if rows.is_empty() {
        return None;
    }

    // Most common column count
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for (_, row) in &rows {
        *counts.entry(row.len()).or_insert(0) += 1;
    }
    let most_common = counts
        .into_iter()
        .max_by_key(|&(len, c)| (c, len))
        .map(|(len, _)| len)
        .unwrap_or(0);

    // The header sits above the first row holding a number or a date; text
    // rows further down (error markers and the like) are data.
    let first_data = rows
        .iter()
        .position(|(_, row)| has_data_cell(row))
        .unwrap_or(rows.len());

    rows[..first_data]
        .iter()
        .rev()
        .find(|(_, row)| row.len() == most_common && is_text_row(row))
        .map(|(i, _)| *i)
}

fn has_data_cell(row: &[String]) -> bool {
    row.iter().any(|cell| {
        let trimmed = cell.trim();
        trimmed.parse::<f64>().is_ok() || is_date_like(trimmed)
    })
}

fn is_text_row(row: &[String]) -> bool {
    row.iter().all(|cell| {
        let trimmed = cell.trim();
        !trimmed.is_empty() && trimmed.parse::<f64>().is_err() && !is_date_like(trimmed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn finds_header_below_preamble() {
        let r = rows(&[
            &["logger export"],
            &["time", "temp"],
            &["2025-01-01 00:00:00", "1.5"],
            &["2025-01-01 00:01:00", "1.7"],
        ]);
        assert_eq!(detect_header_row(&r, 50), Some(1));
    }

    #[test]
    fn text_rows_inside_the_data_are_not_headers() {
        let r = rows(&[
            &["time", "flow"],
            &["2025-01-01 00:00:00", "1.5"],
            &["2025-01-01 00:01:00", "1.7"],
            &["ERR", "ERR"],
            &["2025-01-01 00:03:00", "1.9"],
        ]);
        assert_eq!(detect_header_row(&r, 50), Some(0));
    }

    #[test]
    fn headerless_file() {
        let r = rows(&[&["2025-01-01 00:00:00", "1.5"], &["2025-01-01 00:01:00", "1.7"]]);
        assert_eq!(detect_header_row(&r, 50), None);
    }
}
