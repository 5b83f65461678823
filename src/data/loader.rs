use std::path::Path;

use crate::data::datetime::{detect_date_format, parse_timestamp};
use crate::data::parser;
use crate::error::{Result, SeriesError};
use crate::state::measurement::{Measurement, Status};
use crate::state::series::Series;

/// Raw text content of a data file: column names and column-major cells.
#[derive(Debug)]
pub struct LoadedData {
    pub columns: Vec<String>,
    pub column_data: Vec<Vec<String>>, // column-major: column_data[col_idx][row_idx]
    pub row_count: usize,
}

/// Load a CSV or Excel file and return the column names and raw string data.
pub fn load_file(path: &Path) -> Result<LoadedData> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "csv" | "txt" => read_csv_rows(path)?,
        "xls" | "xlsx" | "ods" => read_excel_rows(path)?,
        _ => return Err(SeriesError::Load(format!("Unsupported file format: .{ext}"))),
    };
    tracing::info!(path = %path.display(), rows = rows.len(), "read data file");
    columnize(rows)
}

fn read_csv_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read(path).map_err(|source| SeriesError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    // Fallback: treat as latin1 (each byte maps to same Unicode code point)
    let text = String::from_utf8(content)
        .unwrap_or_else(|e| e.into_bytes().iter().map(|&b| b as char).collect());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

fn read_excel_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    use calamine::{open_workbook_auto, Data, Reader};

    let mut workbook =
        open_workbook_auto(path).map_err(|e| SeriesError::Excel(format!("Cannot open file: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SeriesError::Excel("No sheets found".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| SeriesError::Excel(format!("Cannot read sheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    Data::String(s) => s.clone(),
                    Data::Float(f) => f.to_string(),
                    Data::Int(i) => i.to_string(),
                    Data::Bool(b) => b.to_string(),
                    Data::DateTime(dt) => dt
                        .as_datetime()
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S%.f").to_string())
                        .unwrap_or_else(|| dt.as_f64().to_string()),
                    Data::DateTimeIso(s) => s.clone(),
                    Data::DurationIso(s) => s.clone(),
                    Data::Error(e) => format!("{e:?}"),
                })
                .collect()
        })
        .collect())
}

/// Turn raw rows into named columns. Files without a detectable header get
/// positional names (`column_0`, `column_1`, ...).
pub fn columnize(all_rows: Vec<Vec<String>>) -> Result<LoadedData> {
    let (columns, data_rows): (Vec<String>, &[Vec<String>]) =
        match parser::detect_header_row(&all_rows, 50) {
            Some(h) => (
                all_rows[h].iter().map(|s| s.trim().to_string()).collect(),
                &all_rows[h + 1..],
            ),
            None => {
                let width = all_rows.iter().map(|r| r.len()).max().unwrap_or(0);
                ((0..width).map(|i| format!("column_{i}")).collect(), &all_rows[..])
            }
        };

    if columns.is_empty() || data_rows.is_empty() {
        return Err(SeriesError::Load(
            "No data found after header detection".to_string(),
        ));
    }

    let num_cols = columns.len();
    let mut column_data: Vec<Vec<String>> = vec![Vec::new(); num_cols];
    let row_count = data_rows.len();

    for row in data_rows {
        for (col_idx, col_data) in column_data.iter_mut().enumerate() {
            col_data.push(row.get(col_idx).cloned().unwrap_or_default());
        }
    }

    Ok(LoadedData {
        columns,
        column_data,
        row_count,
    })
}

impl LoadedData {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Build a series from a timestamp column and a value column.
    ///
    /// Rows whose timestamp cannot be parsed are skipped. Values that are
    /// not numbers become NaN records with status Missing.
    pub fn to_series(&self, name: &str, time_col: usize, value_col: usize) -> Result<Series> {
        let times = self.column_data.get(time_col).ok_or_else(|| {
            SeriesError::Load(format!("No timestamp column at index {time_col}"))
        })?;
        let values = self
            .column_data
            .get(value_col)
            .ok_or_else(|| SeriesError::Load(format!("No value column at index {value_col}")))?;

        let format = detect_date_format(times).ok_or_else(|| {
            SeriesError::Load(format!(
                "Column '{}' does not hold timestamps",
                self.columns[time_col]
            ))
        })?;

        let mut series = Series::new(name);
        let mut skipped = 0usize;
        for (raw_time, raw_value) in times.iter().zip(values) {
            let Some(timestamp) = parse_timestamp(raw_time, format) else {
                skipped += 1;
                continue;
            };
            let m = match raw_value.trim().parse::<f64>() {
                Ok(v) if !v.is_nan() => Measurement::new(timestamp, v),
                _ => Measurement::with_status(timestamp, f64::NAN, Status::Missing),
            };
            series.push(m);
        }

        if skipped > 0 {
            tracing::warn!(series = name, skipped, "rows with unparseable timestamps skipped");
        }
        if series.is_empty() {
            return Err(SeriesError::Load("No rows with a valid timestamp".to_string()));
        }
        Ok(series)
    }
}

/// Load `path` and build a series from its first two columns, named after
/// the value column.
pub fn load_series(path: &Path) -> Result<Series> {
    let data = load_file(path)?;
    if data.columns.len() < 2 {
        return Err(SeriesError::Load(
            "Expected a timestamp column and a value column".to_string(),
        ));
    }
    let name = data.columns[1].clone();
    data.to_series(&name, 0, 1)
}
