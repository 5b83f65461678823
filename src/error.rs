use std::path::PathBuf;

/// Errors raised while building, cleaning or resampling a series.
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    #[error("{operation}: input is empty")]
    EmptyInput { operation: &'static str },

    #[error("parameter `{name}` out of range ({value}): {reason}")]
    OutOfRangeParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("critical-ratio table has no entry for row {row}, suspect {suspects}")]
    TableBoundsExceeded { row: i64, suspects: usize },

    #[error("timestamp out of representable range: {0}")]
    Timestamp(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Load(String),
}

impl SeriesError {
    pub(crate) fn empty(operation: &'static str) -> Self {
        SeriesError::EmptyInput { operation }
    }

    pub(crate) fn out_of_range(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        SeriesError::OutOfRangeParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeriesError>;
