use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};
use crate::processing::partition::Partition;
use crate::processing::regularize::RegularizeParams;
use crate::state::series::Series;

/// Outlier rejection step of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum OutlierMethod {
    /// Keep everything; only records already flagged are set aside.
    None,
    Bounds { low: f64, high: f64 },
    Percentile { p: f64 },
    Zscore { level: f64 },
    Peirce,
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::Zscore { level: 3.0 }
    }
}

impl OutlierMethod {
    pub fn apply(&self, series: &Series) -> Result<Partition> {
        match *self {
            OutlierMethod::None => Ok(series.split_by_status()),
            OutlierMethod::Bounds { low, high } => Ok(series.reject_outside(low, high)),
            OutlierMethod::Percentile { p } => series.percentile_fencing(p),
            OutlierMethod::Zscore { level } => series.zscore_fencing(level),
            OutlierMethod::Peirce => series.peirce(),
        }
    }
}

/// One cleaning step followed by an optional resampling step, read from
/// JSON such as
/// `{"outliers": {"method": "zscore", "level": 3.0},
///   "regularize": {"period": 30, "unit": "s", "aggregation": "mean"}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub outliers: OutlierMethod,
    #[serde(default)]
    pub regularize: Option<RegularizeParams>,
}

/// Series produced by [`PipelineConfig::run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub kept: Series,
    pub rejected: Series,
    pub regular: Option<Series>,
}

impl PipelineConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| SeriesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        if let Some(params) = &config.regularize {
            params.validate()?;
        }
        Ok(config)
    }

    /// Clean `series`, then resample the kept records when a regularization
    /// step is configured.
    pub fn run(&self, series: &Series) -> Result<PipelineOutput> {
        let (mut kept, mut rejected) = self.outliers.apply(series)?.into_parts();
        kept.refresh_stats();
        rejected.refresh_stats();

        let regular = match &self.regularize {
            Some(params) => {
                let mut regular = kept.regularize(params)?;
                regular.refresh_stats();
                Some(regular)
            }
            None => None,
        };

        tracing::info!(
            series = %series.name,
            kept = kept.len(),
            rejected = rejected.len(),
            regular = regular.as_ref().map_or(0, |r| r.len()),
            "pipeline finished"
        );
        Ok(PipelineOutput {
            kept,
            rejected,
            regular,
        })
    }
}
