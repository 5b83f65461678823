//! Columnar JSON transport for series, statistics and containers.
//!
//! NaN values are written as `null`; durations are integer nanoseconds.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::processing::statistics::{SpreadStats, SummaryStats};
use crate::state::container::SeriesContainer;
use crate::state::measurement::Status;
use crate::state::series::Series;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesJson {
    pub name: String,
    pub comment: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<Option<f64>>,
    pub status: Vec<Status>,
    /// Nanoseconds since the preceding record.
    pub delta_time_ns: Vec<i64>,
    pub delta_value: Vec<Option<f64>>,
    pub stats: StatsJson,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpreadJson {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsJson {
    pub len: usize,
    pub nan_count: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
    pub chron_mean: Option<DateTime<Utc>>,
    pub chron_median: Option<DateTime<Utc>>,
    pub value: Option<SpreadJson>,
    pub at_value_min: Option<DateTime<Utc>>,
    pub at_value_max: Option<DateTime<Utc>>,
    pub delta_time_min_ns: Option<i64>,
    pub delta_time_max_ns: Option<i64>,
    pub delta_time_mean_ns: Option<i64>,
    pub delta_time_median_ns: Option<i64>,
    pub delta_time_std_ns: Option<i64>,
    pub delta_value: Option<SpreadJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerJson {
    pub name: String,
    pub comment: String,
    pub series: BTreeMap<String, SeriesJson>,
}

fn finite(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

fn nanos(d: TimeDelta) -> i64 {
    d.num_nanoseconds().unwrap_or(i64::MAX)
}

impl From<&SpreadStats> for SpreadJson {
    fn from(s: &SpreadStats) -> Self {
        Self {
            count: s.count,
            min: s.min,
            max: s.max,
            mean: s.mean,
            median: s.median,
            std_dev: s.std_dev,
        }
    }
}

impl From<&SummaryStats> for StatsJson {
    fn from(s: &SummaryStats) -> Self {
        let dt = s.delta_time.as_ref();
        Self {
            len: s.len,
            nan_count: s.nan_count,
            first: s.first.map(|f| f.0),
            last: s.last.map(|l| l.0),
            chron_mean: s.chron_mean,
            chron_median: s.chron_median,
            value: s.value.as_ref().map(SpreadJson::from),
            at_value_min: s.at_value_min,
            at_value_max: s.at_value_max,
            delta_time_min_ns: dt.map(|d| nanos(d.min)),
            delta_time_max_ns: dt.map(|d| nanos(d.max)),
            delta_time_mean_ns: dt.map(|d| nanos(d.mean)),
            delta_time_median_ns: dt.map(|d| nanos(d.median)),
            delta_time_std_ns: dt.map(|d| nanos(d.std_dev)),
            delta_value: s.delta_value.as_ref().map(SpreadJson::from),
        }
    }
}

impl From<&Series> for SeriesJson {
    fn from(series: &Series) -> Self {
        Self {
            name: series.name.clone(),
            comment: series.comment.clone(),
            timestamps: series.timestamps(),
            values: series.iter().map(|m| finite(m.value)).collect(),
            status: series.iter().map(|m| m.status).collect(),
            delta_time_ns: series.iter().map(|m| nanos(m.delta_time)).collect(),
            delta_value: series.iter().map(|m| finite(m.delta_value)).collect(),
            stats: StatsJson::from(&series.stats),
        }
    }
}

impl From<&SeriesContainer> for ContainerJson {
    fn from(c: &SeriesContainer) -> Self {
        Self {
            name: c.name.clone(),
            comment: c.comment.clone(),
            series: c
                .iter()
                .map(|(key, s)| (key.clone(), SeriesJson::from(s)))
                .collect(),
        }
    }
}

impl Series {
    /// Columnar JSON document for this series.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(&SeriesJson::from(self))?)
    }
}
