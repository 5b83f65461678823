use std::fmt;

use chrono::{DateTime, TimeDelta, Timelike, Utc};

use crate::data::datetime::format_timestamp;
use crate::processing::statistics::SummaryStats;
use crate::state::measurement::{Measurement, Status};

/// An ordered collection of measurements plus its cached summary.
///
/// Chronological order is a precondition for delta computation and
/// resampling; cleaning operations never reorder the receiver. Cloning a
/// series copies every record, so derived series never share storage.
#[derive(Debug, Clone, Default)]
pub struct Series {
    pub name: String,
    pub comment: String,
    pub points: Vec<Measurement>,
    pub stats: SummaryStats,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_points(name: impl Into<String>, points: Vec<Measurement>) -> Self {
        Self {
            name: name.into(),
            points,
            ..Default::default()
        }
    }

    /// Append a valid observation.
    pub fn add(&mut self, timestamp: DateTime<Utc>, value: f64) {
        self.points.push(Measurement::new(timestamp, value));
    }

    pub fn add_with_status(&mut self, timestamp: DateTime<Utc>, value: f64, status: Status) {
        self.points.push(Measurement::with_status(timestamp, value, status));
    }

    pub fn push(&mut self, measurement: Measurement) {
        self.points.push(measurement);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.points.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|m| m.value).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|m| m.timestamp).collect()
    }

    /// Values of records with status OK and a real number.
    pub fn usable_values(&self) -> Vec<f64> {
        self.points
            .iter()
            .filter(|m| m.is_usable())
            .map(|m| m.value)
            .collect()
    }

    pub fn is_chrono_sorted(&self) -> bool {
        self.points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
    }

    // In-place sorts are stable: equal keys keep their relative order.

    pub fn sort_chrono_asc(&mut self) {
        self.points.sort_by_key(|m| m.timestamp);
    }

    pub fn sort_chrono_desc(&mut self) {
        self.points.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    pub fn sort_value_asc(&mut self) {
        self.points.sort_by(|a, b| a.value.total_cmp(&b.value));
    }

    pub fn sort_value_desc(&mut self) {
        self.points.sort_by(|a, b| b.value.total_cmp(&a.value));
    }

    /// Drop every record, keeping name and comment.
    pub fn clear(&mut self) {
        self.points.clear();
        self.stats = SummaryStats::default();
    }

    /// Keep at most the first `limit` records.
    pub fn limit_size(&mut self, limit: usize) {
        self.points.truncate(limit);
    }

    /// Fill `delta_time` / `delta_value` from each record's predecessor in
    /// the current order. The first record gets a zero duration and a NaN
    /// value delta.
    pub fn compute_deltas(&mut self) {
        let mut prev: Option<(DateTime<Utc>, f64)> = None;
        for m in &mut self.points {
            match prev {
                Some((t, v)) => {
                    m.delta_time = m.timestamp - t;
                    m.delta_value = m.value - v;
                }
                None => {
                    m.delta_time = TimeDelta::zero();
                    m.delta_value = f64::NAN;
                }
            }
            prev = Some((m.timestamp, m.value));
        }
    }

    /// Sort chronologically, fill deltas and recompute the summary.
    pub fn refresh_stats(&mut self) {
        self.sort_chrono_asc();
        self.compute_deltas();
        self.stats = SummaryStats::compute(&self.points);
        self.comment = if self.points.is_empty() {
            "Warning: Empty Time Series".to_string()
        } else {
            "Time Series ok.".to_string()
        };
        tracing::debug!(
            series = %self.name,
            len = self.stats.len,
            nan = self.stats.nan_count,
            "refreshed series statistics"
        );
    }

    /// Independent copy with freshly computed statistics.
    pub fn deep_copy(&self) -> Series {
        let mut copy = self.clone();
        copy.refresh_stats();
        copy
    }

    /// Mean of usable values per hour of day (UTC); `None` for hours
    /// without data.
    pub fn hourly_mean(&self) -> [Option<f64>; 24] {
        let mut sums = [0.0f64; 24];
        let mut counts = [0usize; 24];
        for m in self.points.iter().filter(|m| m.is_usable()) {
            let h = m.timestamp.hour() as usize;
            sums[h] += m.value;
            counts[h] += 1;
        }
        let mut out = [None; 24];
        for h in 0..24 {
            if counts[h] > 0 {
                out[h] = Some(sums[h] / counts[h] as f64);
            }
        }
        out
    }

    /// Empty series carrying a derived name.
    pub(crate) fn derived(&self, suffix: &str) -> Series {
        Series::new(format!("{} {}", self.name, suffix))
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        if !self.comment.is_empty() {
            writeln!(f, "Comment: {}", self.comment)?;
        }
        writeln!(
            f,
            "{:>6} | {:>23} | {:>14} | {:>14} | {:>14} | {:>8}",
            "index", "timestamp", "value", "delta time", "delta value", "status"
        )?;
        writeln!(f, "{}", "-".repeat(95))?;
        for (i, m) in self.points.iter().enumerate() {
            let (dt, dv) = if i == 0 {
                (String::new(), String::new())
            } else {
                (m.delta_time.to_string(), format!("{:.4}", m.delta_value))
            };
            writeln!(
                f,
                "{:>6} | {:>23} | {:>14.4} | {:>14} | {:>14} | {:>8}",
                i,
                format_timestamp(m.timestamp),
                m.value,
                dt,
                dv,
                m.status.label()
            )?;
        }
        Ok(())
    }
}
