use chrono::{DateTime, TimeDelta, Utc};

use crate::processing::primitives;
use crate::state::measurement::Measurement;

/// Spread statistics for a set of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl SpreadStats {
    /// Compute statistics from values, filtering out NaN and infinities.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let vals: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if vals.is_empty() {
            return None;
        }

        let min = primitives::min(&vals).ok()?;
        let max = primitives::max(&vals).ok()?;

        Some(SpreadStats {
            count: vals.len(),
            min,
            max,
            peak_to_peak: max - min,
            mean: primitives::mean(&vals).ok()?,
            median: primitives::median(&vals).ok()?,
            std_dev: primitives::std_dev(&vals).ok()?,
        })
    }
}

/// Statistics over the gaps between consecutive timestamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaTimeStats {
    pub min: TimeDelta,
    pub at_min: DateTime<Utc>,
    pub max: TimeDelta,
    pub at_max: DateTime<Utc>,
    pub mean: TimeDelta,
    pub median: TimeDelta,
    pub std_dev: TimeDelta,
}

/// Summary of a series, recomputed explicitly by
/// [`Series::refresh_stats`](crate::Series::refresh_stats).
///
/// `len` counts every record; value statistics only consider usable records
/// (status OK, value not NaN). Fields stay `None` when there is nothing to
/// summarise so that "no data" is never confused with zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStats {
    pub len: usize,
    pub nan_count: usize,
    /// Earliest record and its value.
    pub first: Option<(DateTime<Utc>, f64)>,
    /// Latest record and its value.
    pub last: Option<(DateTime<Utc>, f64)>,
    pub chron_mean: Option<DateTime<Utc>>,
    pub chron_median: Option<DateTime<Utc>>,
    pub value: Option<SpreadStats>,
    pub at_value_min: Option<DateTime<Utc>>,
    pub at_value_max: Option<DateTime<Utc>>,
    pub delta_time: Option<DeltaTimeStats>,
    pub delta_value: Option<SpreadStats>,
}

impl SummaryStats {
    /// Summarise records that are already in chronological order with
    /// deltas filled in.
    pub fn compute(points: &[Measurement]) -> Self {
        let mut stats = SummaryStats {
            len: points.len(),
            nan_count: points.iter().filter(|m| m.value.is_nan()).count(),
            ..Default::default()
        };
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return stats;
        };
        stats.first = Some((first.timestamp, first.value));
        stats.last = Some((last.timestamp, last.value));

        // Offsets from the first timestamp keep nanosecond precision in f64.
        let offsets: Vec<f64> = points
            .iter()
            .map(|m| offset_nanos(first.timestamp, m.timestamp))
            .collect();
        stats.chron_mean = primitives::mean(&offsets)
            .ok()
            .map(|ns| first.timestamp + TimeDelta::nanoseconds(ns as i64));
        stats.chron_median = primitives::median(&offsets)
            .ok()
            .map(|ns| first.timestamp + TimeDelta::nanoseconds(ns as i64));

        let usable: Vec<&Measurement> = points.iter().filter(|m| m.is_usable()).collect();
        let values: Vec<f64> = usable.iter().map(|m| m.value).collect();
        stats.value = SpreadStats::compute(&values);
        if let Some(v) = &stats.value {
            stats.at_value_min = usable.iter().find(|m| m.value == v.min).map(|m| m.timestamp);
            stats.at_value_max = usable.iter().find(|m| m.value == v.max).map(|m| m.timestamp);
        }

        stats.delta_time = delta_time_stats(&points[1..]);

        let deltas: Vec<f64> = points[1..]
            .iter()
            .filter(|m| m.is_usable())
            .map(|m| m.delta_value)
            .collect();
        stats.delta_value = SpreadStats::compute(&deltas);

        stats
    }

    /// Format as a multi-line report string.
    pub fn report(&self, label: &str) -> String {
        let ts = |t: Option<DateTime<Utc>>| {
            t.map(crate::data::datetime::format_timestamp)
                .unwrap_or_else(|| "-".to_string())
        };
        let mut out = format!(
            "{}:\n  Count: {}\n  Missing (NaN): {}\n  First: {}\n  Last: {}\n  Chron mean: {}\n  Chron median: {}\n",
            label,
            self.len,
            self.nan_count,
            ts(self.first.map(|f| f.0)),
            ts(self.last.map(|l| l.0)),
            ts(self.chron_mean),
            ts(self.chron_median),
        );
        match &self.value {
            Some(v) => out.push_str(&format!(
                "  Min: {:.3} at {}\n  Max: {:.3} at {}\n  Peak-to-Peak: {:.3}\n  Mean: {:.3}\n  Median: {:.3}\n  Std Dev: {:.3}\n",
                v.min,
                ts(self.at_value_min),
                v.max,
                ts(self.at_value_max),
                v.peak_to_peak,
                v.mean,
                v.median,
                v.std_dev
            )),
            None => out.push_str("  Values: none usable\n"),
        }
        if let Some(d) = &self.delta_time {
            out.push_str(&format!(
                "  Delta time: min {} max {} mean {} median {} std {}\n",
                d.min, d.max, d.mean, d.median, d.std_dev
            ));
        }
        if let Some(d) = &self.delta_value {
            out.push_str(&format!(
                "  Delta value: min {:.3} max {:.3} mean {:.3} median {:.3} std {:.3}\n",
                d.min, d.max, d.mean, d.median, d.std_dev
            ));
        }
        out
    }
}

fn offset_nanos(origin: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    let delta = t - origin;
    delta
        .num_nanoseconds()
        .map(|ns| ns as f64)
        .unwrap_or_else(|| delta.num_milliseconds() as f64 * 1e6)
}

fn delta_time_stats(points: &[Measurement]) -> Option<DeltaTimeStats> {
    let nanos: Vec<f64> = points
        .iter()
        .map(|m| m.delta_time.num_nanoseconds().unwrap_or(i64::MAX) as f64)
        .collect();
    let spread = SpreadStats::compute(&nanos)?;
    let min_point = points.iter().min_by_key(|m| m.delta_time)?;
    let max_point = points.iter().max_by_key(|m| m.delta_time)?;
    Some(DeltaTimeStats {
        min: min_point.delta_time,
        at_min: min_point.timestamp,
        max: max_point.delta_time,
        at_max: max_point.timestamp,
        mean: TimeDelta::nanoseconds(spread.mean as i64),
        median: TimeDelta::nanoseconds(spread.median as i64),
        std_dev: TimeDelta::nanoseconds(spread.std_dev as i64),
    })
}
