//! Fixed-grid resampling with aggregation and gap markers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SeriesError};
use crate::processing::primitives;
use crate::state::measurement::Measurement;
use crate::state::series::Series;

/// Grid unit. Tolerances are counted in the next finer unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PeriodUnit {
    Seconds,
    Minutes,
    Hours,
}

impl PeriodUnit {
    pub fn label(&self) -> &'static str {
        match self {
            PeriodUnit::Seconds => "s",
            PeriodUnit::Minutes => "min",
            PeriodUnit::Hours => "h",
        }
    }

    /// Length of `n` units.
    pub fn span(&self, n: u32) -> TimeDelta {
        let n = i64::from(n);
        match self {
            PeriodUnit::Seconds => TimeDelta::seconds(n),
            PeriodUnit::Minutes => TimeDelta::minutes(n),
            PeriodUnit::Hours => TimeDelta::hours(n),
        }
    }

    /// Length of `n` tolerance steps: milliseconds for a seconds grid,
    /// seconds for minutes, minutes for hours.
    pub fn tolerance_span(&self, n: u32) -> TimeDelta {
        let n = i64::from(n);
        match self {
            PeriodUnit::Seconds => TimeDelta::milliseconds(n),
            PeriodUnit::Minutes => TimeDelta::seconds(n),
            PeriodUnit::Hours => TimeDelta::minutes(n),
        }
    }
}

impl FromStr for PeriodUnit {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "s" | "sec" | "secs" | "second" | "seconds" | "Seconds" => Ok(PeriodUnit::Seconds),
            "m" | "min" | "mins" | "minute" | "minutes" | "Minutes" => Ok(PeriodUnit::Minutes),
            "h" | "hr" | "hour" | "hours" | "Hours" => Ok(PeriodUnit::Hours),
            other => Err(SeriesError::out_of_range(
                "unit",
                other,
                "expected seconds, minutes or hours",
            )),
        }
    }
}

impl TryFrom<String> for PeriodUnit {
    type Error = SeriesError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PeriodUnit> for String {
    fn from(unit: PeriodUnit) -> Self {
        unit.label().to_string()
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How the values falling into one bucket are condensed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Aggregation {
    Mean,
    Max,
    Min,
    Last,
    Sum,
}

impl Aggregation {
    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Mean => "mean",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::Last => "last",
            Aggregation::Sum => "sum",
        }
    }

    /// Condense `values`, given in chronological order.
    pub fn apply(&self, values: &[f64]) -> Result<f64> {
        match self {
            Aggregation::Mean => primitives::mean(values),
            Aggregation::Max => primitives::max(values),
            Aggregation::Min => primitives::min(values),
            Aggregation::Sum => primitives::sum(values),
            Aggregation::Last => values
                .last()
                .copied()
                .ok_or_else(|| SeriesError::empty("last")),
        }
    }
}

impl FromStr for Aggregation {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" | "avg" | "average" | "Average" | "Mean" => Ok(Aggregation::Mean),
            "max" | "maximum" | "Maximum" | "Max" => Ok(Aggregation::Max),
            "min" | "minimum" | "Minimum" | "Min" => Ok(Aggregation::Min),
            "last" | "Last" => Ok(Aggregation::Last),
            "sum" | "Sum" => Ok(Aggregation::Sum),
            other => Err(SeriesError::out_of_range(
                "aggregation",
                other,
                "expected mean, max, min, last or sum",
            )),
        }
    }
}

impl TryFrom<String> for Aggregation {
    type Error = SeriesError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Aggregation> for String {
    fn from(agg: Aggregation) -> Self {
        agg.label().to_string()
    }
}

/// Parameters of one resampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularizeParams {
    pub period: u32,
    pub unit: PeriodUnit,
    pub aggregation: Aggregation,
    /// Extra slack for bucket membership, in the unit below `unit`.
    #[serde(default)]
    pub tolerance: u32,
}

impl RegularizeParams {
    /// Build parameters from user-facing strings. Unknown unit or aggregation
    /// names fail here, before any data is touched.
    pub fn new(period: u32, unit: &str, aggregation: &str, tolerance: u32) -> Result<Self> {
        let params = Self {
            period,
            unit: unit.parse()?,
            aggregation: aggregation.parse()?,
            tolerance,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.period == 0 {
            return Err(SeriesError::out_of_range(
                "period",
                self.period,
                "period must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn period_span(&self) -> TimeDelta {
        self.unit.span(self.period)
    }

    pub fn tolerance_span(&self) -> TimeDelta {
        self.unit.tolerance_span(self.tolerance)
    }
}

/// First grid instant: `first` rounded down to a multiple of `period`
/// (counted from the Unix epoch), stepped back one period when `first`
/// already sits on the grid so that it falls strictly inside a bucket.
pub fn grid_anchor(first: DateTime<Utc>, period: TimeDelta) -> Result<DateTime<Utc>> {
    let rounded = first
        .duration_trunc(period)
        .map_err(|e| SeriesError::Timestamp(e.to_string()))?;
    if rounded == first {
        shift(first, -period)
    } else {
        Ok(rounded)
    }
}

fn shift(t: DateTime<Utc>, by: TimeDelta) -> Result<DateTime<Utc>> {
    t.checked_add_signed(by)
        .ok_or_else(|| SeriesError::Timestamp(format!("{t} + {by}")))
}

impl Series {
    /// Resample onto a regular grid.
    ///
    /// Each bucket `(end - period, end]` (widened by the tolerance on the
    /// upper side) that receives records emits one value stamped at `end`.
    /// Usable values are condensed with the configured aggregation; a bucket
    /// holding only unusable records, and every empty bucket between two
    /// occupied ones, emits a NaN record with status Missing. Nothing is
    /// emitted before the first or after the last record.
    ///
    /// An empty series yields an empty result. The receiver is not
    /// reordered; unsorted input is walked on a sorted copy.
    pub fn regularize(&self, params: &RegularizeParams) -> Result<Series> {
        params.validate()?;
        let period = params.period_span();
        let tolerance = params.tolerance_span();
        let mut out = self.derived("Regularized");

        let mut points: Vec<&Measurement> = self.points.iter().collect();
        if points.is_empty() {
            return Ok(out);
        }
        if !self.is_chrono_sorted() {
            tracing::warn!(series = %self.name, "regularizing unsorted series on a sorted copy");
            points.sort_by_key(|m| m.timestamp);
        }

        let anchor = grid_anchor(points[0].timestamp, period)?;
        let mut bucket_end = shift(anchor, period)?;
        let mut cursor = 0;
        let mut gaps = 0usize;

        loop {
            let upper = shift(bucket_end, tolerance)?;
            let start = cursor;
            while cursor < points.len() && points[cursor].timestamp <= upper {
                cursor += 1;
            }
            if cursor > start {
                out.push(condense(bucket_end, &points[start..cursor], params.aggregation)?);
            }

            if cursor >= points.len() {
                break;
            }

            // Skip ahead, marking every bucket the next record jumps over.
            loop {
                let next_end = shift(bucket_end, period)?;
                let next_upper = shift(next_end, tolerance)?;
                bucket_end = next_end;
                if points[cursor].timestamp <= next_upper {
                    break;
                }
                out.push(Measurement::missing(next_end));
                gaps += 1;
            }
        }

        tracing::debug!(
            series = %self.name,
            period = params.period,
            unit = params.unit.label(),
            aggregation = params.aggregation.label(),
            input = points.len(),
            output = out.len(),
            gaps,
            "regularized series"
        );
        Ok(out)
    }
}

fn condense(end: DateTime<Utc>, bucket: &[&Measurement], agg: Aggregation) -> Result<Measurement> {
    let values: Vec<f64> = bucket
        .iter()
        .filter(|m| m.is_usable())
        .map(|m| m.value)
        .collect();
    if values.is_empty() {
        return Ok(Measurement::missing(end));
    }
    Ok(Measurement::new(end, agg.apply(&values)?))
}
