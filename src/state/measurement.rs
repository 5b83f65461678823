use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Validity of a single measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Ok,
    Missing,
    Outlier,
    Invalid,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Missing => "Missing",
            Status::Outlier => "Outlier",
            Status::Invalid => "Invalid",
        }
    }
}

/// One timestamped observation.
///
/// `delta_time` and `delta_value` are relative to the chronologically
/// preceding record and are only meaningful after
/// [`Series::refresh_stats`](crate::Series::refresh_stats) or
/// [`Series::compute_deltas`](crate::Series::compute_deltas) has run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub status: Status,
    pub delta_time: TimeDelta,
    pub delta_value: f64,
}

impl Measurement {
    /// A valid observation. A value of `0.0` is a real reading, not "unset";
    /// pass `f64::NAN` or use [`Measurement::missing`] for absent data.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self::with_status(timestamp, value, Status::Ok)
    }

    pub fn with_status(timestamp: DateTime<Utc>, value: f64, status: Status) -> Self {
        Self {
            timestamp,
            value,
            status,
            delta_time: TimeDelta::zero(),
            delta_value: f64::NAN,
        }
    }

    /// Sentinel record marking absent data at `timestamp`.
    pub fn missing(timestamp: DateTime<Utc>) -> Self {
        Self::with_status(timestamp, f64::NAN, Status::Missing)
    }

    /// Whether the record can feed statistics: status OK and a real number.
    pub fn is_usable(&self) -> bool {
        self.status == Status::Ok && !self.value.is_nan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_measurement_defaults_to_ok() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let m = Measurement::new(t, 0.0);
        assert_eq!(m.status, Status::Ok);
        assert!(m.is_usable());
        assert_eq!(m.delta_time, TimeDelta::zero());
    }

    #[test]
    fn nan_or_flagged_records_are_not_usable() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert!(!Measurement::new(t, f64::NAN).is_usable());
        assert!(!Measurement::with_status(t, 4.0, Status::Invalid).is_usable());
        let gap = Measurement::missing(t);
        assert!(gap.value.is_nan());
        assert_eq!(gap.status, Status::Missing);
    }
}
