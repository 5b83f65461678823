use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Marker returned by `detect_date_format` when the column holds RFC 3339 /
/// ISO 8601 timestamps with an offset (e.g. `2026-02-10T22:26:28.987Z`).
pub const RFC3339_FORMAT: &str = "__rfc3339__";

/// Marker for integer or fractional Unix epoch seconds.
pub const EPOCH_SECONDS_FORMAT: &str = "__epoch__";

/// Naive layouts tried in order; all are read as UTC.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

/// Detect the most likely date format from a sample of column values.
/// Returns the layout with the highest parse success rate, or one of the
/// RFC 3339 / epoch markers.
pub fn detect_date_format(values: &[String]) -> Option<&'static str> {
    let sample: Vec<&str> = values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let score = |ok: usize| ok as f64 / sample.len() as f64;

    let rfc3339_score = score(
        sample
            .iter()
            .filter(|s| DateTime::parse_from_rfc3339(s).is_ok())
            .count(),
    );

    let mut best_format: Option<&'static str> = None;
    let mut best_score: f64 = 0.0;
    if rfc3339_score > 0.0 {
        best_format = Some(RFC3339_FORMAT);
        best_score = rfc3339_score;
    }

    for &fmt in DATE_FORMATS {
        let s = score(
            sample
                .iter()
                .filter(|s| parse_naive(s, fmt).is_some())
                .count(),
        );
        if s > best_score {
            best_score = s;
            best_format = Some(fmt);
        }
    }

    // Plain numbers only count as epoch seconds when nothing else matched.
    if best_format.is_none() {
        let epoch_score = score(sample.iter().filter(|s| s.parse::<f64>().is_ok()).count());
        if epoch_score > 0.0 {
            best_format = Some(EPOCH_SECONDS_FORMAT);
        }
    }

    best_format
}

/// Parse a value with a format returned by [`detect_date_format`].
pub fn parse_timestamp(value: &str, format: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    match format {
        RFC3339_FORMAT => DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        EPOCH_SECONDS_FORMAT => {
            let secs: f64 = value.parse().ok()?;
            if !secs.is_finite() {
                return None;
            }
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
            DateTime::<Utc>::from_timestamp(whole as i64, nanos.min(999_999_999))
        }
        fmt => parse_naive(value, fmt).map(|dt| dt.and_utc()),
    }
}

fn parse_naive(value: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, fmt)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, fmt)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Whether a cell looks like a date rather than a column title.
pub fn is_date_like(s: &str) -> bool {
    if !(s.contains('/') || s.contains(':') || s.contains('-')) {
        return false;
    }
    DateTime::parse_from_rfc3339(s).is_ok() || DATE_FORMATS.iter().any(|fmt| parse_naive(s, fmt).is_some())
}

/// Format a timestamp for display. Shows milliseconds only when the
/// timestamp has a sub-second component.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    if ts.timestamp_subsec_nanos() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn detects_rfc3339() {
        let col = strings(&["2026-02-10T22:26:28.987Z", "2026-02-10T22:26:29.987Z"]);
        assert_eq!(detect_date_format(&col), Some(RFC3339_FORMAT));
        let t = parse_timestamp(&col[0], RFC3339_FORMAT).unwrap();
        assert_eq!(t.timestamp_subsec_millis(), 987);
    }

    #[test]
    fn detects_naive_layout() {
        let col = strings(&["2025-11-10 10:00:05", "2025-11-10 10:00:20", ""]);
        let fmt = detect_date_format(&col).unwrap();
        assert_eq!(
            parse_timestamp(&col[1], fmt),
            Some(Utc.with_ymd_and_hms(2025, 11, 10, 10, 0, 20).unwrap())
        );
    }

    #[test]
    fn date_only_values_are_midnight() {
        let t = parse_timestamp("2025-03-04", "%Y-%m-%d").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap());
    }

    #[test]
    fn falls_back_to_epoch_seconds() {
        let col = strings(&["1700000000", "1700000030.5"]);
        assert_eq!(detect_date_format(&col), Some(EPOCH_SECONDS_FORMAT));
        let t = parse_timestamp(&col[1], EPOCH_SECONDS_FORMAT).unwrap();
        assert_eq!(t.timestamp(), 1_700_000_030);
        assert_eq!(t.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn headers_are_not_dates() {
        assert!(!is_date_like("timestamp"));
        assert!(!is_date_like("temp-sensor"));
        assert!(is_date_like("2025-11-10 10:00:05"));
    }

    #[test]
    fn formatting_hides_zero_millis() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(t), "2025-01-01 00:00:00");
        let t = t + chrono::TimeDelta::milliseconds(250);
        assert_eq!(format_timestamp(t), "2025-01-01 00:00:00.250");
    }
}
