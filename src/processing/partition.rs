use std::collections::HashSet;

use crate::state::measurement::Status;
use crate::state::series::Series;

/// Result of splitting one series in two.
#[derive(Debug, Clone)]
pub struct Partition {
    pub kept: Series,
    pub rejected: Series,
}

impl Partition {
    pub(crate) fn for_source(source: &Series) -> Self {
        Self {
            kept: source.derived("Cleaned"),
            rejected: source.derived("Removed"),
        }
    }

    pub fn into_parts(self) -> (Series, Series) {
        (self.kept, self.rejected)
    }

    pub fn total_len(&self) -> usize {
        self.kept.len() + self.rejected.len()
    }
}

impl Series {
    /// OK records go to `kept`, every other status to `rejected`. Relative
    /// order is preserved in both.
    pub fn split_by_status(&self) -> Partition {
        let mut out = Partition::for_source(self);
        for m in &self.points {
            if m.status == Status::Ok {
                out.kept.push(*m);
            } else {
                out.rejected.push(*m);
            }
        }
        out
    }

    /// Records at `indices` go to `rejected`, the rest to `kept`.
    /// Out-of-range and repeated indices are ignored.
    pub fn remove_indices(&self, indices: &[usize]) -> Partition {
        let drop: HashSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.points.len())
            .collect();
        let mut out = Partition::for_source(self);
        for (i, m) in self.points.iter().enumerate() {
            if drop.contains(&i) {
                out.rejected.push(*m);
            } else {
                out.kept.push(*m);
            }
        }
        out
    }
}

/// Concatenate `a` then `b` into a new series. No re-sorting happens;
/// call [`Series::sort_chrono_asc`] on the result when order matters.
pub fn merge(a: &Series, b: &Series) -> Series {
    let mut points = Vec::with_capacity(a.len() + b.len());
    points.extend_from_slice(&a.points);
    points.extend_from_slice(&b.points);
    Series::from_points(format!("{} + {}", a.name, b.name), points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    fn at(min: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + TimeDelta::minutes(min)
    }

    fn mixed() -> Series {
        let mut s = Series::new("S");
        s.add(at(0), 1.0);
        s.add_with_status(at(1), f64::NAN, Status::Missing);
        s.add(at(2), 3.0);
        s.add_with_status(at(3), 4.0, Status::Invalid);
        s.add(at(4), 5.0);
        s
    }

    #[test]
    fn status_split_preserves_order() {
        let p = mixed().split_by_status();
        assert_eq!(p.kept.values(), vec![1.0, 3.0, 5.0]);
        assert_eq!(p.rejected.len(), 2);
        assert_eq!(p.rejected.points[0].status, Status::Missing);
        assert_eq!(p.rejected.points[1].status, Status::Invalid);
        assert_eq!(p.kept.name, "S Cleaned");
    }

    #[test]
    fn index_removal_ignores_duplicates_and_out_of_range() {
        let p = mixed().remove_indices(&[4, 0, 0, 17]);
        assert_eq!(p.rejected.values(), vec![1.0, 5.0]);
        assert_eq!(p.kept.len(), 3);
        assert_eq!(p.total_len(), 5);
    }

    #[test]
    fn index_removal_with_no_indices_keeps_all() {
        let p = mixed().remove_indices(&[]);
        assert_eq!(p.kept.len(), 5);
        assert!(p.rejected.is_empty());
    }

    #[test]
    fn merge_concatenates_without_sorting() {
        let mut a = Series::new("A");
        a.add(at(5), 1.0);
        a.add(at(6), 2.0);
        let mut b = Series::new("B");
        b.add(at(0), 3.0);

        let m = merge(&a, &b);
        assert_eq!(m.len(), 3);
        assert_eq!(m.values(), vec![1.0, 2.0, 3.0]);
        assert!(!m.is_chrono_sorted());
        assert_eq!(m.name, "A + B");
    }
}
