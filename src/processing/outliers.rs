//! Outlier rejection: fixed bounds, percentile fences, z-score fences and
//! Peirce's criterion.
//!
//! Every method returns a new [`Partition`]; the receiver is never
//! reordered. Kept records come back with status OK and rejected ones with
//! status Outlier, both in chronological order.

use crate::error::{Result, SeriesError};
use crate::processing::partition::Partition;
use crate::processing::{peirce, primitives};
use crate::state::measurement::Status;
use crate::state::series::Series;

impl Series {
    /// Keep records with `low <= value <= high`, reject the rest.
    ///
    /// Works on a value-ordered view of the records: the two cut points are
    /// found by binary search and everything outside them is rejected. NaN
    /// values are never inside the bounds.
    pub fn reject_outside(&self, low: f64, high: f64) -> Partition {
        let (mut order, nan_positions): (Vec<usize>, Vec<usize>) =
            (0..self.points.len()).partition(|&i| !self.points[i].value.is_nan());
        order.sort_by(|&a, &b| self.points[a].value.total_cmp(&self.points[b].value));

        let lo = order.partition_point(|&i| self.points[i].value < low);
        let hi = order.partition_point(|&i| self.points[i].value <= high).max(lo);

        let mut keep = vec![false; self.points.len()];
        for &i in &order[lo..hi] {
            keep[i] = true;
        }

        let mut out = Partition::for_source(self);
        for (m, keep) in self.points.iter().zip(keep) {
            let mut m = *m;
            if keep {
                m.status = Status::Ok;
                out.kept.push(m);
            } else {
                m.status = Status::Outlier;
                out.rejected.push(m);
            }
        }
        out.kept.sort_chrono_asc();
        out.rejected.sort_chrono_asc();

        tracing::debug!(
            series = %self.name,
            low,
            high,
            kept = out.kept.len(),
            rejected = out.rejected.len(),
            nan = nan_positions.len(),
            "bound rejection"
        );
        out
    }

    /// Symmetric percentile fences: bounds are `percentile(p)` and
    /// `percentile(100 - p)` of the non-NaN values.
    pub fn percentile_fencing(&self, p: f64) -> Result<Partition> {
        let values = non_nan_values(self);
        let low = primitives::percentile(&values, p)?;
        let high = primitives::percentile(&values, 100.0 - p)?;
        Ok(self.reject_outside(low, high))
    }

    /// Z-score fences `mean ± level * std` over the non-NaN values, using the
    /// population standard deviation.
    pub fn zscore_fencing(&self, level: f64) -> Result<Partition> {
        if !(level.is_finite() && level >= 0.0) {
            return Err(SeriesError::out_of_range(
                "level",
                level,
                "z-score level must be a finite, non-negative number",
            ));
        }
        let values = non_nan_values(self);
        let m = primitives::mean(&values)?;
        let s = primitives::std_dev(&values)?;
        Ok(self.reject_outside(m - level * s, m + level * s))
    }

    /// Peirce's criterion over the non-NaN values.
    ///
    /// Records with a NaN value take no part in the test and are passed to
    /// `kept` untouched. Fails with
    /// [`SeriesError::TableBoundsExceeded`] when fewer than four values are
    /// available or the scan needs a ratio the table does not hold.
    pub fn peirce(&self) -> Result<Partition> {
        let positions: Vec<usize> = (0..self.points.len())
            .filter(|&i| !self.points[i].value.is_nan())
            .collect();
        let values: Vec<f64> = positions.iter().map(|&i| self.points[i].value).collect();
        if positions.len() < self.points.len() {
            tracing::warn!(
                series = %self.name,
                skipped = self.points.len() - positions.len(),
                "NaN values pass through Peirce's criterion untested"
            );
        }

        let mut reject = vec![false; self.points.len()];
        for idx in peirce::peirce_rejections(&values)? {
            reject[positions[idx]] = true;
        }

        let mut out = Partition::for_source(self);
        for (m, reject) in self.points.iter().zip(reject) {
            if reject {
                let mut m = *m;
                m.status = Status::Outlier;
                out.rejected.push(m);
            } else {
                out.kept.push(*m);
            }
        }
        out.kept.sort_chrono_asc();
        out.rejected.sort_chrono_asc();

        tracing::debug!(
            series = %self.name,
            kept = out.kept.len(),
            rejected = out.rejected.len(),
            "peirce criterion"
        );
        Ok(out)
    }
}

fn non_nan_values(series: &Series) -> Vec<f64> {
    let values: Vec<f64> = series
        .points
        .iter()
        .map(|m| m.value)
        .filter(|v| !v.is_nan())
        .collect();
    if values.len() < series.points.len() {
        tracing::warn!(
            series = %series.name,
            skipped = series.points.len() - values.len(),
            "NaN values left out of fence computation"
        );
    }
    values
}
