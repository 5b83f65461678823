//! Statistical primitives over plain `f64` slices.
//!
//! Every function fails with [`SeriesError::EmptyInput`] on a zero-length
//! slice instead of returning a zero that would look like a real result.
//! None of them mutate their input; the order-based ones sort a private copy.

use crate::error::{Result, SeriesError};

pub fn sum(x: &[f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(SeriesError::empty("sum"));
    }
    Ok(x.iter().sum())
}

pub fn mean(x: &[f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(SeriesError::empty("mean"));
    }
    Ok(sum(x)? / x.len() as f64)
}

/// Middle element of the sorted data, or the mean of the two central
/// elements for an even count.
pub fn median(x: &[f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(SeriesError::empty("median"));
    }
    let vals = sorted_copy(x);
    let n = vals.len();
    if n % 2 == 0 {
        Ok((vals[n / 2 - 1] + vals[n / 2]) / 2.0)
    } else {
        Ok(vals[n / 2])
    }
}

pub fn min(x: &[f64]) -> Result<f64> {
    let (first, rest) = x.split_first().ok_or_else(|| SeriesError::empty("min"))?;
    Ok(rest.iter().fold(*first, |acc, &v| if v < acc { v } else { acc }))
}

pub fn max(x: &[f64]) -> Result<f64> {
    let (first, rest) = x.split_first().ok_or_else(|| SeriesError::empty("max"))?;
    Ok(rest.iter().fold(*first, |acc, &v| if v > acc { v } else { acc }))
}

/// Population standard deviation: the denominator is `n`, not `n - 1`.
pub fn std_dev(x: &[f64]) -> Result<f64> {
    if x.is_empty() {
        return Err(SeriesError::empty("std_dev"));
    }
    let m = mean(x)?;
    let variance = x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / x.len() as f64;
    Ok(variance.sqrt())
}

/// Nearest-rank percentile, `p` in `(0, 100]`.
///
/// With `k = floor(p / 100 * n)` the result is the element of 1-based rank
/// `k` in the ascending data, clamped to the first and last element. There
/// is no interpolation between ranks.
pub fn percentile(x: &[f64], p: f64) -> Result<f64> {
    if x.is_empty() {
        return Err(SeriesError::empty("percentile"));
    }
    if !(p > 0.0 && p <= 100.0) {
        return Err(SeriesError::out_of_range("p", p, "percentile must be in (0, 100]"));
    }
    let vals = sorted_copy(x);
    let n = vals.len();
    let k = (p / 100.0 * n as f64).floor() as usize;
    let idx = k.saturating_sub(1).min(n - 1);
    Ok(vals[idx])
}

fn sorted_copy(x: &[f64]) -> Vec<f64> {
    let mut vals = x.to_vec();
    vals.sort_by(|a, b| a.total_cmp(b));
    vals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_empty(res: Result<f64>) {
        assert!(
            matches!(res, Err(SeriesError::EmptyInput { .. })),
            "expected EmptyInput, got {res:?}"
        );
    }

    #[test]
    fn mean_and_population_std_dev() {
        let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&x).unwrap(), 5.0);
        assert_eq!(std_dev(&x).unwrap(), 2.0);
        assert_eq!(sum(&x).unwrap(), 40.0);
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[1.0, 3.0, 2.0]).unwrap(), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5);
    }

    #[test]
    fn median_leaves_input_untouched() {
        let x = vec![3.0, 1.0, 2.0];
        median(&x).unwrap();
        assert_eq!(x, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn min_max_single_pass() {
        let x = [3.0, -2.0, 7.0, 7.0, 0.0];
        assert_eq!(min(&x).unwrap(), -2.0);
        assert_eq!(max(&x).unwrap(), 7.0);
        assert_eq!(min(&[42.0]).unwrap(), 42.0);
    }

    #[test]
    fn percentile_is_nearest_rank() {
        let x = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&x, 50.0).unwrap(), 20.0);
        assert_eq!(percentile(&x, 99.0).unwrap(), 40.0);
        assert_eq!(percentile(&x, 100.0).unwrap(), 50.0);
        // k = 0 clamps to the first element.
        assert_eq!(percentile(&x, 1.0).unwrap(), 10.0);
    }

    #[test]
    fn percentile_rejects_out_of_range_p() {
        let x = [1.0, 2.0];
        for p in [0.0, -5.0, 100.5, f64::NAN] {
            assert!(matches!(
                percentile(&x, p),
                Err(SeriesError::OutOfRangeParameter { name: "p", .. })
            ));
        }
    }

    #[test]
    fn every_primitive_fails_on_empty_input() {
        assert_empty(sum(&[]));
        assert_empty(mean(&[]));
        assert_empty(median(&[]));
        assert_empty(min(&[]));
        assert_empty(max(&[]));
        assert_empty(std_dev(&[]));
        assert_empty(percentile(&[], 50.0));
    }
}
