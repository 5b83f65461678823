//! Peirce's criterion for rejecting several outliers at once.

use crate::error::{Result, SeriesError};
use crate::processing::primitives;

/// Last usable table row; samples larger than 60 all read this row.
pub const MAX_ROW: usize = 57;
/// Number of suspect columns per row.
pub const MAX_SUSPECTS: usize = 9;

/// Critical ratios `R(N, k)`. Row `N - 3` holds sample size `N`, column `k`
/// the number of suspects already rejected. A `0.0` cell has no published
/// ratio.
pub const CRITICAL_RATIOS: [[f64; MAX_SUSPECTS]; MAX_ROW + 1] = [
    [1.196, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.383, 1.078, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.509, 1.2, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.61, 1.299, 1.099, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.693, 1.382, 1.187, 1.022, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.763, 1.453, 1.261, 1.109, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.824, 1.515, 1.324, 1.178, 1.045, 0.0, 0.0, 0.0, 0.0],
    [1.878, 1.57, 1.38, 1.237, 1.114, 0.0, 0.0, 0.0, 0.0],
    [1.925, 1.619, 1.43, 1.289, 1.172, 1.059, 0.0, 0.0, 0.0],
    [1.969, 1.663, 1.475, 1.336, 1.221, 1.118, 1.009, 0.0, 0.0],
    [2.007, 1.704, 1.516, 1.379, 1.266, 1.167, 1.07, 0.0, 0.0],
    [2.043, 1.741, 1.554, 1.417, 1.307, 1.21, 1.12, 1.026, 0.0],
    [2.076, 1.775, 1.589, 1.453, 1.344, 1.249, 1.164, 1.078, 0.0],
    [2.106, 1.807, 1.622, 1.486, 1.378, 1.285, 1.202, 1.122, 1.039],
    [2.134, 1.836, 1.652, 1.517, 1.409, 1.318, 1.237, 1.161, 1.084],
    [2.161, 1.864, 1.68, 1.546, 1.438, 1.348, 1.268, 1.195, 1.123],
    [2.185, 1.89, 1.707, 1.573, 1.466, 1.377, 1.298, 1.226, 1.158],
    [2.209, 1.914, 1.732, 1.599, 1.492, 1.404, 1.326, 1.255, 1.19],
    [2.23, 1.938, 1.756, 1.623, 1.517, 1.429, 1.352, 1.282, 1.218],
    [2.251, 1.96, 1.779, 1.646, 1.54, 1.452, 1.376, 1.308, 1.245],
    [2.271, 1.981, 1.8, 1.668, 1.563, 1.475, 1.399, 1.332, 1.27],
    [2.29, 2.0, 1.821, 1.689, 1.584, 1.497, 1.421, 1.354, 1.293],
    [2.307, 2.019, 1.84, 1.709, 1.604, 1.517, 1.442, 1.375, 1.315],
    [2.324, 2.037, 1.859, 1.728, 1.624, 1.537, 1.462, 1.396, 1.336],
    [2.341, 2.055, 1.877, 1.746, 1.642, 1.556, 1.481, 1.415, 1.356],
    [2.356, 2.071, 1.894, 1.764, 1.66, 1.574, 1.5, 1.434, 1.375],
    [2.371, 2.088, 1.911, 1.781, 1.677, 1.591, 1.517, 1.452, 1.393],
    [2.385, 2.103, 1.927, 1.797, 1.694, 1.608, 1.534, 1.469, 1.411],
    [2.399, 2.118, 1.942, 1.812, 1.71, 1.624, 1.55, 1.486, 1.428],
    [2.412, 2.132, 1.957, 1.828, 1.725, 1.64, 1.567, 1.502, 1.444],
    [2.425, 2.146, 1.971, 1.842, 1.74, 1.655, 1.582, 1.517, 1.459],
    [2.438, 2.159, 1.985, 1.856, 1.754, 1.669, 1.597, 1.532, 1.475],
    [2.45, 2.172, 1.998, 1.87, 1.768, 1.683, 1.611, 1.547, 1.489],
    [2.461, 2.184, 2.011, 1.883, 1.782, 1.697, 1.624, 1.561, 1.504],
    [2.472, 2.196, 2.024, 1.896, 1.795, 1.711, 1.638, 1.574, 1.517],
    [2.483, 2.208, 2.036, 1.909, 1.807, 1.723, 1.651, 1.587, 1.531],
    [2.494, 2.219, 2.047, 1.921, 1.82, 1.736, 1.664, 1.6, 1.544],
    [2.504, 2.23, 2.059, 1.932, 1.832, 1.748, 1.676, 1.613, 1.556],
    [2.514, 2.241, 2.07, 1.944, 1.843, 1.76, 1.688, 1.625, 1.568],
    [2.524, 2.251, 2.081, 1.955, 1.855, 1.771, 1.699, 1.636, 1.58],
    [2.533, 2.261, 2.092, 1.966, 1.866, 1.783, 1.711, 1.648, 1.592],
    [2.542, 2.271, 2.102, 1.976, 1.876, 1.794, 1.722, 1.659, 1.603],
    [2.551, 2.281, 2.112, 1.987, 1.887, 1.804, 1.733, 1.67, 1.614],
    [2.56, 2.29, 2.122, 1.997, 1.897, 1.815, 1.743, 1.681, 1.625],
    [2.568, 2.299, 2.131, 2.006, 1.907, 1.825, 1.754, 1.691, 1.636],
    [2.577, 2.308, 2.14, 2.016, 1.917, 1.835, 1.764, 1.701, 1.646],
    [2.585, 2.317, 2.149, 2.026, 1.927, 1.844, 1.773, 1.711, 1.656],
    [2.592, 2.326, 2.158, 2.035, 1.936, 1.854, 1.783, 1.721, 1.666],
    [2.6, 2.334, 2.167, 2.044, 1.945, 1.863, 1.792, 1.73, 1.675],
    [2.608, 2.342, 2.175, 2.052, 1.954, 1.872, 1.802, 1.74, 1.685],
    [2.615, 2.35, 2.184, 2.061, 1.963, 1.881, 1.811, 1.749, 1.694],
    [2.622, 2.358, 2.192, 2.069, 1.972, 1.89, 1.82, 1.758, 1.703],
    [2.629, 2.365, 2.2, 2.077, 1.98, 1.898, 1.828, 1.767, 1.711],
    [2.636, 2.373, 2.207, 2.085, 1.988, 1.907, 1.837, 1.775, 1.72],
    [2.643, 2.38, 2.215, 2.093, 1.996, 1.915, 1.845, 1.784, 1.729],
    [2.65, 2.387, 2.223, 2.109, 2.012, 1.931, 1.861, 1.8, 1.745],
    [2.656, 2.394, 2.237, 2.116, 2.019, 1.939, 1.869, 1.808, 1.753],
    [2.663, 2.401, 2.223, 2.101, 2.004, 1.923, 1.853, 1.792, 1.737],
];

/// Table row for a sample of `n` values.
///
/// Samples of fewer than four values are refused. Row 0 (`n = 3`) holds a
/// single ratio, 1.196, and every non-constant triple has a largest
/// deviation of at least 1.225 standard deviations, so the scan would
/// always move on to the missing second column.
pub fn table_row(n: usize) -> Result<usize> {
    if n < 4 {
        return Err(SeriesError::TableBoundsExceeded {
            row: n as i64 - 3,
            suspects: 0,
        });
    }
    Ok((n - 3).min(MAX_ROW))
}

/// Look up `R(row, suspects)`, failing on cells the table does not cover.
pub fn critical_ratio(row: usize, suspects: usize) -> Result<f64> {
    let ratio = CRITICAL_RATIOS
        .get(row)
        .and_then(|r| r.get(suspects))
        .copied()
        .filter(|&r| r > 0.0);
    ratio.ok_or(SeriesError::TableBoundsExceeded {
        row: row as i64,
        suspects,
    })
}

/// Positions in `values` rejected by Peirce's criterion, largest deviation
/// first.
///
/// Deviations from the mean are ranked in descending order and rejected
/// while `|x - mean| > std * R(row, i)`, `i` being the number already
/// rejected. The scan stops at the first deviation under its threshold;
/// later ones are smaller still.
pub fn peirce_rejections(values: &[f64]) -> Result<Vec<usize>> {
    let avg = primitives::mean(values)?;
    let s = primitives::std_dev(values)?;
    let row = table_row(values.len())?;

    let mut deviations: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i, (v - avg).abs()))
        .collect();
    deviations.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut rejected = Vec::new();
    for (suspects, &(position, deviation)) in deviations.iter().enumerate() {
        let threshold = s * critical_ratio(row, suspects)?;
        if deviation <= threshold {
            break;
        }
        tracing::trace!(position, deviation, threshold, "peirce rejection");
        rejected.push(position);
    }
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obvious_outlier_is_rejected() {
        let vals = [10.0, 11.0, 9.0, 10.5, 100.0, 9.5, 10.2];
        assert_eq!(peirce_rejections(&vals).unwrap(), vec![4]);
    }

    #[test]
    fn flat_data_rejects_nothing() {
        assert!(peirce_rejections(&[5.0; 12]).unwrap().is_empty());
    }

    #[test]
    fn large_samples_use_last_row() {
        assert_eq!(table_row(61).unwrap(), MAX_ROW);
        assert_eq!(table_row(500).unwrap(), MAX_ROW);
        assert_eq!(table_row(60).unwrap(), MAX_ROW);
        assert_eq!(table_row(4).unwrap(), 1);
    }

    #[test]
    fn lookups_outside_the_table_fail() {
        assert!(matches!(
            table_row(2),
            Err(SeriesError::TableBoundsExceeded { row: -1, .. })
        ));
        assert!(matches!(
            table_row(3),
            Err(SeriesError::TableBoundsExceeded { row: 0, .. })
        ));
        assert!(matches!(
            critical_ratio(0, 1),
            Err(SeriesError::TableBoundsExceeded { row: 0, suspects: 1 })
        ));
        assert!(critical_ratio(20, MAX_SUSPECTS).is_err());
        assert!(critical_ratio(MAX_ROW + 1, 0).is_err());
        assert_eq!(critical_ratio(4, 0).unwrap(), 1.693);
    }

    #[test]
    fn walking_past_the_last_column_is_an_error() {
        // Ten wild values in a sample of 1000: the tenth suspect has no column.
        let mut vals = vec![0.0; 990];
        vals.extend((0..10).map(|i| if i % 2 == 0 { 1000.0 } else { -1000.0 }));
        let res = peirce_rejections(&vals);
        assert!(matches!(
            res,
            Err(SeriesError::TableBoundsExceeded { suspects: MAX_SUSPECTS, .. })
        ));
    }

    #[test]
    fn too_few_values() {
        assert!(matches!(peirce_rejections(&[]), Err(SeriesError::EmptyInput { .. })));
        assert!(peirce_rejections(&[1.0, 2.0]).is_err());
        assert!(matches!(
            peirce_rejections(&[-1.0, 0.0, 1.0]),
            Err(SeriesError::TableBoundsExceeded { row: 0, suspects: 0 })
        ));
    }

    #[test]
    fn several_outliers_in_one_pass() {
        let mut vals = vec![
            10.0, 10.4, 9.7, 10.1, 9.9, 10.3, 9.6, 10.2, 10.0, 9.8, 10.5, 9.9, 10.1, 9.7, 10.2,
            10.0, 9.8, 10.3, 9.9, 10.1,
        ];
        vals.insert(5, 50.0);
        vals.insert(15, -30.0);
        // -30 lies furthest from the mean, so it is ranked first.
        assert_eq!(peirce_rejections(&vals).unwrap(), vec![15, 5]);
    }
}
