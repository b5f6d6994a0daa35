//! Min-max normalization fitted over the whole dataset
//!
//! Parameters are computed once per preparation run and reused unchanged for
//! every vector that has to live in the same space, notably the mean profile
//! that seeds each query.
//!
//! # Example
//!
//! ```
//! use compass_dataset::normalization::NormalizationParams;
//! use ndarray::array;
//!
//! let raw = array![[10.0, 1.0], [20.0, 1.0], [30.0, 1.0]];
//! let params = NormalizationParams::fit(&raw);
//!
//! assert_eq!(params.transform(&[20.0, 1.0]), vec![0.5, 0.0]);
//! ```

use std::iter;

use compass_stats::{descriptive::DescriptiveStats, range::MinMaxRange};

use ndarray::{Array2, Axis};

/// Per-feature `(min, max)` ranges aligned with the feature schema.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationParams {
    ranges: Vec<MinMaxRange>,
}

impl NormalizationParams {
    /// Fits one range per column of `raw`.
    ///
    /// # Panics
    ///
    /// Panics if `raw` has no rows.
    #[must_use]
    pub fn fit(raw: &Array2<f64>) -> Self {
        let ranges = raw
            .axis_iter(Axis(1))
            .map(|column| {
                MinMaxRange::fit(column.iter().copied()).expect("matrix must have rows")
            })
            .collect();
        Self { ranges }
    }

    #[must_use]
    pub fn ranges(&self) -> &[MinMaxRange] {
        &self.ranges
    }

    /// Scales a raw vector into normalized space.
    ///
    /// Values outside the fitted range are extrapolated, not clamped.
    #[must_use]
    pub fn transform(&self, raw: &[f64]) -> Vec<f64> {
        debug_assert_eq!(raw.len(), self.ranges.len(), "vector length mismatch");
        iter::zip(&self.ranges, raw)
            .map(|(range, value)| range.scale(*value))
            .collect()
    }

    /// Scales every row of a raw matrix.
    #[must_use]
    pub fn transform_matrix(&self, raw: &Array2<f64>) -> Array2<f64> {
        debug_assert_eq!(raw.ncols(), self.ranges.len(), "matrix width mismatch");
        Array2::from_shape_fn(raw.dim(), |(row, col)| self.ranges[col].scale(raw[[row, col]]))
    }
}

/// Per-column arithmetic mean of a matrix.
///
/// # Panics
///
/// Panics if `matrix` has no rows.
#[must_use]
pub fn column_means(matrix: &Array2<f64>) -> Vec<f64> {
    matrix
        .axis_iter(Axis(1))
        .map(|column| {
            DescriptiveStats::new(column.iter().copied())
                .expect("matrix must have rows")
                .mean
        })
        .collect()
}
