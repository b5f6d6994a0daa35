//! Min-max range fitting and scaling.
//!
//! A [`MinMaxRange`] is fitted once over a column and then reused to scale
//! any value of that column (including values that were not part of the fit)
//! into the unit interval.

use crate::descriptive::DescriptiveStats;

/// Observed `[min, max]` range of a single column.
///
/// Invariant: `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxRange {
    pub min: f64,
    pub max: f64,
}

impl MinMaxRange {
    /// Value produced by [`Self::scale`] for a degenerate range (`min == max`).
    pub const CONSTANT_VALUE: f64 = 0.0;

    /// Fits a range over the given values.
    ///
    /// Returns `None` if `values` is empty.
    #[must_use]
    pub fn fit<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        DescriptiveStats::new(values).map(|stats| Self::from_stats(&stats))
    }

    #[must_use]
    pub fn from_stats(stats: &DescriptiveStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
        }
    }

    /// Returns `true` when every fitted value was identical.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// Maps `value` to `(value - min) / (max - min)`.
    ///
    /// Values inside the fitted range land in `[0, 1]`; values outside it are
    /// extrapolated linearly and are not clamped. A degenerate range maps every
    /// value to [`Self::CONSTANT_VALUE`]. A range whose width overflows `f64`
    /// (e.g. `[-1e308, 1e308]`) is scaled through halved values, so the
    /// result stays finite.
    ///
    /// # Examples
    ///
    /// ```
    /// use compass_stats::range::MinMaxRange;
    ///
    /// let range = MinMaxRange { min: 0.0, max: 4.0 };
    /// assert_eq!(range.scale(1.0), 0.25);
    ///
    /// let flat = MinMaxRange { min: 3.0, max: 3.0 };
    /// assert_eq!(flat.scale(3.0), MinMaxRange::CONSTANT_VALUE);
    /// ```
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            return Self::CONSTANT_VALUE;
        }
        let span = self.max - self.min;
        if span.is_finite() {
            return (value - self.min) / span;
        }
        (value / 2.0 - self.min / 2.0) / (self.max / 2.0 - self.min / 2.0)
    }
}
