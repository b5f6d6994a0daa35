/// Descriptive statistics summarizing a column of values.
///
/// This structure contains common measures of central tendency, dispersion,
/// and spread for a dataset of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    pub median: f64,
    /// The population variance of the dataset.
    pub variance: f64,
    /// The standard deviation of the dataset.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// The mean is accumulated in input order, so two calls over the same
    /// sequence always agree bit-for-bit. When the plain sum overflows, the
    /// mean is accumulated from `value / n` instead. The values are sorted internally
    /// for the median.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use compass_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }

        let n = values.len() as f64;
        let sum = values.iter().sum::<f64>();
        let mean = if sum.is_finite() {
            sum / n
        } else {
            values.iter().map(|v| v / n).sum()
        };
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values;
        sorted.sort_by(f64::total_cmp);
        let min = sorted[0];
        let max = sorted[sorted.len() - 1];
        let median = sorted[sorted.len() / 2];

        Some(Self {
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.sqrt(),
        })
    }

    /// Width of the observed range (`max - min`).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}
