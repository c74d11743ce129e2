use rayon::slice::ParallelSliceMut;

use crate::distribution::{Distribution, Percentile};

/// DistributionBuilder
/// Collects historical raw scores and freezes them into a Distribution with
/// one checkpoint per integer percentile.
///
/// Percentiles use linear interpolation between closest ranks:
/// `pos = p / 100 * (n - 1)`.
#[derive(Debug, Clone, Default)]
pub struct DistributionBuilder {
    values: Vec<f64>,
}

impl DistributionBuilder {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a sample
    /// Non-finite values are skipped.
    pub fn add(&mut self, value: f64) -> &mut Self {
        if value.is_finite() {
            self.values.push(value);
        }
        self
    }

    /// Add many samples
    pub fn extend<I>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = f64>,
    {
        for value in values {
            self.add(value);
        }
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at a percentile of the samples gathered so far
    ///
    /// # Arguments
    /// * `p` - percentile, clamped to [0, 100]
    ///
    /// # Returns
    /// * `None` - when no samples were added
    pub fn percentile_value(&self, p: f64) -> Option<f64> {
        let mut sorted = self.values.clone();
        sorted.par_sort_unstable_by(f64::total_cmp);
        percentile_of_sorted(&sorted, p)
    }

    /// Freeze into a Distribution
    pub fn build(mut self) -> Distribution {
        if self.values.is_empty() {
            return Distribution::empty();
        }
        self.values.par_sort_unstable_by(f64::total_cmp);
        let sorted = self.values;
        let percentiles = (0..=100u8)
            .filter_map(|percentile| {
                let value = percentile_of_sorted(&sorted, f64::from(percentile))?;
                Some(Percentile {
                    percentile,
                    value,
                    data_point_count: sorted.partition_point(|v| *v <= value) as u64,
                })
            })
            .collect();
        Distribution {
            sample_count: sorted.len() as u64,
            percentiles,
        }
    }
}

/// linear interpolation between closest ranks of an ascending slice
fn percentile_of_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    let pos = p / 100.0 * last as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let fraction = pos - lower as f64;
    Some(sorted[lower] + fraction * (sorted[upper] - sorted[lower]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, -1.0)]
    #[case(1e-7, -1.0)]
    #[case(25.0, 0.0)]
    #[case(50.0, 5.0)]
    #[case(75.0, 50.0)]
    #[case(100.0, 51.0)]
    #[case(10.0, -0.6)]
    fn percentile_value_cases(#[case] p: f64, #[case] expected: f64) {
        let mut builder = DistributionBuilder::new();
        builder.extend([51.0, -1.0, 50.0, 0.0, 5.0]);
        let value = builder.percentile_value(p).unwrap();
        assert!((value - expected).abs() < 1e-6, "p={p} value={value}");
    }

    #[test]
    fn empty_builder() {
        let builder = DistributionBuilder::new();
        assert_eq!(builder.percentile_value(50.0), None);
        assert!(builder.build().is_empty());
    }

    #[test]
    fn non_finite_samples_are_skipped() {
        let mut builder = DistributionBuilder::new();
        builder.add(f64::NAN).add(f64::INFINITY).add(0.5);
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn build_fills_every_percentile() {
        let mut builder = DistributionBuilder::new();
        builder.extend((0..10).map(f64::from));
        let distribution = builder.build();
        assert_eq!(distribution.sample_count(), 10);
        let percentiles = distribution.percentiles();
        assert_eq!(percentiles.len(), 101);
        assert_eq!(percentiles[0].value, 0.0);
        assert_eq!(percentiles[0].data_point_count, 1);
        assert_eq!(percentiles[100].value, 9.0);
        assert_eq!(percentiles[100].data_point_count, 10);
        assert!(percentiles.windows(2).all(|w| w[0].value <= w[1].value));
    }
}
