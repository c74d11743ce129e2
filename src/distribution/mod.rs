pub mod builder;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ArtifactError, ScoringError},
    vectorizer::serde::{read_artifact, write_artifact},
};

pub use builder::DistributionBuilder;

/// One checkpoint of a Distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentile {
    /// 0..=100
    pub percentile: u8,
    /// sample value at this percentile
    pub value: f64,
    /// number of samples less than or equal to `value`
    pub data_point_count: u64,
}

/// Stored form of a Distribution, validated by `Distribution::from_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionData {
    pub sample_count: u64,
    pub percentiles: Vec<Percentile>,
}

/// Distribution
/// Frozen summary of historical raw scores used to turn a raw score into
/// "the fraction of history at or below it".
///
/// Checkpoints sit at integer percentiles; both queries interpolate linearly
/// between the two checkpoints around their input, so
/// `value_at_percentile(quantile_of(x) * 100) ≈ x` for any sampled `x`.
/// Where several checkpoints share a value, `quantile_of` answers with the
/// lowest percentile carrying it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    sample_count: u64,
    percentiles: Vec<Percentile>,
}

impl Distribution {
    /// Distribution with no samples, every query on it fails
    pub fn empty() -> Self {
        Self {
            sample_count: 0,
            percentiles: Vec::new(),
        }
    }

    /// Assemble from checkpoints
    ///
    /// # Returns
    /// * `Err(String)` - when percentiles are not strictly increasing within 0..=100,
    ///   values decrease or are not finite
    pub fn from_data(data: DistributionData) -> Result<Self, String> {
        let DistributionData {
            sample_count,
            percentiles,
        } = data;
        for pair in percentiles.windows(2) {
            if pair[0].percentile >= pair[1].percentile {
                return Err(format!(
                    "percentile {} listed after {}",
                    pair[1].percentile, pair[0].percentile
                ));
            }
            if pair[0].value > pair[1].value {
                return Err(format!(
                    "value {} at p{} is above {} at p{}",
                    pair[0].value, pair[0].percentile, pair[1].value, pair[1].percentile
                ));
            }
        }
        if let Some(bad) = percentiles.iter().find(|p| p.percentile > 100 || !p.value.is_finite()) {
            return Err(format!("invalid checkpoint {bad:?}"));
        }
        Ok(Self {
            sample_count,
            percentiles,
        })
    }

    /// Load a distribution artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let data: DistributionData = read_artifact(path)?;
        Self::from_data(data).map_err(|reason| ArtifactError::Corrupt {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Write a distribution artifact
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        write_artifact(path, self)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.percentiles.is_empty()
    }

    /// Number of samples the distribution was built from
    #[inline]
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    #[inline]
    pub fn percentiles(&self) -> &[Percentile] {
        &self.percentiles
    }

    /// Value at a percentile
    /// `p` is clamped to [0, 100].
    ///
    /// # Returns
    /// * `Err(ScoringError::EmptyDistribution)` - when there are no checkpoints
    pub fn value_at_percentile(&self, p: f64) -> Result<f64, ScoringError> {
        let (_, last) = self.bounds()?;
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
        let top_idx = self.percentiles.partition_point(|k| f64::from(k.percentile) < p);
        let Some(top) = self.percentiles.get(top_idx) else {
            return Ok(last.value);
        };
        if top_idx == 0 || f64::from(top.percentile) == p {
            return Ok(top.value);
        }
        let bottom = &self.percentiles[top_idx - 1];
        let ratio = (p - f64::from(bottom.percentile)) / f64::from(top.percentile - bottom.percentile);
        Ok(bottom.value + ratio * (top.value - bottom.value))
    }

    /// Fraction of history at or below a value, in [0, 1]
    /// Values outside the sampled range clamp to 0 or 1.
    ///
    /// # Returns
    /// * `Err(ScoringError::EmptyDistribution)` - when there are no checkpoints
    pub fn quantile_of(&self, x: f64) -> Result<f64, ScoringError> {
        let (first, last) = self.bounds()?;
        if x.is_nan() || x <= first.value {
            return Ok(f64::from(first.percentile) / 100.0);
        }
        if x >= last.value {
            // 同値が続く場合は一番低いパーセンタイル
            let idx = self.percentiles.partition_point(|k| k.value < last.value);
            return Ok(f64::from(self.percentiles[idx].percentile) / 100.0);
        }
        let top_idx = self.percentiles.partition_point(|k| k.value < x);
        let top = &self.percentiles[top_idx];
        if top.value == x {
            return Ok(f64::from(top.percentile) / 100.0);
        }
        let bottom = &self.percentiles[top_idx - 1];
        let ratio = (x - bottom.value) / (top.value - bottom.value);
        let percentile =
            f64::from(bottom.percentile) + ratio * f64::from(top.percentile - bottom.percentile);
        Ok(percentile / 100.0)
    }

    fn bounds(&self) -> Result<(&Percentile, &Percentile), ScoringError> {
        match (self.percentiles.first(), self.percentiles.last()) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(ScoringError::EmptyDistribution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// fixed so every run samples the same values
    const SAMPLE_SEED: u32 = 0xDEAD_BEEF;

    /// tiny deterministic PRNG (xorshift32)
    struct Rng(u32);
    impl Rng {
        fn new(seed: u32) -> Self { Self(seed) }
        fn next_f64(&mut self) -> f64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x as f64 / u32::MAX as f64
        }
    }

    fn build(values: &[f64]) -> Distribution {
        let mut builder = DistributionBuilder::new();
        builder.extend(values.iter().copied());
        builder.build()
    }

    #[test]
    fn round_trip_on_sampled_values() {
        let mut rng = Rng::new(SAMPLE_SEED);
        // skewed like cosine scores: mostly small, a long tail
        let samples: Vec<f64> = (0..2000).map(|_| rng.next_f64().powi(3)).collect();
        let distribution = build(&samples);
        for &x in &samples {
            let q = distribution.quantile_of(x).unwrap();
            assert!((0.0..=1.0).contains(&q));
            let back = distribution.value_at_percentile(q * 100.0).unwrap();
            assert!((back - x).abs() < 1e-9, "x={x} q={q} back={back}");
        }
    }

    #[test]
    fn round_trip_with_ties() {
        let samples = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.1, 0.1, 0.4, 0.9];
        let distribution = build(&samples);
        for &x in &samples {
            let q = distribution.quantile_of(x).unwrap();
            let back = distribution.value_at_percentile(q * 100.0).unwrap();
            assert!((back - x).abs() < 1e-9, "x={x} q={q} back={back}");
        }
        // flat region answers with its lowest percentile
        assert_eq!(distribution.quantile_of(0.0).unwrap(), 0.0);
    }

    #[test]
    fn quantile_is_monotonic() {
        let mut rng = Rng::new(42);
        let samples: Vec<f64> = (0..300).map(|_| rng.next_f64()).collect();
        let distribution = build(&samples);
        let mut previous = 0.0;
        for i in 0..=1000 {
            let q = distribution.quantile_of(i as f64 / 1000.0).unwrap();
            assert!(q >= previous);
            previous = q;
        }
    }

    #[test]
    fn out_of_range_values_clamp() {
        let distribution = build(&[0.2, 0.4, 0.6]);
        assert_eq!(distribution.quantile_of(-5.0).unwrap(), 0.0);
        assert_eq!(distribution.quantile_of(0.2).unwrap(), 0.0);
        assert_eq!(distribution.quantile_of(0.6).unwrap(), 1.0);
        assert_eq!(distribution.quantile_of(7.0).unwrap(), 1.0);
        assert_eq!(distribution.value_at_percentile(-1.0).unwrap(), 0.2);
        assert_eq!(distribution.value_at_percentile(250.0).unwrap(), 0.6);
    }

    #[test]
    fn value_at_percentile_interpolates() {
        let distribution = build(&[-1.0, 0.0, 5.0, 50.0, 51.0]);
        assert_eq!(distribution.value_at_percentile(0.0).unwrap(), -1.0);
        assert_eq!(distribution.value_at_percentile(25.0).unwrap(), 0.0);
        assert_eq!(distribution.value_at_percentile(50.0).unwrap(), 5.0);
        assert_eq!(distribution.value_at_percentile(75.0).unwrap(), 50.0);
        assert_eq!(distribution.value_at_percentile(100.0).unwrap(), 51.0);
        let mid = distribution.value_at_percentile(62.5).unwrap();
        assert!((mid - 27.5).abs() < 1e-9);
    }

    #[test]
    fn empty_distribution_is_an_error() {
        let distribution = Distribution::empty();
        assert_eq!(distribution.quantile_of(0.5), Err(ScoringError::EmptyDistribution));
        assert_eq!(distribution.value_at_percentile(50.0), Err(ScoringError::EmptyDistribution));
        assert!(build(&[]).is_empty());
    }

    #[test]
    fn single_sample() {
        let distribution = build(&[0.3]);
        assert_eq!(distribution.quantile_of(0.3).unwrap(), 0.0);
        assert_eq!(distribution.quantile_of(0.9).unwrap(), 0.0);
        assert_eq!(distribution.value_at_percentile(40.0).unwrap(), 0.3);
    }

    #[test]
    fn artifact_round_trip_and_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feature.distribution");
        let distribution = build(&[0.1, 0.2, 0.3, 0.5, 0.8]);
        distribution.save(&path).unwrap();
        assert_eq!(Distribution::load(&path).unwrap(), distribution);

        let broken = DistributionData {
            sample_count: 2,
            percentiles: vec![
                Percentile { percentile: 0, value: 0.5, data_point_count: 1 },
                Percentile { percentile: 100, value: 0.1, data_point_count: 2 },
            ],
        };
        write_artifact(&path, &broken).unwrap();
        assert!(matches!(Distribution::load(&path), Err(ArtifactError::Corrupt { .. })));
    }
}
