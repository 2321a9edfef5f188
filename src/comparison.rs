// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Statistical comparison of the pendulum generator against a
//! reference uniform source.

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng, TryRngCore};

use crate::conditioning::u64_to_double;
use crate::ensemble::GenerationConfig;
use crate::error::{Result, TychError};
use crate::generator;
use crate::stats::{self, SampleSummary};
use crate::utils;

/// Where the reference sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Both samples were handed in by the caller.
    Provided,
    /// Read from the operating system entropy source.
    OsEntropy,
    /// OS entropy was unavailable, substituted a clock-seeded PRNG.
    SeededFallback,
}

/// Numeric outcome of one comparison. Rendering is left to whoever
/// consumes this together with the raw samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub ks_statistic: f64,
    pub p_value: f64,
    pub generator: SampleSummary,
    pub reference: SampleSummary,
    pub reference_source: ReferenceSource,
}

/// Compare two samples of any origin: z-normalize both so the test is
/// insensitive to scale, then compute the two-sample KS distance and
/// its significance. Fails with `Validation` when either sample is too
/// small to carry an empirical distribution.
pub fn compare_samples(sample_a: &[f64], sample_b: &[f64]) -> Result<ComparisonResult> {
    if sample_a.len() < 2 || sample_b.len() < 2 {
        return Err(TychError::Validation(format!(
            "comparison needs at least 2 values per sample, got {} and {}",
            sample_a.len(),
            sample_b.len()
        )));
    }
    let a_norm = stats::normalize(sample_a);
    let b_norm = stats::normalize(sample_b);
    let d = stats::ks_statistic(&a_norm, &b_norm);
    Ok(ComparisonResult {
        ks_statistic: d,
        p_value: stats::ks_p_value(d, a_norm.len(), b_norm.len()),
        generator: SampleSummary::describe(sample_a),
        reference: SampleSummary::describe(sample_b),
        reference_source: ReferenceSource::Provided,
    })
}

/// Generate one pipeline sample and one reference sample of size `n`
/// and compare them. If the OS entropy source cannot be read the
/// reference degrades to a clock-seeded PRNG and the result records
/// that substitution instead of hiding it.
pub fn compare(n: usize, n_pendulums: usize, noise_level: f64) -> Result<ComparisonResult> {
    let config = GenerationConfig {
        n,
        n_pendulums,
        noise_level,
        seed: None,
    };
    let sample_a = generator::generate_with_config(&config)?;
    let (sample_b, source) = reference_sample(n);
    let mut result = compare_samples(&sample_a, &sample_b)?;
    result.reference_source = source;
    Ok(result)
}

/// `n` uniform doubles from OS entropy, or from the documented fallback
/// when the OS source fails partway through.
pub fn reference_sample(n: usize) -> (Vec<f64>, ReferenceSource) {
    match os_entropy_sample(n) {
        Ok(sample) => (sample, ReferenceSource::OsEntropy),
        Err(_) => {
            let mut rng = StdRng::seed_from_u64(utils::clock_seed());
            let sample = (0..n).map(|_| u64_to_double(rng.next_u64())).collect();
            (sample, ReferenceSource::SeededFallback)
        }
    }
}

fn os_entropy_sample(n: usize) -> Result<Vec<f64>> {
    let mut sample = Vec::with_capacity(n);
    let mut buf = [0u8; 8];
    for _ in 0..n {
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| TychError::EntropySourceUnavailable(e.to_string()))?;
        sample.push(u64_to_double(u64::from_le_bytes(buf)));
    }
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undersized_samples() {
        assert!(matches!(
            compare_samples(&[0.5], &[0.1, 0.2]),
            Err(TychError::Validation(_))
        ));
        assert!(matches!(
            compare_samples(&[], &[]),
            Err(TychError::Validation(_))
        ));
    }

    #[test]
    fn identical_samples_have_zero_distance() {
        let sample: Vec<f64> = (0..100).map(|i| i as f64 / 100.0).collect();
        let result = compare_samples(&sample, &sample).unwrap();
        assert_eq!(result.ks_statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[test]
    fn reference_sample_is_uniform_in_unit_interval() {
        let (sample, _) = reference_sample(2000);
        assert_eq!(sample.len(), 2000);
        assert!(sample.iter().all(|x| (0.0..1.0).contains(x)));
        let summary = SampleSummary::describe(&sample);
        assert!((summary.mean - 0.5).abs() < 0.05);
    }

    #[test]
    fn generator_tracks_the_reference_distribution() {
        let result = compare(1000, 3, 0.01).unwrap();
        assert!((0.0..=1.0).contains(&result.ks_statistic));
        assert!((0.0..=1.0).contains(&result.p_value));
        assert!(
            result.ks_statistic < 0.1,
            "generator grossly non-uniform: D = {}",
            result.ks_statistic
        );
        assert_eq!(result.generator.len, 1000);
        assert_eq!(result.reference.len, 1000);
        assert!(result.generator.min >= 0.0 && result.generator.max < 1.0);
    }
}
