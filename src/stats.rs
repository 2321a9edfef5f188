// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Collection of methods for statistical analysis of numeric samples.

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{Result, TychError};

/// Size, moments and range of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    pub len: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SampleSummary {
    pub fn describe(sample: &[f64]) -> SampleSummary {
        let len = sample.len();
        if len == 0 {
            return SampleSummary {
                len: 0,
                mean: f64::NAN,
                std_dev: f64::NAN,
                min: f64::NAN,
                max: f64::NAN,
            };
        }
        let mean = sample.iter().sum::<f64>() / len as f64;
        let variance = sample.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / len as f64;
        let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        SampleSummary {
            len,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }
}

/// Shift and scale a sample to zero mean and unit standard deviation.
/// A zero standard deviation is bumped to a tiny positive value so a
/// constant sample normalizes instead of dividing by zero.
pub fn normalize(sample: &[f64]) -> Vec<f64> {
    let summary = SampleSummary::describe(sample);
    let std_dev = if summary.std_dev == 0.0 {
        1e-10
    } else {
        summary.std_dev
    };
    sample.iter().map(|x| (x - summary.mean) / std_dev).collect()
}

/// Two-sample Kolmogorov-Smirnov D statistic: the largest vertical
/// distance between the two empirical CDFs, found with a sorted merge
/// walk over both samples. Both cursors consume a whole tie run before
/// the distance is read, so values shared across samples do not
/// inflate the statistic.
pub fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    use std::cmp::Ordering;

    let mut sa = a.to_vec();
    let mut sb = b.to_vec();
    sa.sort_by(f64::total_cmp);
    sb.sort_by(f64::total_cmp);
    let (na, nb) = (sa.len() as f64, sb.len() as f64);
    let (mut i, mut j) = (0usize, 0usize);
    let mut d: f64 = 0.0;
    while i < sa.len() && j < sb.len() {
        let v = if sa[i].total_cmp(&sb[j]) == Ordering::Greater {
            sb[j]
        } else {
            sa[i]
        };
        while i < sa.len() && sa[i].total_cmp(&v).is_le() {
            i += 1;
        }
        while j < sb.len() && sb[j].total_cmp(&v).is_le() {
            j += 1;
        }
        d = d.max((i as f64 / na - j as f64 / nb).abs());
    }
    d
}

/// Significance of a two-sample D statistic via the asymptotic
/// Kolmogorov distribution with the usual small-sample correction
/// on the effective sample size.
pub fn ks_p_value(d: f64, n_a: usize, n_b: usize) -> f64 {
    let ne = (n_a * n_b) as f64 / (n_a + n_b) as f64;
    let sqrt_ne = ne.sqrt();
    kolmogorov_survival((sqrt_ne + 0.12 + 0.11 / sqrt_ne) * d)
}

/// Complement of the Kolmogorov CDF: 2 * sum (-1)^(k-1) exp(-2 k^2 x^2).
fn kolmogorov_survival(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let term = (-2.0 * (k * k) as f64 * lambda * lambda).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Get p value for given degrees of freedom and chi squared value.
fn chi_squared_p_value(df: u32, chi_squared: f64) -> f64 {
    let chi_squared_dist = ChiSquared::new(df as f64).unwrap();
    chi_squared_dist.cdf(chi_squared)
}

/// Chi-squared uniformity test over equal-width bins of [0, 1).
/// Returns chi2 statistic, p value.
pub fn bin_uniformity_test(sample: &[f64], bins: usize) -> Result<(f64, f64)> {
    if bins < 2 || sample.len() < bins {
        return Err(TychError::Validation(format!(
            "uniformity test needs at least 2 bins and one sample per bin, got {} bins for {} samples",
            bins,
            sample.len()
        )));
    }
    let counts = bin_counts(sample, bins, 0.0, 1.0);
    let expected = sample.len() as f64 / bins as f64;
    let chi_squared = counts
        .iter()
        .map(|&c| (c as f64 - expected).powi(2) / expected)
        .sum();
    let p = 1.0 - chi_squared_p_value(bins as u32 - 1, chi_squared);
    Ok((chi_squared, p))
}

/// Histogram density estimate over `bins` equal-width bins of
/// [lo, hi), normalized so the bin areas sum to one. Out-of-range
/// values are dropped. This is the numeric payload an external
/// plotting collaborator renders.
pub fn histogram_density(sample: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<f64> {
    let counts = bin_counts(sample, bins, lo, hi);
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; bins];
    }
    let width = (hi - lo) / bins as f64;
    counts
        .iter()
        .map(|&c| c as f64 / (total as f64 * width))
        .collect()
}

fn bin_counts(sample: &[f64], bins: usize, lo: f64, hi: f64) -> Vec<usize> {
    let mut counts = vec![0usize; bins];
    let width = (hi - lo) / bins as f64;
    for &x in sample {
        if x >= lo && x < hi {
            let idx = (((x - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditioning::u64_to_double;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    fn uniform_sample(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| u64_to_double(rng.next_u64())).collect()
    }

    #[test]
    fn summary_of_known_values() {
        let s = SampleSummary::describe(&[0.0, 0.5, 1.0]);
        assert_eq!(s.len, 3);
        assert!((s.mean - 0.5).abs() < 1e-12);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 1.0);
        assert!(s.std_dev > 0.0);
    }

    #[test]
    fn summary_of_empty_sample_is_nan() {
        let s = SampleSummary::describe(&[]);
        assert_eq!(s.len, 0);
        assert!(s.mean.is_nan());
    }

    #[test]
    fn normalize_centers_and_scales() {
        let normed = normalize(&uniform_sample(1, 2000));
        let s = SampleSummary::describe(&normed);
        assert!(s.mean.abs() < 1e-9);
        assert!((s.std_dev - 1.0).abs() < 1e-9);
    }

    #[test]
    fn normalize_guards_constant_samples() {
        let normed = normalize(&[0.4; 8]);
        assert!(normed.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn ks_of_identical_samples_is_zero() {
        let a = uniform_sample(3, 500);
        assert_eq!(ks_statistic(&a, &a), 0.0);
    }

    #[test]
    fn ks_of_disjoint_samples_is_one() {
        let a = vec![0.1, 0.2, 0.3];
        let b = vec![5.0, 6.0, 7.0];
        assert!((ks_statistic(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ks_ignores_ties_shared_across_samples() {
        // Both ECDFs are 1/2 on [-1, 1) and 1 from 1 on, so D is 0.
        let a = vec![-1.0, -1.0, 1.0, 1.0];
        let b = vec![-1.0, -1.0, -1.0, 1.0, 1.0, 1.0];
        assert_eq!(ks_statistic(&a, &b), 0.0);
    }

    #[test]
    fn ks_still_sees_distance_past_a_tie() {
        // ECDFs agree at 0 but split at 1: 1.0 vs 0.5.
        let a = vec![0.0, 1.0];
        let b = vec![0.0, 2.0];
        assert!((ks_statistic(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn ks_of_independent_uniform_samples_is_small() {
        let a = uniform_sample(10, 1000);
        let b = uniform_sample(11, 1000);
        let d = ks_statistic(&a, &b);
        assert!(d > 0.0);
        assert!(d < 0.1, "uniform-vs-uniform D unexpectedly large: {d}");
    }

    #[test]
    fn ks_p_value_stays_in_range() {
        for d in [0.0, 0.01, 0.05, 0.3, 1.0] {
            let p = ks_p_value(d, 500, 500);
            assert!((0.0..=1.0).contains(&p), "p out of range for d={d}: {p}");
        }
        assert_eq!(ks_p_value(0.0, 100, 100), 1.0);
        assert!(ks_p_value(1.0, 100, 100) < 1e-6);
    }

    #[test]
    fn uniformity_test_accepts_uniform_data() {
        let (chi2, p) = bin_uniformity_test(&uniform_sample(5, 4000), 16).unwrap();
        assert!(chi2 >= 0.0);
        assert!(p > 1e-4, "uniform sample flagged as non-uniform: p={p}");
    }

    #[test]
    fn uniformity_test_rejects_underfilled_input() {
        assert!(bin_uniformity_test(&[0.5; 4], 10).is_err());
    }

    #[test]
    fn histogram_density_integrates_to_one() {
        let density = histogram_density(&uniform_sample(9, 3000), 10, 0.0, 1.0);
        let area: f64 = density.iter().map(|d| d * 0.1).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }
}
