// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! The full generation pipeline: integrate, blend, extract, permute.
//!
//! The simulation supplies decorrelated inputs via chaotic divergence,
//! the hash supplies uniformity. Neither stage covers for the other, so
//! both always run.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::conditioning;
use crate::ensemble::{Ensemble, GenerationConfig};
use crate::error::Result;

/// Generate `n` floats in [0, 1) from freshly randomized initial
/// conditions. Fails with `Validation` on a bad configuration and with
/// `NumericalInstability` if the simulation turns non-finite; no partial
/// output is ever returned.
pub fn generate(n: usize, n_pendulums: usize, noise_level: f64) -> Result<Vec<f64>> {
    generate_with_config(&GenerationConfig {
        n,
        n_pendulums,
        noise_level,
        seed: None,
    })
}

/// As [`generate`], with explicit seeding available for reproducibility.
pub fn generate_with_config(config: &GenerationConfig) -> Result<Vec<f64>> {
    config.validate()?;
    if config.n == 0 {
        return Ok(Vec::new());
    }
    let mut ensemble = Ensemble::initialize(config)?;
    let mut values = Vec::with_capacity(config.n);
    for _ in 0..config.n {
        ensemble.advance_all()?;
        values.push(conditioning::extract(ensemble.blend()));
    }
    finalize(&mut values);
    Ok(values)
}

/// Apply the final permutation: a Fisher-Yates shuffle keyed by a hash
/// of the sequence itself, so temporal neighbors in the simulation do
/// not stay neighbors in the output. A proper bijection over the index
/// range, linear time, and a no-op for fewer than two elements.
pub fn finalize(values: &mut [f64]) {
    if values.len() < 2 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(conditioning::sequence_key(values));
    values.shuffle(&mut rng);
}
