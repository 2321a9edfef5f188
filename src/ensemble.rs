// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Lockstep simulation of several pendulums and state blending.

use std::f64::consts::FRAC_PI_2;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{Result, TychError};
use crate::pendulum::{self, PendulumParams, PendulumState};
use crate::utils;

pub const DEFAULT_N_PENDULUMS: usize = 3;
pub const DEFAULT_NOISE_LEVEL: f64 = 0.01;

/// Members start as perturbations of one base condition no larger than this.
const PERTURBATION: f64 = 1e-3;
/// Blended values are clamped into this symmetric range.
const MAX_MIX: f64 = 1000.0;

/// Immutable parameters for one generation call.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Output sequence length. Zero is valid and produces no simulation.
    pub n: usize,
    pub n_pendulums: usize,
    pub noise_level: f64,
    /// `Some` makes initial conditions and noise reproducible.
    /// `None` draws them from OS entropy.
    pub seed: Option<u64>,
}

impl GenerationConfig {
    pub fn new(n: usize) -> Self {
        GenerationConfig {
            n,
            n_pendulums: DEFAULT_N_PENDULUMS,
            noise_level: DEFAULT_NOISE_LEVEL,
            seed: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_pendulums < 1 {
            return Err(TychError::Validation(format!(
                "n_pendulums must be at least 1, got {}",
                self.n_pendulums
            )));
        }
        if !self.noise_level.is_finite() || self.noise_level < 0.0 {
            return Err(TychError::Validation(format!(
                "noise_level must be finite and non-negative, got {}",
                self.noise_level
            )));
        }
        Ok(())
    }
}

/// Owns `n_pendulums` independent pendulum states and advances them in
/// lockstep. Each ensemble owns its states and RNG exclusively, so
/// independent generation calls never share mutable state.
pub struct Ensemble {
    params: PendulumParams,
    states: Vec<PendulumState>,
    noise: Normal<f64>,
    rng: StdRng,
    steps: usize,
}

impl Ensemble {
    /// Build an ensemble from a validated config. One base initial
    /// condition is drawn in the moderate ranges, then every member gets
    /// small independent offsets so the members decorrelate through
    /// chaotic divergence instead of starting identical.
    pub fn initialize(config: &GenerationConfig) -> Result<Ensemble> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => utils::entropy_rng(),
        };
        let base = PendulumState {
            theta1: rng.random_range(-FRAC_PI_2..FRAC_PI_2),
            theta2: rng.random_range(-FRAC_PI_2..FRAC_PI_2),
            omega1: rng.random_range(-2.0..2.0),
            omega2: rng.random_range(-2.0..2.0),
        };
        let states = (0..config.n_pendulums)
            .map(|_| PendulumState {
                theta1: base.theta1 + rng.random_range(-PERTURBATION..PERTURBATION),
                theta2: base.theta2 + rng.random_range(-PERTURBATION..PERTURBATION),
                omega1: base.omega1 + rng.random_range(-PERTURBATION..PERTURBATION),
                omega2: base.omega2 + rng.random_range(-PERTURBATION..PERTURBATION),
            })
            .collect();
        let noise = Normal::new(0.0, config.noise_level)
            .map_err(|e| TychError::Validation(format!("noise_level: {e}")))?;
        Ok(Ensemble {
            params: PendulumParams::default(),
            states,
            noise,
            rng,
            steps: 0,
        })
    }

    /// One synchronized integration step of every member.
    /// The first member that turns non-finite aborts the whole call.
    pub fn advance_all(&mut self) -> Result<()> {
        self.steps += 1;
        for (idx, state) in self.states.iter_mut().enumerate() {
            let next = pendulum::step(&self.params, state);
            if !next.is_finite() {
                return Err(TychError::NumericalInstability {
                    pendulum: idx,
                    step: self.steps,
                });
            }
            *state = next;
        }
        Ok(())
    }

    /// Collapse all member states into one raw seed value: a bounded
    /// trigonometric mix of every state scalar plus one Gaussian noise
    /// draw scaled by the configured noise level.
    pub fn blend(&mut self) -> f64 {
        let mut mix = 0.0;
        for s in &self.states {
            mix += s.theta1.sin() + s.theta2.cos() + 0.1 * s.omega1.sin() + 0.1 * s.omega2.cos();
        }
        mix += self.noise.sample(&mut self.rng);
        mix.clamp(-MAX_MIX, MAX_MIX)
    }

    #[cfg(test)]
    pub fn states_mut(&mut self) -> &mut [PendulumState] {
        &mut self.states
    }
}
