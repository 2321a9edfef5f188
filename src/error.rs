// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Error types shared across the generation and comparison pipelines.

use thiserror::Error;

/// Errors raised by the generation pipeline and comparison engine.
#[derive(Debug, Error, PartialEq)]
pub enum TychError {
    /// Rejected configuration before any simulation work was done.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// Integration produced a non-finite state.
    /// Fatal for the whole call, no partial output is returned.
    #[error("numerical instability: pendulum {pendulum} became non-finite at step {step}")]
    NumericalInstability { pendulum: usize, step: usize },
    /// The OS entropy source could not be read.
    #[error("entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TychError>;
