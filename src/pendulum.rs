// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Double pendulum equations of motion and fixed-step RK4 integration.

use std::f64::consts::PI;

/// Hard ceiling on angular velocity (rad/s).
pub const MAX_OMEGA: f64 = 50.0;
/// Hard ceiling on angular acceleration (rad/s^2).
pub const MAX_ACCELERATION: f64 = 1000.0;
/// Denominators are pushed away from zero by this amount.
const MIN_DENOMINATOR: f64 = 1e-6;

/// Physical parameters of the two-link pendulum and its integration step.
#[derive(Debug, Copy, Clone)]
pub struct PendulumParams {
    pub m1: f64,
    pub m2: f64,
    pub l1: f64,
    pub l2: f64,
    pub g: f64,
    pub dt: f64,
    /// Velocity retention factor applied once per step.
    pub damping: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        PendulumParams {
            m1: 1.0,
            m2: 1.0,
            l1: 1.0,
            l2: 1.0,
            g: 9.81,
            dt: 0.0005,
            damping: 0.999,
        }
    }
}

/// Full mechanical state of one double pendulum.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PendulumState {
    pub theta1: f64,
    pub theta2: f64,
    pub omega1: f64,
    pub omega2: f64,
}

impl PendulumState {
    pub fn is_finite(&self) -> bool {
        self.theta1.is_finite()
            && self.theta2.is_finite()
            && self.omega1.is_finite()
            && self.omega2.is_finite()
    }
}

/// Time derivatives (dtheta1, dtheta2, domega1, domega2) of the state.
/// Denominators are bounded and accelerations clamped so a single
/// evaluation can never overflow on its own.
fn derivatives(p: &PendulumParams, s: &PendulumState) -> [f64; 4] {
    let delta = s.theta2 - s.theta1;
    let cos_delta = delta.cos();
    let sin_delta = delta.sin();

    let mut den1 = (p.m1 + p.m2) * p.l1 - p.m2 * p.l1 * cos_delta * cos_delta;
    if den1.abs() < MIN_DENOMINATOR {
        den1 = MIN_DENOMINATOR.copysign(den1);
    }
    let mut den2 = (p.l2 / p.l1) * den1;
    if den2.abs() < MIN_DENOMINATOR {
        den2 = MIN_DENOMINATOR.copysign(den2);
    }

    let a1 = (p.m2 * p.l1 * s.omega1 * s.omega1 * sin_delta * cos_delta
        + p.m2 * p.g * s.theta2.sin() * cos_delta
        + p.m2 * p.l2 * s.omega2 * s.omega2 * sin_delta
        - (p.m1 + p.m2) * p.g * s.theta1.sin())
        / den1;
    let a2 = (-p.m2 * p.l2 * s.omega2 * s.omega2 * sin_delta * cos_delta
        + (p.m1 + p.m2) * p.g * s.theta1.sin() * cos_delta
        - (p.m1 + p.m2) * p.l1 * s.omega1 * s.omega1 * sin_delta
        - (p.m1 + p.m2) * p.g * s.theta2.sin())
        / den2;

    let a1 = if a1.is_finite() {
        a1.clamp(-MAX_ACCELERATION, MAX_ACCELERATION)
    } else {
        0.0
    };
    let a2 = if a2.is_finite() {
        a2.clamp(-MAX_ACCELERATION, MAX_ACCELERATION)
    } else {
        0.0
    };

    [s.omega1, s.omega2, a1, a2]
}

/// One classic fourth-order Runge-Kutta step of size `p.dt`.
fn rk4(p: &PendulumParams, s: &PendulumState) -> PendulumState {
    let dt = p.dt;
    let at = |s: &PendulumState, k: &[f64; 4], h: f64| PendulumState {
        theta1: s.theta1 + h * k[0],
        theta2: s.theta2 + h * k[1],
        omega1: s.omega1 + h * k[2],
        omega2: s.omega2 + h * k[3],
    };
    let k1 = derivatives(p, s);
    let k2 = derivatives(p, &at(s, &k1, 0.5 * dt));
    let k3 = derivatives(p, &at(s, &k2, 0.5 * dt));
    let k4 = derivatives(p, &at(s, &k3, dt));
    PendulumState {
        theta1: s.theta1 + (dt / 6.0) * (k1[0] + 2.0 * k2[0] + 2.0 * k3[0] + k4[0]),
        theta2: s.theta2 + (dt / 6.0) * (k1[1] + 2.0 * k2[1] + 2.0 * k3[1] + k4[1]),
        omega1: s.omega1 + (dt / 6.0) * (k1[2] + 2.0 * k2[2] + 2.0 * k3[2] + k4[2]),
        omega2: s.omega2 + (dt / 6.0) * (k1[3] + 2.0 * k2[3] + 2.0 * k3[3] + k4[3]),
    }
}

/// Wrap an angle into [-pi, pi).
fn wrap_angle(theta: f64) -> f64 {
    (theta + PI).rem_euclid(2.0 * PI) - PI
}

/// Advance one pendulum by a single step: RK4 integration, then
/// damping, angle normalization and velocity clamping.
/// Deterministic given identical input. Finiteness of the result is
/// checked by the ensemble, which aborts the whole call on violation.
pub fn step(p: &PendulumParams, s: &PendulumState) -> PendulumState {
    let next = rk4(p, s);
    PendulumState {
        theta1: wrap_angle(next.theta1),
        theta2: wrap_angle(next.theta2),
        omega1: (next.omega1 * p.damping).clamp(-MAX_OMEGA, MAX_OMEGA),
        omega2: (next.omega2 * p.damping).clamp(-MAX_OMEGA, MAX_OMEGA),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> PendulumState {
        PendulumState {
            theta1: 1.2,
            theta2: -0.7,
            omega1: 0.5,
            omega2: -1.5,
        }
    }

    #[test]
    fn step_is_deterministic() {
        let p = PendulumParams::default();
        let s = sample_state();
        assert_eq!(step(&p, &s), step(&p, &s));
    }

    #[test]
    fn step_stays_finite_over_many_iterations() {
        let p = PendulumParams::default();
        let mut s = sample_state();
        for _ in 0..20_000 {
            s = step(&p, &s);
            assert!(s.is_finite());
            assert!(s.omega1.abs() <= MAX_OMEGA);
            assert!(s.omega2.abs() <= MAX_OMEGA);
        }
    }

    #[test]
    fn angles_stay_wrapped() {
        let p = PendulumParams::default();
        let mut s = PendulumState {
            theta1: 3.0,
            theta2: -3.0,
            omega1: 40.0,
            omega2: -40.0,
        };
        for _ in 0..5_000 {
            s = step(&p, &s);
            assert!((-PI..PI).contains(&s.theta1));
            assert!((-PI..PI).contains(&s.theta2));
        }
    }

    #[test]
    fn step_actually_moves_the_state() {
        let p = PendulumParams::default();
        let s = sample_state();
        assert_ne!(step(&p, &s), s);
    }

    #[test]
    fn is_finite_rejects_nan_and_inf() {
        let mut s = sample_state();
        assert!(s.is_finite());
        s.omega2 = f64::NAN;
        assert!(!s.is_finite());
        s.omega2 = f64::INFINITY;
        assert!(!s.is_finite());
    }
}
