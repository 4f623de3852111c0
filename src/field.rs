// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Explicit fixed-step integrator for the driven scalar field.
//!
//! Integrates
//!
//!   dΦ/dτ = (1 + A(Φ)) · (S(τ) + G(Φ, τ))
//!
//! with a forward-Euler step on the grid t[i] = i · δτ, i < floor(T / δτ):
//!
//!   Φ[i+1] = Φ[i] + δτ · (1 + A(Φ[i])) · (S(t[i]) + G(Φ[i], t[i]))
//!
//! There is no step-size control and no stability check. For the default
//! linear terms the scheme stays bounded for δτ well below 1/0.05.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::source::SourceTerm;

/// Feedback term G(Φ, t).
pub trait Feedback {
    fn eval(&self, phi: f64, t: f64) -> f64;
}

/// Multiplicative nonlinearity A(Φ).
pub trait Nonlinearity {
    fn eval(&self, phi: f64) -> f64;
}

/// Linear damping G(Φ, t) = −rate · Φ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDamping {
    pub rate: f64,
}

impl Default for LinearDamping {
    fn default() -> Self {
        Self { rate: 0.05 }
    }
}

impl Feedback for LinearDamping {
    fn eval(&self, phi: f64, _t: f64) -> f64 {
        -self.rate * phi
    }
}

/// Linear gain A(Φ) = coefficient · Φ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearGain {
    pub coefficient: f64,
}

impl Default for LinearGain {
    fn default() -> Self {
        Self { coefficient: 0.1 }
    }
}

impl Nonlinearity for LinearGain {
    fn eval(&self, phi: f64) -> f64 {
        self.coefficient * phi
    }
}

/// Classical field samples on a uniform time grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldTrajectory {
    /// Grid points, uniformly spaced over [0, T].
    pub times: Vec<f64>,
    /// Field value Φ at each grid point.
    pub values: Vec<f64>,
}

impl FieldTrajectory {
    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// True if no value has blown up to NaN or ±Inf.
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }
}

/// Largest grid a `Vec<f64>` can hold.
const MAX_FIELD_STEPS: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// `n` points `0, step, 2·step, …`, so consecutive points are exactly one
/// integrator step apart.
pub fn step_grid(step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 * step).collect()
}

/// Number of classical grid points, `floor(T / δτ)`, but never below one.
///
/// Fails if the ratio does not fit in memory as a grid.
pub fn field_steps(t_total: f64, delta_tau: f64) -> Result<usize> {
    let ratio = (t_total / delta_tau).floor();
    if !(ratio < MAX_FIELD_STEPS as f64) {
        return Err(Error::invalid_parameter(
            "delta_tau",
            format!(
                "T / delta_tau = {:e} exceeds the largest supported grid",
                t_total / delta_tau
            ),
        ));
    }
    Ok((ratio as usize).max(1))
}

/// Forward-Euler integrator for the scalar field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldIntegrator {
    /// Total duration T.
    pub t_total: f64,
    /// Step size δτ.
    pub delta_tau: f64,
    /// Initial value Φ₀.
    pub phi_0: f64,
}

impl FieldIntegrator {
    pub fn new(t_total: f64, delta_tau: f64, phi_0: f64) -> Result<Self> {
        let integrator = Self {
            t_total,
            delta_tau,
            phi_0,
        };
        integrator.validate()?;
        Ok(integrator)
    }

    pub fn validate(&self) -> Result<()> {
        crate::validation::validate_positive("T", self.t_total)?;
        crate::validation::validate_positive("delta_tau", self.delta_tau)?;
        if !self.phi_0.is_finite() {
            return Err(Error::invalid_parameter(
                "Phi_0",
                format!("must be finite, got {}", self.phi_0),
            ));
        }
        Ok(())
    }

    /// Integrate the field over [0, T].
    ///
    /// The source is sampled once per step, at the left grid point.
    pub fn integrate<S, G, A>(
        &self,
        source: &mut S,
        feedback: &G,
        nonlinearity: &A,
    ) -> Result<FieldTrajectory>
    where
        S: SourceTerm + ?Sized,
        G: Feedback + ?Sized,
        A: Nonlinearity + ?Sized,
    {
        self.validate()?;

        let n = field_steps(self.t_total, self.delta_tau)?;
        let times = step_grid(self.delta_tau, n);
        let mut values = vec![0.0; n];
        values[0] = self.phi_0;

        for i in 0..n.saturating_sub(1) {
            let t = times[i];
            let phi = values[i];
            let drive = source.sample(t) + feedback.eval(phi, t);
            values[i + 1] = phi + self.delta_tau * (1.0 + nonlinearity.eval(phi)) * drive;
        }

        let trajectory = FieldTrajectory { times, values };
        if !trajectory.is_finite() {
            warn!(
                delta_tau = self.delta_tau,
                "Field trajectory diverged; reduce delta_tau"
            );
        }
        debug!(steps = n, phi_final = trajectory.values[n - 1], "Field integrated");

        Ok(trajectory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ConstantSource, GlitchNoise};
    use approx::assert_relative_eq;

    #[test]
    fn test_step_grid_spacing() {
        let grid = step_grid(0.01, 1000);
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid[0], 0.0);
        assert_relative_eq!(grid[1], 0.01);
        assert_relative_eq!(grid[999], 9.99, epsilon = 1e-12);
        assert!(grid.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_step_grid_degenerate() {
        assert!(step_grid(0.5, 0).is_empty());
        assert_eq!(step_grid(0.5, 1), vec![0.0]);
        assert_eq!(step_grid(0.5, 2), vec![0.0, 0.5]);
    }

    #[test]
    fn test_field_steps_bounds() {
        assert_eq!(field_steps(1.0, 0.5).unwrap(), 2);
        assert_eq!(field_steps(0.2, 0.5).unwrap(), 1);
        assert!(matches!(
            field_steps(1e300, 1e-300),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_oversized_grid_rejected_before_allocation() {
        let integ = FieldIntegrator::new(1e300, 1e-300, 0.0).unwrap();
        let result = integ.integrate(
            &mut ConstantSource::zero(),
            &LinearDamping::default(),
            &LinearGain::default(),
        );
        assert!(matches!(result, Err(Error::InvalidParameter { .. })));
    }

    #[test]
    fn test_two_step_grid_spaced_by_delta_tau() {
        let integ = FieldIntegrator::new(1.0, 0.5, 0.0).unwrap();
        let traj = integ
            .integrate(
                &mut ConstantSource::zero(),
                &LinearDamping::default(),
                &LinearGain::default(),
            )
            .unwrap();
        assert_eq!(traj.times, vec![0.0, 0.5]);
        assert_eq!(traj.values, vec![0.0, 0.0]);
    }

    #[test]
    fn test_grid_length_is_floor_t_over_dtau() {
        for &(t, dtau) in &[(10.0, 0.01), (1.0, 0.3), (2.5, 0.5), (7.0, 0.07)] {
            let integ = FieldIntegrator::new(t, dtau, 0.0).unwrap();
            let traj = integ
                .integrate(
                    &mut ConstantSource::zero(),
                    &LinearDamping::default(),
                    &LinearGain::default(),
                )
                .unwrap();
            let expected = (t / dtau).floor() as usize;
            assert_eq!(traj.len(), expected, "T={t}, dtau={dtau}");
            assert_eq!(traj.times[0], 0.0);
            assert!(traj.times.windows(2).all(|w| w[1] > w[0]));
        }
    }

    #[test]
    fn test_zero_forcing_is_fixed_point() {
        let integ = FieldIntegrator::new(10.0, 0.01, 0.0).unwrap();
        let traj = integ
            .integrate(
                &mut ConstantSource::zero(),
                &LinearDamping::default(),
                &LinearGain::default(),
            )
            .unwrap();
        assert!(traj.values.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_single_step_recurrence() {
        // Φ1 = Φ0 + δτ (1 + 0.1 Φ0)(S − 0.05 Φ0)
        let integ = FieldIntegrator::new(1.0, 0.5, 2.0).unwrap();
        let traj = integ
            .integrate(
                &mut ConstantSource(1.0),
                &LinearDamping::default(),
                &LinearGain::default(),
            )
            .unwrap();
        assert_eq!(traj.values.len(), 2);
        let expected = 2.0 + 0.5 * (1.0 + 0.2) * (1.0 - 0.1);
        assert_relative_eq!(traj.values[1], expected, epsilon = 1e-14);
    }

    #[test]
    fn test_pure_damping_decays() {
        let integ = FieldIntegrator::new(20.0, 0.01, 1.0).unwrap();
        let no_gain = LinearGain { coefficient: 0.0 };
        let traj = integ
            .integrate(&mut ConstantSource::zero(), &LinearDamping::default(), &no_gain)
            .unwrap();
        let last = *traj.values.last().unwrap();
        // Euler: (1 − 0.05 δτ)^(n−1)
        let expected = (1.0 - 0.05 * 0.01_f64).powi(traj.len() as i32 - 1);
        assert_relative_eq!(last, expected, epsilon = 1e-12);
        assert!(last < 1.0);
    }

    #[test]
    fn test_t_equal_to_step_gives_single_point() {
        let integ = FieldIntegrator::new(0.5, 0.5, 3.0).unwrap();
        let traj = integ
            .integrate(
                &mut GlitchNoise::seeded(0),
                &LinearDamping::default(),
                &LinearGain::default(),
            )
            .unwrap();
        assert_eq!(traj.times, vec![0.0]);
        assert_eq!(traj.values, vec![3.0]);
    }

    #[test]
    fn test_t_shorter_than_step_gives_initial_condition() {
        let integ = FieldIntegrator::new(0.2, 0.5, -1.0).unwrap();
        let traj = integ
            .integrate(
                &mut ConstantSource(5.0),
                &LinearDamping::default(),
                &LinearGain::default(),
            )
            .unwrap();
        assert_eq!(traj.values, vec![-1.0]);
    }

    #[test]
    fn test_source_called_once_per_step() {
        let integ = FieldIntegrator::new(1.0, 0.1, 0.0).unwrap();
        let mut calls = Vec::new();
        let mut recording = |t: f64| {
            calls.push(t);
            0.0
        };
        let traj = integ
            .integrate(&mut recording, &LinearDamping::default(), &LinearGain::default())
            .unwrap();
        assert_eq!(calls.len(), traj.len() - 1);
        assert_eq!(calls[..], traj.times[..traj.len() - 1]);
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(matches!(
            FieldIntegrator::new(0.0, 0.1, 0.0),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(FieldIntegrator::new(1.0, -0.1, 0.0).is_err());
        assert!(FieldIntegrator::new(f64::NAN, 0.1, 0.0).is_err());
        assert!(FieldIntegrator::new(1.0, 0.1, f64::INFINITY).is_err());
    }
}
