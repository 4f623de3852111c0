// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! RK4 integrator for the time-dependent Schrödinger equation.
//!
//! Integrates d|ψ⟩/dt = −i H(t) |ψ⟩ using classical 4th-order Runge–Kutta.
//! The Hamiltonian is piecewise constant: H is rebuilt from the forcing value
//! at each outer step and held fixed across the four stages.
//!
//! RK4 is not unitary, so the norm drifts by O(dt⁵) per step. The state is
//! deliberately not renormalised; `QuantumTrajectory::norms` records the drift.
//!
//! Ref: Press et al., "Numerical Recipes" (2007), §17.1.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{Error, Result};
use crate::hamiltonian::HamiltonianBuilder;

/// Single RK4 step for d|ψ⟩/dt = −i H |ψ⟩ with constant H.
///
///   k1 = −i dt H ψ
///   k2 = −i dt H (ψ + k1/2)
///   k3 = −i dt H (ψ + k2/2)
///   k4 = −i dt H (ψ + k3)
///   ψ' = ψ + (k1 + 2k2 + 2k3 + k4)/6
pub fn rk4_step(
    psi: &Array1<Complex64>,
    hamiltonian: &Array2<Complex64>,
    dt: f64,
) -> Array1<Complex64> {
    let minus_i_dt = Complex64::new(0.0, -dt);
    let half = Complex64::new(0.5, 0.0);
    let two = Complex64::new(2.0, 0.0);
    let sixth = Complex64::new(1.0 / 6.0, 0.0);

    let k1 = hamiltonian.dot(psi) * minus_i_dt;
    let k2 = hamiltonian.dot(&(psi + &(&k1 * half))) * minus_i_dt;
    let k3 = hamiltonian.dot(&(psi + &(&k2 * half))) * minus_i_dt;
    let k4 = hamiltonian.dot(&(psi + &k3)) * minus_i_dt;

    psi + &((k1 + &k2 * two + &k3 * two + k4) * sixth)
}

/// Euclidean norm ‖ψ‖.
pub fn norm(psi: &Array1<Complex64>) -> f64 {
    psi.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt()
}

/// ψ / ‖ψ‖. Fails on the zero vector.
pub fn normalize(psi: &Array1<Complex64>) -> Result<Array1<Complex64>> {
    let n = norm(psi);
    if n == 0.0 || !n.is_finite() {
        return Err(Error::invalid_parameter(
            "psi",
            format!("cannot normalize a state with norm {n}"),
        ));
    }
    Ok(psi.mapv(|z| z / n))
}

/// Product state |a⟩ ⊗ |b⟩.
pub fn product_state(a: &Array1<Complex64>, b: &Array1<Complex64>) -> Array1<Complex64> {
    let mut out = Array1::zeros(a.len() * b.len());
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i * b.len() + j] = ai * bj;
        }
    }
    out
}

/// Computational basis vector |k⟩ in dimension `dim`.
pub fn basis_state(dim: usize, k: usize) -> Array1<Complex64> {
    let mut psi = Array1::zeros(dim);
    if k < dim {
        psi[k] = Complex64::new(1.0, 0.0);
    }
    psi
}

/// Points `start, start + step, …` strictly below `stop`.
///
/// Length is `ceil((stop − start) / step)`, the half-open `arange` convention.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(stop > start) {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Output of a piecewise-constant Schrödinger evolution.
#[derive(Debug, Clone)]
pub struct QuantumTrajectory {
    /// Grid points at which H was rebuilt, `arange(0, T, dt)`.
    pub times: Vec<f64>,
    /// Initial state followed by one state per grid point.
    pub states: Vec<Array1<Complex64>>,
    /// ‖ψ‖ of every entry in `states`.
    pub norms: Vec<f64>,
}

impl QuantumTrajectory {
    /// Largest |‖ψ‖ − 1| over the trajectory.
    pub fn max_norm_drift(&self) -> f64 {
        self.norms
            .iter()
            .map(|n| (n - 1.0).abs())
            .fold(0.0, f64::max)
    }

    /// The last recorded state.
    pub fn final_state(&self) -> Option<&Array1<Complex64>> {
        self.states.last()
    }
}

/// Evolve `psi0` over [0, T) with one RK4 step per grid point.
///
/// # Arguments
/// * `psi0` — Initial state, length `builder.dim()`.
/// * `builder` — Produces H(f) for each forcing value.
/// * `forcing` — Forcing value per grid point; must cover the whole grid.
///   Entries past the grid length are ignored.
/// * `t_total` — Duration T.
/// * `dt` — Step size.
pub fn evolve(
    psi0: &Array1<Complex64>,
    builder: &HamiltonianBuilder,
    forcing: &[f64],
    t_total: f64,
    dt: f64,
) -> Result<QuantumTrajectory> {
    crate::validation::validate_positive("T", t_total)?;
    crate::validation::validate_positive("dt", dt)?;

    if psi0.len() != builder.dim() {
        return Err(Error::dimension_mismatch(
            "initial state",
            builder.dim(),
            psi0.len(),
        ));
    }

    let times = arange(0.0, t_total, dt);
    if forcing.len() < times.len() {
        return Err(Error::dimension_mismatch(
            "forcing series (one value per quantum step)",
            times.len(),
            forcing.len(),
        ));
    }

    let mut states = Vec::with_capacity(times.len() + 1);
    let mut norms = Vec::with_capacity(times.len() + 1);
    let mut psi = psi0.clone();
    norms.push(norm(&psi));
    states.push(psi.clone());

    for &f in &forcing[..times.len()] {
        let h = builder.build(f);
        psi = rk4_step(&psi, &h, dt);
        norms.push(norm(&psi));
        states.push(psi.clone());
    }

    let trajectory = QuantumTrajectory {
        times,
        states,
        norms,
    };
    debug!(
        steps = trajectory.times.len(),
        max_norm_drift = trajectory.max_norm_drift(),
        "Quantum state evolved"
    );

    Ok(trajectory)
}
