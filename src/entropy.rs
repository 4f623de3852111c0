// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Von Neumann entropy of two-qutrit states.
//!
//!   S(ρ) = −Σ λ_i log₂ λ_i
//!
//! over the eigenvalues of ρ that are strictly positive. Zero and slightly
//! negative eigenvalues (round-off on rank-deficient ρ) are dropped, so the
//! rank-1 case evaluates to 0 instead of hitting log₂(0).
//!
//! Two estimators are provided:
//!
//! - [`EntropyMode::FullState`] applies S to the density matrix of the whole
//!   pure state. A pure global state has S = 0 regardless of entanglement,
//!   so this mode only ever reports round-off. It is the default.
//! - [`EntropyMode::ReducedSubsystemA`] traces out the second qutrit first and
//!   applies S to ρ_A = Tr_B |ψ⟩⟨ψ|, which is the entanglement entropy
//!   (0 for product states, log₂ 3 for a maximally entangled pair).
//!
//! Eigenvalues come from nalgebra's Hermitian eigendecomposition
//! (Householder tridiagonalisation followed by implicit QR).
//!
//! Ref: Nielsen & Chuang (2010), §11.3.
//! Ref: Golub & Van Loan (2013), "Matrix Computations", §8.3.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::hamiltonian::{is_hermitian, QUTRIT_DIM};

/// Which density matrix the entropy is taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntropyMode {
    /// Entropy of the full 9×9 pure-state density matrix (always ≈ 0).
    #[default]
    #[serde(alias = "full")]
    FullState,
    /// Entropy of the first qutrit after tracing out the second.
    #[serde(alias = "reduced")]
    ReducedSubsystemA,
}

impl fmt::Display for EntropyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyMode::FullState => write!(f, "full-state"),
            EntropyMode::ReducedSubsystemA => write!(f, "reduced-subsystem-a"),
        }
    }
}

impl FromStr for EntropyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full-state" | "full" => Ok(EntropyMode::FullState),
            "reduced-subsystem-a" | "reduced" => Ok(EntropyMode::ReducedSubsystemA),
            other => Err(Error::Config(format!(
                "unknown entropy mode '{other}' (expected 'full-state' or 'reduced')"
            ))),
        }
    }
}

/// Density matrix of a pure state, ρ_ij = conj(ψ_i) ψ_j.
///
/// This is the complex conjugate of |ψ⟩⟨ψ|; it has the same spectrum.
pub fn density_matrix(psi: &Array1<Complex64>) -> Array2<Complex64> {
    let d = psi.len();
    Array2::from_shape_fn((d, d), |(i, j)| psi[i].conj() * psi[j])
}

/// Partial trace over the second factor of a (dim_a · dim_b)-dimensional ρ.
///
///   (ρ_A)_ij = Σ_k ρ_(i·dim_b + k),(j·dim_b + k)
pub fn partial_trace_b(
    rho: &Array2<Complex64>,
    dim_a: usize,
    dim_b: usize,
) -> Result<Array2<Complex64>> {
    let d = dim_a * dim_b;
    if rho.nrows() != d || rho.ncols() != d {
        return Err(Error::dimension_mismatch(
            "partial trace input",
            d,
            rho.nrows().max(rho.ncols()),
        ));
    }
    Ok(Array2::from_shape_fn((dim_a, dim_a), |(i, j)| {
        (0..dim_b)
            .map(|k| rho[[i * dim_b + k, j * dim_b + k]])
            .sum()
    }))
}

/// Eigenvalues of a Hermitian matrix, ascending.
///
/// Only the lower triangle (diagonal included) is read; the upper triangle is
/// taken to be its conjugate mirror.
pub fn hermitian_eigenvalues(m: &Array2<Complex64>) -> Result<Vec<f64>> {
    if m.nrows() != m.ncols() {
        return Err(Error::dimension_mismatch(
            "eigenvalue input (must be square)",
            m.nrows(),
            m.ncols(),
        ));
    }
    let n = m.nrows();
    if n == 0 {
        return Ok(Vec::new());
    }

    if !is_hermitian(m, 1e-12) {
        warn!(dim = n, "Eigenvalue input is not Hermitian; using its lower triangle");
    }

    let matrix = DMatrix::from_fn(n, n, |i, j| m[[i, j]]);
    let eigen = SymmetricEigen::new(matrix);
    let mut vals: Vec<f64> = eigen.eigenvalues.iter().copied().collect();
    vals.sort_by(|a, b| a.total_cmp(b));
    Ok(vals)
}

/// −Σ λ log₂ λ over the strictly positive eigenvalues of ρ.
pub fn von_neumann_entropy(rho: &Array2<Complex64>) -> Result<f64> {
    let eigenvalues = hermitian_eigenvalues(rho)?;
    Ok(entropy_from_eigenvalues(&eigenvalues))
}

/// −Σ λ log₂ λ over the strictly positive entries.
pub fn entropy_from_eigenvalues(eigenvalues: &[f64]) -> f64 {
    let s: f64 = eigenvalues
        .iter()
        .filter(|&&l| l > 0.0)
        .map(|&l| -l * l.log2())
        .sum();
    // −0.0 → 0.0
    s + 0.0
}

/// Entropy of the subsystem-A reduced state of a bipartite pure state.
pub fn reduced_entropy(psi: &Array1<Complex64>, dim_a: usize, dim_b: usize) -> Result<f64> {
    if psi.len() != dim_a * dim_b {
        return Err(Error::dimension_mismatch(
            "bipartite state",
            dim_a * dim_b,
            psi.len(),
        ));
    }
    let rho_a = partial_trace_b(&density_matrix(psi), dim_a, dim_b)?;
    von_neumann_entropy(&rho_a)
}

/// Entropy of a two-qutrit state under the given estimator.
pub fn state_entropy(psi: &Array1<Complex64>, mode: EntropyMode) -> Result<f64> {
    match mode {
        EntropyMode::FullState => von_neumann_entropy(&density_matrix(psi)),
        EntropyMode::ReducedSubsystemA => reduced_entropy(psi, QUTRIT_DIM, QUTRIT_DIM),
    }
}
