// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Two-qutrit Hamiltonian construction.
//!
//! The total Hamiltonian at forcing value f is
//!
//!   H(f) = H_A + H_B + f · C,   C = diag(1, 0, −1) ⊗ diag(−1, 0, 1)
//!
//! where H_A and H_B act on the first and second qutrit respectively. The
//! static part and C are assembled once per run; `build` only scales and adds.

use ndarray::Array2;
use num_complex::Complex64;
use tracing::warn;

use crate::error::{Error, Result};

/// Levels of a single qutrit.
pub const QUTRIT_DIM: usize = 3;

/// Dimension of the joint two-qutrit Hilbert space.
pub const JOINT_DIM: usize = QUTRIT_DIM * QUTRIT_DIM;

/// Diagonal matrix with the given real entries.
pub fn diag(levels: &[f64]) -> Array2<Complex64> {
    let n = levels.len();
    let mut m = Array2::zeros((n, n));
    for (i, &l) in levels.iter().enumerate() {
        m[[i, i]] = Complex64::new(l, 0.0);
    }
    m
}

/// n × n identity.
pub fn identity(n: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(n, Complex64::new(1.0, 0.0))
}

/// Kronecker product A ⊗ B.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    let mut out = Array2::zeros((ar * br, ac * bc));
    for i in 0..ar {
        for j in 0..ac {
            let aij = a[[i, j]];
            if aij == Complex64::new(0.0, 0.0) {
                continue;
            }
            for k in 0..br {
                for l in 0..bc {
                    out[[i * br + k, j * bc + l]] = aij * b[[k, l]];
                }
            }
        }
    }
    out
}

/// Conjugate transpose M†.
pub fn conjugate_transpose(m: &Array2<Complex64>) -> Array2<Complex64> {
    m.t().mapv(|z| z.conj())
}

/// True if ‖M − M†‖_max ≤ tol.
pub fn is_hermitian(m: &Array2<Complex64>, tol: f64) -> bool {
    if m.nrows() != m.ncols() {
        return false;
    }
    let n = m.nrows();
    for i in 0..n {
        for j in i..n {
            if (m[[i, j]] - m[[j, i]].conj()).norm() > tol {
                return false;
            }
        }
    }
    true
}

/// Coupling operator C = diag(1, 0, −1) ⊗ diag(−1, 0, 1).
pub fn coupling_operator() -> Array2<Complex64> {
    kron(&diag(&[1.0, 0.0, -1.0]), &diag(&[-1.0, 0.0, 1.0]))
}

/// Default first-qutrit Hamiltonian diag(1, 2, 3) ⊗ I₃.
pub fn default_subsystem_a() -> Array2<Complex64> {
    kron(&diag(&[1.0, 2.0, 3.0]), &identity(QUTRIT_DIM))
}

/// Default second-qutrit Hamiltonian I₃ ⊗ diag(1, 2, 3).
pub fn default_subsystem_b() -> Array2<Complex64> {
    kron(&identity(QUTRIT_DIM), &diag(&[1.0, 2.0, 3.0]))
}

fn check_square(name: &str, m: &Array2<Complex64>) -> Result<()> {
    if m.nrows() != m.ncols() {
        return Err(Error::dimension_mismatch(
            format!("{name} (must be square)"),
            m.nrows(),
            m.ncols(),
        ));
    }
    Ok(())
}

/// Assembles H(f) from fixed subsystem Hamiltonians and the coupling operator.
#[derive(Debug, Clone)]
pub struct HamiltonianBuilder {
    static_part: Array2<Complex64>,
    coupling: Array2<Complex64>,
}

impl HamiltonianBuilder {
    /// Precompute H_A + H_B and C.
    ///
    /// Both subsystem Hamiltonians must be square and of the joint dimension
    /// (9). A non-Hermitian sum is accepted but logged.
    pub fn new(h_a: &Array2<Complex64>, h_b: &Array2<Complex64>) -> Result<Self> {
        check_square("H_A", h_a)?;
        check_square("H_B", h_b)?;

        let coupling = coupling_operator();
        let dim = coupling.nrows();
        if h_a.nrows() != dim {
            return Err(Error::dimension_mismatch("H_A", dim, h_a.nrows()));
        }
        if h_b.nrows() != dim {
            return Err(Error::dimension_mismatch("H_B", dim, h_b.nrows()));
        }

        let static_part = h_a + h_b;
        if !is_hermitian(&static_part, 1e-12) {
            warn!("H_A + H_B is not Hermitian; evolution will not conserve the norm");
        }

        Ok(Self {
            static_part,
            coupling,
        })
    }

    /// Builder with the default subsystem Hamiltonians.
    pub fn with_defaults() -> Self {
        Self {
            static_part: default_subsystem_a() + default_subsystem_b(),
            coupling: coupling_operator(),
        }
    }

    /// Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.coupling.nrows()
    }

    /// The time-independent part H_A + H_B.
    pub fn static_part(&self) -> &Array2<Complex64> {
        &self.static_part
    }

    /// The coupling operator C.
    pub fn coupling(&self) -> &Array2<Complex64> {
        &self.coupling
    }

    /// H(f) = H_A + H_B + f · C.
    pub fn build(&self, forcing: f64) -> Array2<Complex64> {
        if forcing == 0.0 {
            return self.static_part.clone();
        }
        &self.static_part + &(&self.coupling * Complex64::new(forcing, 0.0))
    }
}
