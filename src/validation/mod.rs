// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for simulation parameters.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use tracing::warn;

use crate::error::{Error, Result};

/// Tolerance on ‖ψ‖ − 1 before an initial state is reported as unnormalised.
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Require a finite, strictly positive scalar.
pub fn validate_positive(name: &str, value: f64) -> Result<()> {
    if value.is_nan() {
        return Err(Error::invalid_parameter(name, "is NaN"));
    }
    if value.is_infinite() {
        return Err(Error::invalid_parameter(name, "is infinite"));
    }
    if value <= 0.0 {
        return Err(Error::invalid_parameter(
            name,
            format!("must be > 0, got {}", value),
        ));
    }
    Ok(())
}

/// Require a finite scalar.
pub fn validate_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::invalid_parameter(
            name,
            format!("must be finite, got {}", value),
        ));
    }
    Ok(())
}

/// Validate an initial quantum state against the Hilbert space dimension.
///
/// The state must have the right length, finite amplitudes and a non-zero
/// norm. A norm away from 1 is accepted (the integrator does not renormalise)
/// but logged.
pub fn validate_state(psi: &Array1<Complex64>, dim: usize) -> Result<()> {
    if psi.len() != dim {
        return Err(Error::dimension_mismatch("initial state psi", dim, psi.len()));
    }

    for (i, z) in psi.iter().enumerate() {
        if !z.re.is_finite() || !z.im.is_finite() {
            return Err(Error::invalid_parameter(
                "psi",
                format!("contains a non-finite amplitude at index {}", i),
            ));
        }
    }

    let norm = crate::quantum::norm(psi);
    if norm == 0.0 {
        return Err(Error::invalid_parameter("psi", "has zero norm"));
    }
    if (norm - 1.0).abs() > NORM_TOLERANCE {
        warn!(norm, "Initial state is not normalized");
    }

    Ok(())
}

/// Validate a square operator of the given dimension with finite entries.
pub fn validate_operator(name: &str, m: &Array2<Complex64>, dim: usize) -> Result<()> {
    if m.nrows() != m.ncols() {
        return Err(Error::dimension_mismatch(
            format!("{} (must be square)", name),
            m.nrows(),
            m.ncols(),
        ));
    }
    if m.nrows() != dim {
        return Err(Error::dimension_mismatch(name, dim, m.nrows()));
    }
    if let Some(((i, j), _)) = m
        .indexed_iter()
        .find(|(_, z)| !z.re.is_finite() || !z.im.is_finite())
    {
        return Err(Error::invalid_parameter(
            name,
            format!("contains a non-finite entry at ({}, {})", i, j),
        ));
    }
    Ok(())
}
