// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Coupled classical/quantum simulation runs.
//!
//! A run:
//!
//! 1. integrates the scalar field Φ over `t[i] = i·δτ`, `i < floor(T/δτ)`,
//!    sampling the source once per step;
//! 2. draws a second, independent source sample for every classical grid
//!    point;
//! 3. evolves the two-qutrit state over `arange(0, T, dt)` with H(f_k) built
//!    from the k-th sample of that second series;
//! 4. reduces every state except the last to an entropy.
//!
//! The quantum grid consumes the forcing series positionally, so it must not
//! be longer than the classical grid; a shorter forcing series is a
//! `DimensionMismatch`, never a silent truncation.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, info};

use crate::entropy::{state_entropy, EntropyMode};
use crate::error::Result;
use crate::field::{Feedback, FieldIntegrator, LinearDamping, LinearGain, Nonlinearity};
use crate::hamiltonian::{
    default_subsystem_a, default_subsystem_b, HamiltonianBuilder, JOINT_DIM, QUTRIT_DIM,
};
use crate::quantum::{basis_state, evolve, product_state};
use crate::source::{GlitchNoise, SourceTerm};
use crate::validation::{validate_finite, validate_operator, validate_positive, validate_state};

/// Parameters of one coupled run.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Total duration T shared by both models.
    pub t_total: f64,
    /// Classical step δτ.
    pub delta_tau: f64,
    /// Initial field value Φ₀.
    pub phi_0: f64,
    /// Quantum step dt.
    pub dt: f64,
    /// Initial two-qutrit state.
    pub psi: Array1<Complex64>,
    /// First-qutrit Hamiltonian on the joint space.
    pub h_a: Array2<Complex64>,
    /// Second-qutrit Hamiltonian on the joint space.
    pub h_b: Array2<Complex64>,
    /// Entropy estimator applied to each state.
    pub entropy_mode: EntropyMode,
}

impl Default for SimulationParams {
    fn default() -> Self {
        let ground = basis_state(QUTRIT_DIM, 0);
        Self {
            t_total: 10.0,
            delta_tau: 0.01,
            phi_0: 0.0,
            dt: 0.01,
            psi: product_state(&ground, &ground),
            h_a: default_subsystem_a(),
            h_b: default_subsystem_b(),
            entropy_mode: EntropyMode::default(),
        }
    }
}

impl SimulationParams {
    /// Validate step sizes, durations and operator/state shapes.
    pub fn validate(&self) -> Result<()> {
        validate_positive("T", self.t_total)?;
        validate_positive("delta_tau", self.delta_tau)?;
        validate_positive("dt", self.dt)?;
        validate_finite("Phi_0", self.phi_0)?;
        validate_operator("H_A", &self.h_a, JOINT_DIM)?;
        validate_operator("H_B", &self.h_b, JOINT_DIM)?;
        validate_state(&self.psi, JOINT_DIM)?;
        Ok(())
    }
}

/// Output series of a run, ready for an external plotting layer.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutput {
    /// Classical grid t.
    pub field_times: Vec<f64>,
    /// Φ(t) on the classical grid.
    pub field_values: Vec<f64>,
    /// Quantum grid, `arange(0, T, dt)`.
    pub quantum_times: Vec<f64>,
    /// Entropy of the state at the start of each quantum step.
    pub entropies: Vec<f64>,
    /// Estimator that produced `entropies`.
    pub entropy_mode: EntropyMode,
    /// |‖ψ‖ − 1| maximised over the state trajectory.
    pub max_norm_drift: f64,
    /// State after the last step.
    #[serde(skip)]
    pub final_state: Array1<Complex64>,
}

/// A validated simulation, ready to run against any source.
#[derive(Debug, Clone)]
pub struct Simulation {
    params: SimulationParams,
    field: FieldIntegrator,
    hamiltonian: HamiltonianBuilder,
}

impl Simulation {
    /// Validate the parameters and precompute the Hamiltonian parts.
    pub fn new(params: SimulationParams) -> Result<Self> {
        params.validate()?;
        let field = FieldIntegrator::new(params.t_total, params.delta_tau, params.phi_0)?;
        let hamiltonian = HamiltonianBuilder::new(&params.h_a, &params.h_b)?;
        Ok(Self {
            params,
            field,
            hamiltonian,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Run with the default glitch-noise source, seeded for reproducibility.
    pub fn run_seeded(&self, seed: u64) -> Result<SimulationOutput> {
        self.run(&mut GlitchNoise::seeded(seed))
    }

    /// Run with the default damping and gain terms.
    pub fn run<S>(&self, source: &mut S) -> Result<SimulationOutput>
    where
        S: SourceTerm + ?Sized,
    {
        self.run_with(source, &LinearDamping::default(), &LinearGain::default())
    }

    /// Run with caller-supplied field terms.
    pub fn run_with<S, G, A>(
        &self,
        source: &mut S,
        feedback: &G,
        nonlinearity: &A,
    ) -> Result<SimulationOutput>
    where
        S: SourceTerm + ?Sized,
        G: Feedback + ?Sized,
        A: Nonlinearity + ?Sized,
    {
        let p = &self.params;
        info!(
            t_total = p.t_total,
            delta_tau = p.delta_tau,
            dt = p.dt,
            entropy_mode = %p.entropy_mode,
            "Starting coupled simulation"
        );

        let field = self.field.integrate(source, feedback, nonlinearity)?;

        // Independent second draw per classical grid point.
        let forcing: Vec<f64> = field.times.iter().map(|&t| source.sample(t)).collect();

        let quantum = evolve(&p.psi, &self.hamiltonian, &forcing, p.t_total, p.dt)?;

        let n_entropy = quantum.states.len() - 1;
        let entropies = quantum.states[..n_entropy]
            .iter()
            .map(|psi| state_entropy(psi, p.entropy_mode))
            .collect::<Result<Vec<f64>>>()?;
        debug!(count = entropies.len(), "Entropies computed");

        let max_norm_drift = quantum.max_norm_drift();
        let final_state = quantum
            .final_state()
            .cloned()
            .unwrap_or_else(|| p.psi.clone());

        info!(
            field_points = field.len(),
            quantum_steps = quantum.times.len(),
            phi_final = field.values.last().copied().unwrap_or(p.phi_0),
            max_norm_drift,
            "Simulation complete"
        );

        Ok(SimulationOutput {
            field_times: field.times,
            field_values: field.values,
            quantum_times: quantum.times,
            entropies,
            entropy_mode: p.entropy_mode,
            max_norm_drift,
            final_state,
        })
    }
}

/// Validate `params` and run once with a seeded glitch-noise source.
pub fn run_simulation(params: SimulationParams, seed: u64) -> Result<SimulationOutput> {
    Simulation::new(params)?.run_seeded(seed)
}
