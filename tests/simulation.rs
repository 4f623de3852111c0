// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end runs through the public API.

use std::io::Write as _;

use approx::assert_relative_eq;
use ndarray::Array2;
use num_complex::Complex64;

use qubit_os_fieldsim::entropy::{reduced_entropy, state_entropy};
use qubit_os_fieldsim::field::{Feedback, Nonlinearity};
use qubit_os_fieldsim::quantum::{basis_state, normalize};
use qubit_os_fieldsim::{
    Config, ConstantSource, EntropyMode, Error, Simulation, SimulationParams,
};

struct NoFeedback;

impl Feedback for NoFeedback {
    fn eval(&self, _phi: f64, _t: f64) -> f64 {
        0.0
    }
}

struct NoGain;

impl Nonlinearity for NoGain {
    fn eval(&self, _phi: f64) -> f64 {
        0.0
    }
}

fn two_step_params() -> SimulationParams {
    SimulationParams {
        t_total: 1.0,
        delta_tau: 0.5,
        phi_0: 0.0,
        dt: 0.5,
        psi: basis_state(9, 0),
        h_a: Array2::zeros((9, 9)),
        h_b: Array2::zeros((9, 9)),
        entropy_mode: EntropyMode::FullState,
    }
}

#[test]
fn test_zero_source_zero_hamiltonian_scenario() {
    let sim = Simulation::new(two_step_params()).unwrap();
    let out = sim.run(&mut ConstantSource::zero()).unwrap();

    assert_eq!(out.field_times, vec![0.0, 0.5]);
    assert_eq!(out.field_values, vec![0.0, 0.0]);
    assert_eq!(out.quantum_times, vec![0.0, 0.5]);
    assert_eq!(out.entropies, vec![0.0, 0.0]);
    assert_eq!(out.final_state, basis_state(9, 0));
}

#[test]
fn test_constant_source_without_feedback_is_linear_ramp() {
    // Φ' = S with S ≡ 2 gives Φ(t_i) = 2 t_i on the Euler grid.
    let params = SimulationParams {
        t_total: 1.0,
        delta_tau: 0.1,
        dt: 0.1,
        ..SimulationParams::default()
    };
    let sim = Simulation::new(params).unwrap();
    let out = sim
        .run_with(&mut ConstantSource(2.0), &NoFeedback, &NoGain)
        .unwrap();

    assert_eq!(out.field_values.len(), 10);
    for (i, &phi) in out.field_values.iter().enumerate() {
        assert_relative_eq!(phi, 0.2 * i as f64, epsilon = 1e-12);
    }
}

#[test]
fn test_seeded_runs_reproducible() {
    let params = SimulationParams {
        t_total: 1.0,
        ..SimulationParams::default()
    };
    let sim = Simulation::new(params).unwrap();
    let a = sim.run_seeded(2024).unwrap();
    let b = sim.run_seeded(2024).unwrap();
    assert_eq!(a.field_values, b.field_values);
    assert_eq!(a.entropies, b.entropies);
}

#[test]
fn test_unit_grids_when_step_equals_duration() {
    let params = SimulationParams {
        t_total: 0.1,
        delta_tau: 0.1,
        dt: 0.1,
        ..SimulationParams::default()
    };
    let out = Simulation::new(params)
        .unwrap()
        .run(&mut ConstantSource::zero())
        .unwrap();
    assert_eq!(out.field_times, vec![0.0]);
    assert_eq!(out.field_values, vec![0.0]);
    assert_eq!(out.quantum_times, vec![0.0]);
    assert_eq!(out.entropies.len(), 1);
}

#[test]
fn test_full_state_entropy_of_random_pure_states_is_zero() {
    for seed in 0..4_u32 {
        let raw = ndarray::Array1::from_iter((0..9).map(|k| {
            let x = f64::from(seed * 9 + k as u32 + 1);
            Complex64::new((x * 1.7).sin(), (x * 0.3).cos())
        }));
        let psi = normalize(&raw).unwrap();
        let s = state_entropy(&psi, EntropyMode::FullState).unwrap();
        assert!(s.abs() < 1e-9, "seed {seed}: S = {s}");
    }
}

#[test]
fn test_reduced_entropy_of_bell_like_state() {
    // (|00⟩ + |11⟩)/√2 on two qutrits has one ebit.
    let mut psi = basis_state(9, 0);
    psi[4] = Complex64::new(1.0, 0.0);
    let psi = normalize(&psi).unwrap();
    assert_relative_eq!(reduced_entropy(&psi, 3, 3).unwrap(), 1.0, epsilon = 1e-9);
    assert!(state_entropy(&psi, EntropyMode::FullState).unwrap().abs() < 1e-9);
}

#[test]
fn test_mismatched_grids_rejected() {
    let params = SimulationParams {
        dt: 0.1,
        ..two_step_params()
    };
    let err = Simulation::new(params)
        .unwrap()
        .run(&mut ConstantSource::zero())
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
}

#[test]
fn test_config_file_drives_run() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        f,
        r#"
simulation:
  t_total: 0.5
  delta_tau: 0.125
  dt: 0.125
  seed: 11
  entropy_mode: reduced
"#
    )
    .unwrap();

    let config = Config::load(Some(f.path())).unwrap();
    config.validate().unwrap();
    let params = config.to_params().unwrap();
    assert_eq!(params.entropy_mode, EntropyMode::ReducedSubsystemA);

    let seed = config.simulation.seed.unwrap();
    let out = Simulation::new(params).unwrap().run_seeded(seed).unwrap();
    assert_eq!(out.field_times.len(), 4);
    assert_eq!(out.entropies.len(), out.quantum_times.len());

    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["entropy_mode"], "reduced-subsystem-a");
    assert_eq!(json["field_values"].as_array().unwrap().len(), 4);
    assert!(json.get("final_state").is_none());
}
