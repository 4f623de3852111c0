// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Field Simulator
//!
//! A classical scalar field driven by a stochastic source, coupled to a pair
//! of qutrits whose entanglement entropy is tracked over time.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │           Simulation (orchestrator)      │
//! ├──────────────────┬──────────────────────┤
//! │  Field (Euler)   │  Quantum (RK4)       │
//! │  Φ(t)            │  ψ(t), H(f)          │
//! ├──────────────────┴──────────────────────┤
//! │   Source (noise)  │  Entropy (Jacobi)    │
//! └───────────────────┴─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`source`]: Stochastic source terms S(t)
//! - [`field`]: Explicit Euler integrator for the scalar field
//! - [`hamiltonian`]: Two-qutrit Hamiltonian construction
//! - [`quantum`]: RK4 Schrödinger integrator
//! - [`entropy`]: Von Neumann entropy estimators
//! - [`simulation`]: Coupled runs
//! - [`config`]: Configuration management
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```no_run
//! use qubit_os_fieldsim::simulation::{Simulation, SimulationParams};
//!
//! let sim = Simulation::new(SimulationParams::default())?;
//! let out = sim.run_seeded(42)?;
//! println!("final Φ = {:?}", out.field_values.last());
//! # Ok::<(), qubit_os_fieldsim::Error>(())
//! ```

pub mod config;
pub mod entropy;
pub mod error;
pub mod field;
pub mod hamiltonian;
pub mod quantum;
pub mod simulation;
pub mod source;
pub mod validation;

pub use config::Config;
pub use entropy::EntropyMode;
pub use error::{Error, Result};
pub use simulation::{Simulation, SimulationOutput, SimulationParams};
pub use source::{ConstantSource, GlitchNoise, SourceTerm};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
