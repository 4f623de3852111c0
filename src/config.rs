// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration management for the simulator.
//!
//! Configuration is loaded from multiple sources with the following priority
//! (later sources override earlier ones):
//!
//! 1. Built-in defaults
//! 2. fieldsim.yaml file
//! 3. Environment variables (FIELDSIM_*)
//! 4. CLI arguments
//!
//! Complex vectors and matrices are written as lists of `[re, im]` pairs:
//!
//! ```yaml
//! simulation:
//!   t_total: 5.0
//!   psi: [[1.0, 0.0], [0.0, 0.0], ...]
//! ```

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::entropy::EntropyMode;
use crate::error::{Error, Result};
use crate::simulation::SimulationParams;

/// A complex number as `[re, im]`.
pub type ComplexPair = [f64; 2];

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Simulation parameters
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = config_path {
            if path.exists() {
                config = Self::from_file(path)?;
            }
        } else {
            for path in &["fieldsim.yaml", "fieldsim.yml"] {
                let path = Path::new(path);
                if path.exists() {
                    config = Self::from_file(path)?;
                    break;
                }
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let sim = &mut self.simulation;
        override_parsed(&lookup, "FIELDSIM_T_TOTAL", &mut sim.t_total);
        override_parsed(&lookup, "FIELDSIM_DELTA_TAU", &mut sim.delta_tau);
        override_parsed(&lookup, "FIELDSIM_DT", &mut sim.dt);
        override_parsed(&lookup, "FIELDSIM_PHI0", &mut sim.phi_0);
        override_parsed(&lookup, "FIELDSIM_ENTROPY_MODE", &mut sim.entropy_mode);

        if let Some(val) = lookup("FIELDSIM_SEED") {
            match val.parse() {
                Ok(seed) => sim.seed = Some(seed),
                Err(_) => tracing::warn!(value = %val, "Ignoring invalid FIELDSIM_SEED"),
            }
        }
        if let Some(val) = lookup("FIELDSIM_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.to_params()?.validate()
    }

    /// Convert the simulation section into library parameters.
    pub fn to_params(&self) -> Result<SimulationParams> {
        self.simulation.to_params()
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(val) = lookup(key) {
        match val.parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(key, value = %val, "Ignoring unparseable override"),
        }
    }
}

/// Simulation parameters as they appear in the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Total duration T
    #[serde(default = "default_t_total")]
    pub t_total: f64,

    /// Classical step size
    #[serde(default = "default_step")]
    pub delta_tau: f64,

    /// Initial field value
    #[serde(default)]
    pub phi_0: f64,

    /// Quantum step size
    #[serde(default = "default_step")]
    pub dt: f64,

    /// RNG seed; OS entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Entropy estimator
    #[serde(default)]
    pub entropy_mode: EntropyMode,

    /// Initial state (9 amplitudes); |0⟩⊗|0⟩ when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psi: Option<Vec<ComplexPair>>,

    /// First-qutrit Hamiltonian (9×9); diag(1, 2, 3) ⊗ I₃ when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_a: Option<Vec<Vec<ComplexPair>>>,

    /// Second-qutrit Hamiltonian (9×9); I₃ ⊗ diag(1, 2, 3) when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_b: Option<Vec<Vec<ComplexPair>>>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            t_total: default_t_total(),
            delta_tau: default_step(),
            phi_0: 0.0,
            dt: default_step(),
            seed: None,
            entropy_mode: EntropyMode::default(),
            psi: None,
            h_a: None,
            h_b: None,
        }
    }
}

impl SimulationSection {
    /// Build `SimulationParams`, falling back to the built-in operators.
    pub fn to_params(&self) -> Result<SimulationParams> {
        let defaults = SimulationParams::default();
        let psi = match &self.psi {
            Some(pairs) => complex_vector(pairs),
            None => defaults.psi,
        };
        let h_a = match &self.h_a {
            Some(rows) => complex_matrix("H_A", rows)?,
            None => defaults.h_a,
        };
        let h_b = match &self.h_b {
            Some(rows) => complex_matrix("H_B", rows)?,
            None => defaults.h_b,
        };

        Ok(SimulationParams {
            t_total: self.t_total,
            delta_tau: self.delta_tau,
            phi_0: self.phi_0,
            dt: self.dt,
            psi,
            h_a,
            h_b,
            entropy_mode: self.entropy_mode,
        })
    }
}

fn complex_vector(pairs: &[ComplexPair]) -> Array1<Complex64> {
    pairs.iter().map(|&[re, im]| Complex64::new(re, im)).collect()
}

fn complex_matrix(name: &str, rows: &[Vec<ComplexPair>]) -> Result<Array2<Complex64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    let mut m = Array2::zeros((n_rows, n_cols));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(Error::dimension_mismatch(
                format!("{} row {}", name, i),
                n_cols,
                row.len(),
            ));
        }
        for (j, &[re, im]) in row.iter().enumerate() {
            m[[i, j]] = Complex64::new(re, im);
        }
    }
    Ok(m)
}

fn default_t_total() -> f64 {
    10.0
}

fn default_step() -> f64 {
    0.01
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}
