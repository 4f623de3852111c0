// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Field Simulator CLI
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! qubit-os-fieldsim run
//!
//! # Reproducible run, series printed as JSON
//! qubit-os-fieldsim run --seed 42 --json
//!
//! # Start with custom config
//! qubit-os-fieldsim run --config /path/to/fieldsim.yaml
//!
//! # Show effective configuration
//! qubit-os-fieldsim config
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_fieldsim::{
    config::Config, EntropyMode, GlitchNoise, Result, Simulation, SimulationOutput, VERSION,
};

/// QubitOS Field Simulator
#[derive(Parser)]
#[command(name = "qubit-os-fieldsim")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Stochastic scalar field coupled to a two-qutrit system")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one coupled simulation
    Run {
        /// RNG seed (OS entropy if omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Total duration T
        #[arg(long)]
        t_total: Option<f64>,

        /// Classical step size
        #[arg(long)]
        delta_tau: Option<f64>,

        /// Quantum step size
        #[arg(long)]
        dt: Option<f64>,

        /// Initial field value
        #[arg(long, allow_negative_numbers = true)]
        phi0: Option<f64>,

        /// Entropy estimator (full-state, reduced)
        #[arg(long)]
        entropy_mode: Option<EntropyMode>,

        /// Print the output series as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration file
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Initialize logging
    init_logging(&config.logging.level);

    match cli.command {
        Commands::Run {
            seed,
            t_total,
            delta_tau,
            dt,
            phi0,
            entropy_mode,
            json,
        } => {
            // Override config with CLI args
            let sim = &mut config.simulation;
            if let Some(seed) = seed {
                sim.seed = Some(seed);
            }
            if let Some(t) = t_total {
                sim.t_total = t;
            }
            if let Some(step) = delta_tau {
                sim.delta_tau = step;
            }
            if let Some(step) = dt {
                sim.dt = step;
            }
            if let Some(phi) = phi0 {
                sim.phi_0 = phi;
            }
            if let Some(mode) = entropy_mode {
                sim.entropy_mode = mode;
            }

            let simulation = Simulation::new(config.to_params()?)?;
            let mut source = match config.simulation.seed {
                Some(seed) => GlitchNoise::seeded(seed),
                None => GlitchNoise::from_entropy(),
            };

            info!(
                version = VERSION,
                seed = ?config.simulation.seed,
                "Starting QubitOS field simulation"
            );
            let output = simulation.run(&mut source)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_summary(&output);
            }
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate => match config.validate() {
            Ok(()) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn print_summary(output: &SimulationOutput) {
    let phi_final = output.field_values.last().copied().unwrap_or_default();
    let phi_peak = output
        .field_values
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    let entropy_peak = output.entropies.iter().copied().fold(0.0_f64, f64::max);

    println!("Field points:     {}", output.field_times.len());
    println!("Final Φ:          {:.6}", phi_final);
    println!("Peak |Φ|:         {:.6}", phi_peak);
    println!("Quantum steps:    {}", output.quantum_times.len());
    println!("Entropy mode:     {}", output.entropy_mode);
    println!("Peak entropy:     {:.3e}", entropy_peak);
    println!("Max norm drift:   {:.3e}", output.max_norm_drift);
}
