// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Stochastic forcing sources.
//!
//! The default source is Gaussian background noise with rare high-amplitude
//! spikes ("glitches"):
//!
//!   s(t) = N(0, σ) + B(p) · A
//!
//! with σ = 0.5, p = 0.005, A = 10. Each source owns its random stream, so a
//! run is reproducible from its seed and independent runs share no state.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::{Error, Result};

/// Standard deviation of the background noise.
pub const DEFAULT_NOISE_SIGMA: f64 = 0.5;
/// Probability of a glitch on any single draw.
pub const DEFAULT_GLITCH_PROBABILITY: f64 = 0.005;
/// Amplitude added when a glitch fires.
pub const DEFAULT_GLITCH_AMPLITUDE: f64 = 10.0;

/// A scalar forcing term S(t).
pub trait SourceTerm {
    /// Draw the source value at time `t`.
    fn sample(&mut self, t: f64) -> f64;
}

impl<F> SourceTerm for F
where
    F: FnMut(f64) -> f64,
{
    fn sample(&mut self, t: f64) -> f64 {
        self(t)
    }
}

/// Gaussian noise plus Bernoulli-gated spikes.
#[derive(Debug, Clone)]
pub struct GlitchNoise {
    sigma: f64,
    glitch_probability: f64,
    amplitude: f64,
    rng: StdRng,
}

impl GlitchNoise {
    /// Default parameters with a reproducible stream.
    pub fn seeded(seed: u64) -> Self {
        Self::default_with_rng(StdRng::seed_from_u64(seed))
    }

    /// Default parameters seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::default_with_rng(StdRng::from_entropy())
    }

    fn default_with_rng(rng: StdRng) -> Self {
        Self {
            sigma: DEFAULT_NOISE_SIGMA,
            glitch_probability: DEFAULT_GLITCH_PROBABILITY,
            amplitude: DEFAULT_GLITCH_AMPLITUDE,
            rng,
        }
    }

    /// Custom noise parameters.
    ///
    /// # Arguments
    /// * `sigma` — Background standard deviation (finite, ≥ 0).
    /// * `glitch_probability` — Spike probability per draw, in [0, 1].
    /// * `glitch_amplitude` — Spike height (finite).
    /// * `rng` — Random stream owned by the source.
    pub fn with_params(
        sigma: f64,
        glitch_probability: f64,
        glitch_amplitude: f64,
        rng: StdRng,
    ) -> Result<Self> {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(Error::invalid_parameter(
                "sigma",
                format!("must be finite and >= 0, got {sigma}"),
            ));
        }
        if !glitch_amplitude.is_finite() {
            return Err(Error::invalid_parameter(
                "glitch_amplitude",
                format!("must be finite, got {glitch_amplitude}"),
            ));
        }
        if !(0.0..=1.0).contains(&glitch_probability) {
            return Err(Error::invalid_parameter(
                "glitch_probability",
                format!("must be in [0, 1], got {glitch_probability}"),
            ));
        }

        Ok(Self {
            sigma,
            glitch_probability,
            amplitude: glitch_amplitude,
            rng,
        })
    }
}

impl SourceTerm for GlitchNoise {
    fn sample(&mut self, _t: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        let background = self.sigma * z;
        let spike = if self.rng.gen_bool(self.glitch_probability) {
            self.amplitude
        } else {
            0.0
        };
        background + spike
    }
}

/// A source that always returns the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantSource(pub f64);

impl ConstantSource {
    /// The zero source, S ≡ 0.
    pub fn zero() -> Self {
        Self(0.0)
    }
}

impl SourceTerm for ConstantSource {
    fn sample(&mut self, _t: f64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let mut a = GlitchNoise::seeded(7);
        let mut b = GlitchNoise::seeded(7);
        for i in 0..1000 {
            let t = i as f64 * 0.01;
            assert_eq!(a.sample(t).to_bits(), b.sample(t).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = GlitchNoise::seeded(1);
        let mut b = GlitchNoise::seeded(2);
        let xs: Vec<f64> = (0..16).map(|_| a.sample(0.0)).collect();
        let ys: Vec<f64> = (0..16).map(|_| b.sample(0.0)).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_noise_statistics() {
        // No spikes: the sample variance should approach σ².
        let rng = StdRng::seed_from_u64(42);
        let mut src = GlitchNoise::with_params(0.5, 0.0, 10.0, rng).unwrap();
        let n = 50_000;
        let samples: Vec<f64> = (0..n).map(|_| src.sample(0.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert_relative_eq!(mean, 0.0, epsilon = 0.02);
        assert_relative_eq!(var, 0.25, epsilon = 0.01);
    }

    #[test]
    fn test_glitch_always_fires_with_p_one() {
        let rng = StdRng::seed_from_u64(3);
        let mut src = GlitchNoise::with_params(0.0, 1.0, 10.0, rng).unwrap();
        for _ in 0..10 {
            assert_relative_eq!(src.sample(0.0), 10.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_glitch_rate_near_default() {
        let mut src = GlitchNoise::seeded(11);
        let n = 200_000;
        // Background is N(0, 0.5); a value above 5 is essentially always a spike.
        let spikes = (0..n).filter(|_| src.sample(0.0) > 5.0).count();
        let rate = spikes as f64 / n as f64;
        assert!(
            (rate - DEFAULT_GLITCH_PROBABILITY).abs() < 0.002,
            "spike rate {rate}"
        );
    }

    #[test]
    fn test_invalid_params_rejected() {
        let rng = || StdRng::seed_from_u64(0);
        assert!(GlitchNoise::with_params(-1.0, 0.1, 1.0, rng()).is_err());
        assert!(GlitchNoise::with_params(f64::NAN, 0.1, 1.0, rng()).is_err());
        assert!(GlitchNoise::with_params(0.5, 1.5, 1.0, rng()).is_err());
        assert!(GlitchNoise::with_params(0.5, 0.1, f64::INFINITY, rng()).is_err());
    }

    #[test]
    fn test_constant_and_closure_sources() {
        let mut zero = ConstantSource::zero();
        assert_eq!(zero.sample(3.0), 0.0);

        let mut ramp = |t: f64| 2.0 * t;
        assert_relative_eq!(ramp.sample(1.5), 3.0);
    }
}
