/*!
Run configuration for the estimators.

Defaults reproduce the settings of the reference ALAAM estimation runs. A
configuration can be built in code with the consuming setters or read from
TOML; any field missing from the TOML keeps its default.

```rust
use mini_alaam::config::EstimationConfig;

let config = EstimationConfig::default()
    .set_seed(42)
    .with_ee_iterations(50, 20);
assert_eq!(config.seed, 42);
assert_eq!(config.ee_outer_iterations, 50);
assert!(config.validate().is_ok());
```
*/

use std::path::Path;

use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use crate::error::{AlaamError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    /// Seed of the single random source used for the whole run.
    pub seed: u64,

    /// Proposals per sampler call in Algorithm S and Algorithm EE.
    pub sampler_m: usize,

    /// Iterations of Algorithm S (M1).
    pub algorithm_s_iterations: usize,
    /// Multiplier of the squared inverse change-statistic sum in Algorithm S.
    pub algorithm_s_aca: f64,
    /// Largest magnitude of a single Algorithm S step.
    pub algorithm_s_max_step: f64,

    /// Outer iterations of Algorithm EE.
    pub ee_outer_iterations: usize,
    /// Inner iterations of Algorithm EE per outer iteration.
    pub ee_inner_iterations: usize,
    /// Multiplier of D0 giving the EE step size.
    pub ee_aca: f64,
    /// Compression constant bounding the relative spread of theta.
    pub ee_comp_c: f64,

    /// Proposals per sampler call, and sampler calls per Phase 2 iteration,
    /// in the Robbins-Monro estimator.
    pub sa_iterations_in_step: usize,
    /// Number of Phase 2 subphases.
    pub sa_subphases: usize,
    /// Initial Robbins-Monro step multiplier.
    pub sa_initial_step: f64,

    /// Draw progress bars for the long loops.
    pub show_progress: bool,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            seed: thread_rng().gen::<u64>(),
            sampler_m: 1000,
            algorithm_s_iterations: 20,
            algorithm_s_aca: 0.1,
            algorithm_s_max_step: 0.1,
            ee_outer_iterations: 500,
            ee_inner_iterations: 100,
            ee_aca: 1e-9,
            ee_comp_c: 1e-2,
            sa_iterations_in_step: 100,
            sa_subphases: 4,
            sa_initial_step: 0.01,
            show_progress: false,
        }
    }
}

impl EstimationConfig {
    /// Parses a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sampler_m(mut self, sampler_m: usize) -> Self {
        self.sampler_m = sampler_m;
        self
    }

    pub fn with_algorithm_s_iterations(mut self, m1: usize) -> Self {
        self.algorithm_s_iterations = m1;
        self
    }

    pub fn with_ee_iterations(mut self, outer: usize, inner: usize) -> Self {
        self.ee_outer_iterations = outer;
        self.ee_inner_iterations = inner;
        self
    }

    pub fn with_sa_iterations_in_step(mut self, iterations: usize) -> Self {
        self.sa_iterations_in_step = iterations;
        self
    }

    pub fn with_sa_subphases(mut self, subphases: usize) -> Self {
        self.sa_subphases = subphases;
        self
    }

    pub fn with_sa_initial_step(mut self, a: f64) -> Self {
        self.sa_initial_step = a;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Rejects settings under which an estimator cannot run.
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("sampler_m", self.sampler_m),
            ("algorithm_s_iterations", self.algorithm_s_iterations),
            ("ee_outer_iterations", self.ee_outer_iterations),
            ("ee_inner_iterations", self.ee_inner_iterations),
            ("sa_iterations_in_step", self.sa_iterations_in_step),
            ("sa_subphases", self.sa_subphases),
        ];
        if let Some((name, _)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(AlaamError::Configuration(format!(
                "{name} must be at least 1"
            )));
        }
        // the step-scale rescaling needs a spread of theta within each outer iteration
        if self.ee_inner_iterations < 2 {
            return Err(AlaamError::Configuration(format!(
                "ee_inner_iterations must be at least 2, got {}",
                self.ee_inner_iterations
            )));
        }

        let multipliers = [
            ("algorithm_s_aca", self.algorithm_s_aca),
            ("algorithm_s_max_step", self.algorithm_s_max_step),
            ("ee_aca", self.ee_aca),
            ("ee_comp_c", self.ee_comp_c),
            ("sa_initial_step", self.sa_initial_step),
        ];
        if let Some((name, value)) = multipliers
            .iter()
            .find(|(_, v)| !v.is_finite() || *v <= 0.0)
        {
            return Err(AlaamError::Configuration(format!(
                "{name} must be positive and finite, got {value}"
            )));
        }
        Ok(())
    }
}
