/*!
# Estimation runs

[`Estimator`] ties a network, a model and an [`EstimationConfig`] to a single
seeded random source, and runs either Equilibrium Expectation (Algorithm S
followed by Algorithm EE) or Robbins-Monro stochastic approximation on an
observed outcome vector. The observed vector is never modified; every run
works on its own copy.

## Example Usage

```rust
use mini_alaam::change_stats::{Contagion, Density};
use mini_alaam::config::EstimationConfig;
use mini_alaam::estimator::Estimator;
use mini_alaam::model::Model;
use mini_alaam::network::Graph;
use mini_alaam::trace::MemoryTrace;

let g = Graph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0)])?;
let model = Model::<Graph>::empty().with(Density).with(Contagion);
let config = EstimationConfig::default()
    .set_seed(42)
    .with_sampler_m(50)
    .with_algorithm_s_iterations(5)
    .with_ee_iterations(3, 5);

let mut estimator = Estimator::new(&g, &model, config)?;
let mut trace = MemoryTrace::default();
let estimate = estimator.run_ee(&[1, 1, 0, 0, 1, 0], &mut trace)?;

assert_eq!(estimate.theta.len(), 2);
assert_eq!(trace.theta.len(), 5 + 3);
# Ok::<(), mini_alaam::error::AlaamError>(())
```
*/

use std::fmt;
use std::fs::File;
use std::path::Path;

use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::algorithm_ee::algorithm_ee;
use crate::algorithm_s::algorithm_s;
use crate::config::EstimationConfig;
use crate::error::Result;
use crate::model::Model;
use crate::network::Network;
use crate::stochastic_approximation::stochastic_approximation;
use crate::trace::{TraceSink, Traces};

/// Estimated parameters with their labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub labels: Vec<String>,
    pub theta: Array1<f64>,
}

impl fmt::Display for Estimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.len())
            .max()
            .unwrap_or(0)
            .max("Parameter".len());
        writeln!(f, "{:<width$}  {:>12}", "Parameter", "Estimate")?;
        for (label, value) in self.labels.iter().zip(self.theta.iter()) {
            writeln!(f, "{label:<width$}  {value:>12.6}")?;
        }
        Ok(())
    }
}

/// Runs estimations of one model on one network.
pub struct Estimator<'a, N: Network + ?Sized> {
    pub network: &'a N,
    pub model: &'a Model<N>,
    pub config: EstimationConfig,
    rng: SmallRng,
}

impl<'a, N: Network + ?Sized> Estimator<'a, N> {
    /// Validates `config` and seeds the random source from `config.seed`.
    pub fn new(network: &'a N, model: &'a Model<N>, config: EstimationConfig) -> Result<Self> {
        config.validate()?;
        let rng = SmallRng::seed_from_u64(config.seed);
        Ok(Self {
            network,
            model,
            config,
            rng,
        })
    }

    /// Reseeds the random source.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    fn log_summary(&self, observed: &[u8]) {
        let positive = observed.iter().filter(|&&v| v == 1).count();
        log::info!(
            "{} nodes, {} edges, density {:.6}",
            self.network.node_count(),
            self.network.edge_count(),
            self.network.density()
        );
        log::info!(
            "{} positive outcomes ({:.2}%)",
            positive,
            100.0 * positive as f64 / observed.len().max(1) as f64
        );
    }

    fn estimate(&self, theta: Array1<f64>) -> Estimate {
        Estimate {
            labels: self.model.labels().to_vec(),
            theta,
        }
    }

    /// Algorithm S followed by Algorithm EE, both recording into `trace`.
    pub fn run_ee<T: TraceSink + ?Sized>(&mut self, observed: &[u8], trace: &mut T) -> Result<Estimate> {
        self.model.validate(self.network, observed)?;
        self.log_summary(observed);

        let mut outcome = observed.to_vec();
        let warm = algorithm_s(
            self.network,
            &mut outcome,
            self.model,
            &self.config,
            &mut *trace,
            &mut self.rng,
        )?;
        let theta = algorithm_ee(
            self.network,
            &mut outcome,
            self.model,
            &warm.theta,
            &warm.d_mean,
            &self.config,
            trace,
            &mut self.rng,
        )?;
        Ok(self.estimate(theta))
    }

    /// [`Estimator::run_ee`] writing `theta_values_<basename>.txt` and
    /// `dzA_values_<basename>.txt` in `dir`.
    pub fn run_ee_to_files<P: AsRef<Path>>(
        &mut self,
        observed: &[u8],
        dir: P,
        basename: &str,
    ) -> Result<Estimate> {
        self.model.validate(self.network, observed)?;
        let mut traces: Traces<File> = Traces::create(dir, basename, self.model.labels())?;
        self.run_ee(observed, &mut traces)
    }

    /// Robbins-Monro from `theta0`, or from zero when `None`.
    pub fn run_sa<T: TraceSink + ?Sized>(
        &mut self,
        observed: &[u8],
        theta0: Option<&Array1<f64>>,
        trace: &mut T,
    ) -> Result<Estimate> {
        self.model.validate(self.network, observed)?;
        self.log_summary(observed);

        let theta0 = theta0
            .cloned()
            .unwrap_or_else(|| Array1::zeros(self.model.dimension()));
        let mut outcome = observed.to_vec();
        let sa = stochastic_approximation(
            self.network,
            &mut outcome,
            self.model,
            &theta0,
            &self.config,
            trace,
            &mut self.rng,
        )?;
        Ok(self.estimate(sa.theta))
    }
}
