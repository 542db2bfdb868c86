/*!
# Basic ALAAM sampler

A single-site Markov chain over the binary outcome vector. Each proposal picks
a node uniformly at random and proposes toggling its outcome. The change
statistics are always measured in the 0 → 1 direction, with the node's own
outcome temporarily set to 0, and the proposal is accepted with probability
`logistic(±θ·c)` (positive sign when switching on, negative when switching off).

Two modes are supported:

- [`SampleMode::PerformMove`]: accepted toggles are kept; the change vectors of
  accepted moves are summed into the to-1 or to-0 aggregate.
- [`SampleMode::DryRun`]: the outcome vector is left untouched; every examined
  node contributes its change vector to the aggregate of its would-be direction.

```rust
use mini_alaam::change_stats::Density;
use mini_alaam::model::Model;
use mini_alaam::network::Graph;
use mini_alaam::sampler::{basic_sampler, SampleMode};
use ndarray::Array1;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let g = Graph::new(10);
let model = Model::<Graph>::empty().with(Density);
let mut outcome = vec![0u8; 10];
let mut rng = SmallRng::seed_from_u64(42);

let out = basic_sampler(&g, &mut outcome, &model, &Array1::zeros(1), 100, SampleMode::DryRun, &mut rng)?;
assert!((0.0..=1.0).contains(&out.acceptance_rate));
assert_eq!(out.to_one[0], 100.0);
assert_eq!(outcome, vec![0u8; 10]);
# Ok::<(), mini_alaam::error::AlaamError>(())
```
*/

use ndarray::Array1;
use rand::Rng;

use crate::error::{ensure_finite, AlaamError, Result};
use crate::model::Model;
use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleMode {
    /// Keep accepted toggles.
    PerformMove,
    /// Measure change statistics only; never modify the outcome vector.
    DryRun,
}

/// Result of one sampler call.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerOutput {
    /// Fraction of proposals accepted, in [0, 1].
    pub acceptance_rate: f64,
    /// Summed change vectors of moves that switch a node on.
    pub to_one: Array1<f64>,
    /// Summed change vectors of moves that switch a node off.
    pub to_zero: Array1<f64>,
}

impl SamplerOutput {
    /// Net change of the statistics, `to_one - to_zero`.
    pub fn net_change(&self) -> Array1<f64> {
        &self.to_one - &self.to_zero
    }
}

/// Numerically stable logistic function.
pub fn logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Probability of accepting a toggle with change vector `change`.
pub fn acceptance_probability(theta: &Array1<f64>, change: &[f64], turning_on: bool) -> f64 {
    let total: f64 = theta.iter().zip(change).map(|(t, c)| t * c).sum();
    logistic(if turning_on { total } else { -total })
}

/**
Runs `iterations` toggle proposals against `outcome`.

# Arguments

* `network` - The fixed network the statistics are evaluated on.
* `outcome` - The current outcome vector; only modified under [`SampleMode::PerformMove`].
* `model` - The change statistics.
* `theta` - Parameter vector, one entry per statistic.
* `iterations` - Number of proposals.
* `mode` - Whether accepted moves are kept.
* `rng` - The run's random source.

# Errors

[`AlaamError::DimensionMismatch`] if `theta` or `outcome` has the wrong length,
[`AlaamError::InvalidOutcome`] if an outcome value is not 0 or 1,
[`AlaamError::Numerical`] if theta or any change statistic is not finite. On
error the outcome vector is left as it was before the failing proposal.
*/
pub fn basic_sampler<N, R>(
    network: &N,
    outcome: &mut [u8],
    model: &Model<N>,
    theta: &Array1<f64>,
    iterations: usize,
    mode: SampleMode,
    rng: &mut R,
) -> Result<SamplerOutput>
where
    N: Network + ?Sized,
    R: Rng + ?Sized,
{
    model.check_theta(theta)?;
    ensure_finite(theta, "theta", 0)?;
    if outcome.len() != network.node_count() {
        return Err(AlaamError::DimensionMismatch {
            what: "outcome vector",
            expected: network.node_count(),
            found: outcome.len(),
        });
    }
    if outcome.is_empty() {
        return Err(AlaamError::Configuration(
            "cannot sample an empty network".to_string(),
        ));
    }
    if let Some(node) = outcome.iter().position(|&v| v > 1) {
        return Err(AlaamError::InvalidOutcome {
            node,
            value: outcome[node],
        });
    }

    let n = model.dimension();
    let mut to_one = Array1::<f64>::zeros(n);
    let mut to_zero = Array1::<f64>::zeros(n);
    let mut change = vec![0.0; n];
    let mut accepted = 0usize;

    for k in 0..iterations {
        let i = rng.gen_range(0..outcome.len());
        let was_one = outcome[i] == 1;

        outcome[i] = 0;
        model.change_vector(network, outcome, i, &mut change);
        if let Err(e) = ensure_finite(&change, "change statistic", k) {
            outcome[i] = u8::from(was_one);
            return Err(e);
        }

        let p = acceptance_probability(theta, &change, !was_one);
        let accept = rng.gen::<f64>() < p;
        if accept {
            accepted += 1;
        }

        outcome[i] = match mode {
            SampleMode::PerformMove if accept => u8::from(!was_one),
            _ => u8::from(was_one),
        };

        if accept || mode == SampleMode::DryRun {
            let sum = if was_one { &mut to_zero } else { &mut to_one };
            sum.iter_mut().zip(&change).for_each(|(s, c)| *s += c);
        }
    }

    let acceptance_rate = if iterations == 0 {
        0.0
    } else {
        accepted as f64 / iterations as f64
    };

    Ok(SamplerOutput {
        acceptance_rate,
        to_one,
        to_zero,
    })
}
