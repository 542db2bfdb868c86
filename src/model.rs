/*!
An ALAAM specification: the ordered change statistics and their labels.

The model fixes the parameter dimension `n` for a run. Everything that has to
hold before sampling starts (label count, outcome length and domain, theta
length) is checked here.

```rust
use mini_alaam::change_stats::{Activity, Contagion, Density};
use mini_alaam::model::Model;
use mini_alaam::network::Graph;

let model = Model::<Graph>::empty()
    .with(Density)
    .with(Activity)
    .with_labelled(Contagion, "Influence");
assert_eq!(model.dimension(), 3);
assert_eq!(model.labels(), &["Density", "Activity", "Influence"]);
```
*/

use ndarray::Array1;

use crate::change_stats::ChangeStatistic;
use crate::error::{ensure_finite, AlaamError, Result};
use crate::network::Network;

pub struct Model<N: Network + ?Sized> {
    statistics: Vec<Box<dyn ChangeStatistic<N>>>,
    labels: Vec<String>,
}

impl<N: Network + ?Sized> Model<N> {
    /// Builds a model from statistics and matching labels.
    pub fn new(statistics: Vec<Box<dyn ChangeStatistic<N>>>, labels: Vec<String>) -> Result<Self> {
        if statistics.len() != labels.len() {
            return Err(AlaamError::DimensionMismatch {
                what: "labels",
                expected: statistics.len(),
                found: labels.len(),
            });
        }
        Ok(Self { statistics, labels })
    }

    /// Builds a model labelled with each statistic's own label.
    pub fn with_default_labels(statistics: Vec<Box<dyn ChangeStatistic<N>>>) -> Self {
        let labels = statistics.iter().map(|s| s.label()).collect();
        Self { statistics, labels }
    }

    pub fn empty() -> Self {
        Self {
            statistics: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn with<S: ChangeStatistic<N> + 'static>(self, statistic: S) -> Self {
        let label = statistic.label();
        self.with_labelled(statistic, &label)
    }

    pub fn with_labelled<S: ChangeStatistic<N> + 'static>(mut self, statistic: S, label: &str) -> Self {
        self.statistics.push(Box::new(statistic));
        self.labels.push(label.to_string());
        self
    }

    pub fn dimension(&self) -> usize {
        self.statistics.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Writes the change vector for node `i` into `out`.
    pub fn change_vector(&self, network: &N, outcome: &[u8], i: usize, out: &mut [f64]) {
        for (slot, stat) in out.iter_mut().zip(&self.statistics) {
            *slot = stat.change(network, outcome, i);
        }
    }

    /// Checks the model is non-empty and the outcome vector matches the network.
    pub fn validate(&self, network: &N, outcome: &[u8]) -> Result<()> {
        if self.statistics.is_empty() {
            return Err(AlaamError::Configuration(
                "model has no change statistics".to_string(),
            ));
        }
        if outcome.len() != network.node_count() {
            return Err(AlaamError::DimensionMismatch {
                what: "outcome vector",
                expected: network.node_count(),
                found: outcome.len(),
            });
        }
        if let Some((node, &value)) = outcome.iter().enumerate().find(|(_, &v)| v > 1) {
            return Err(AlaamError::InvalidOutcome { node, value });
        }
        Ok(())
    }

    pub fn check_theta(&self, theta: &Array1<f64>) -> Result<()> {
        if theta.len() != self.dimension() {
            return Err(AlaamError::DimensionMismatch {
                what: "theta",
                expected: self.dimension(),
                found: theta.len(),
            });
        }
        Ok(())
    }

    /// Observed statistics Zobs, built by switching the positive nodes on one at
    /// a time, in index order, starting from an all-zero working copy.
    pub fn observed_statistics(&self, network: &N, outcome: &[u8]) -> Result<Array1<f64>> {
        self.validate(network, outcome)?;
        let mut zobs = Array1::<f64>::zeros(self.dimension());
        let mut working = vec![0u8; outcome.len()];
        let mut change = vec![0.0; self.dimension()];
        for (i, &value) in outcome.iter().enumerate() {
            if value == 1 {
                self.change_vector(network, &working, i, &mut change);
                ensure_finite(&change, "observed statistics", i)?;
                zobs.iter_mut().zip(&change).for_each(|(z, c)| *z += c);
                working[i] = 1;
            }
        }
        if working != outcome {
            return Err(AlaamError::Configuration(
                "working copy diverged from the observed outcome vector".to_string(),
            ));
        }
        Ok(zobs)
    }
}
