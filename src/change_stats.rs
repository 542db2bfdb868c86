/*!
Change statistics: the marginal effect on a model statistic of switching one
node's outcome from 0 to 1, given the rest of the outcome vector.

A statistic is anything implementing [`ChangeStatistic`]; plain closures of
type `Fn(&N, &[u8], usize) -> f64` qualify through a blanket impl. The structs
in this module cover the usual structural and covariate terms of an ALAAM.

```rust
use mini_alaam::change_stats::{ChangeStatistic, Contagion, Density};
use mini_alaam::network::Graph;

let g = Graph::from_edges(3, &[(0, 1), (0, 2)]).unwrap();
let outcome = [0u8, 1, 1];
assert_eq!(Density.change(&g, &outcome, 0), 1.0);
assert_eq!(Contagion.change(&g, &outcome, 0), 2.0);
```
*/

use crate::network::Network;

/// A side-effect-free function of (network, outcome vector, node).
pub trait ChangeStatistic<N: Network + ?Sized> {
    /// Change in the statistic when `outcome[i]` goes from 0 to 1.
    fn change(&self, network: &N, outcome: &[u8], i: usize) -> f64;

    /// Label used in trace headers and result tables.
    fn label(&self) -> String {
        "Custom".to_string()
    }
}

impl<N, F> ChangeStatistic<N> for F
where
    N: Network + ?Sized,
    F: Fn(&N, &[u8], usize) -> f64,
{
    fn change(&self, network: &N, outcome: &[u8], i: usize) -> f64 {
        self(network, outcome, i)
    }
}

/// Baseline propensity: always 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Density;

impl<N: Network + ?Sized> ChangeStatistic<N> for Density {
    fn change(&self, _network: &N, _outcome: &[u8], _i: usize) -> f64 {
        1.0
    }

    fn label(&self) -> String {
        "Density".to_string()
    }
}

/// Degree of the node.
#[derive(Debug, Clone, Copy, Default)]
pub struct Activity;

impl<N: Network + ?Sized> ChangeStatistic<N> for Activity {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        network.degree(i) as f64
    }

    fn label(&self) -> String {
        "Activity".to_string()
    }
}

/// Out-degree of the node (directed networks).
#[derive(Debug, Clone, Copy, Default)]
pub struct Sender;

impl<N: Network + ?Sized> ChangeStatistic<N> for Sender {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        network.neighbors(i).len() as f64
    }

    fn label(&self) -> String {
        "Sender".to_string()
    }
}

/// In-degree of the node (directed networks).
#[derive(Debug, Clone, Copy, Default)]
pub struct Receiver;

impl<N: Network + ?Sized> ChangeStatistic<N> for Receiver {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        network.in_degree(i) as f64
    }

    fn label(&self) -> String {
        "Receiver".to_string()
    }
}

/// Number of neighbours whose outcome is 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Contagion;

impl<N: Network + ?Sized> ChangeStatistic<N> for Contagion {
    fn change(&self, network: &N, outcome: &[u8], i: usize) -> f64 {
        network
            .neighbors(i)
            .iter()
            .filter(|&&j| outcome[j] == 1)
            .count() as f64
    }

    fn label(&self) -> String {
        "Contagion".to_string()
    }
}

/// Stars of size two centred on the node: C(degree, 2).
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoStar;

impl<N: Network + ?Sized> ChangeStatistic<N> for TwoStar {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        let d = network.degree(i) as f64;
        d * (d - 1.0) / 2.0
    }

    fn label(&self) -> String {
        "TwoStar".to_string()
    }
}

/// Stars of size three centred on the node: C(degree, 3).
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeStar;

impl<N: Network + ?Sized> ChangeStatistic<N> for ThreeStar {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        let d = network.degree(i) as f64;
        d * (d - 1.0) * (d - 2.0) / 6.0
    }

    fn label(&self) -> String {
        "ThreeStar".to_string()
    }
}

/// Triangles the node participates in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleT1;

impl<N: Network + ?Sized> ChangeStatistic<N> for TriangleT1 {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        let nbrs = network.neighbors(i);
        let mut count = 0usize;
        for (a, &j) in nbrs.iter().enumerate() {
            for &k in &nbrs[a + 1..] {
                if network.is_edge(j, k) {
                    count += 1;
                }
            }
        }
        count as f64
    }

    fn label(&self) -> String {
        "T1".to_string()
    }
}

/// Binary node covariate; missing values count as 0.
#[derive(Debug, Clone)]
pub struct BinaryCovariate {
    pub name: String,
}

impl BinaryCovariate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl<N: Network + ?Sized> ChangeStatistic<N> for BinaryCovariate {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        match network.binary_attribute(&self.name, i) {
            Some(true) => 1.0,
            _ => 0.0,
        }
    }

    fn label(&self) -> String {
        format!("oOb_{}", self.name)
    }
}

/// Continuous node covariate. An unknown attribute yields `NaN`, which the
/// sampler reports as a numerical error.
#[derive(Debug, Clone)]
pub struct ContinuousCovariate {
    pub name: String,
}

impl ContinuousCovariate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl<N: Network + ?Sized> ChangeStatistic<N> for ContinuousCovariate {
    fn change(&self, network: &N, _outcome: &[u8], i: usize) -> f64 {
        network
            .continuous_attribute(&self.name, i)
            .unwrap_or(f64::NAN)
    }

    fn label(&self) -> String {
        format!("oOc_{}", self.name)
    }
}
