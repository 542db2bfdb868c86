/*!
The network collaborator: the fixed graph (and nodal covariates) against which
change statistics are evaluated.

Estimators only ever read a network, through the [`Network`] trait. [`Graph`]
is a small in-memory implementation with sorted adjacency lists and named
binary, continuous and categorical node attributes.

```rust
use mini_alaam::network::{Graph, Network};

let g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 0)]).unwrap();
assert_eq!(g.node_count(), 4);
assert_eq!(g.degree(0), 2);
assert!(g.is_edge(2, 1));
assert_eq!(g.degree(3), 0);
```
*/

use std::collections::HashMap;

use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;

use crate::error::{AlaamError, Result};

/// Read-only view of a graph with optional node covariates.
///
/// For directed graphs `neighbors` yields out-neighbours and `in_neighbors`
/// yields in-neighbours; undirected graphs return the same list for both.
pub trait Network {
    fn node_count(&self) -> usize;

    fn neighbors(&self, i: usize) -> &[usize];

    fn is_directed(&self) -> bool {
        false
    }

    fn in_neighbors(&self, i: usize) -> &[usize] {
        self.neighbors(i)
    }

    fn degree(&self, i: usize) -> usize {
        self.neighbors(i).len()
    }

    fn in_degree(&self, i: usize) -> usize {
        self.in_neighbors(i).len()
    }

    fn is_edge(&self, i: usize, j: usize) -> bool {
        self.neighbors(i).contains(&j)
    }

    /// `None` when the attribute does not exist or the value is missing.
    fn binary_attribute(&self, _name: &str, _i: usize) -> Option<bool> {
        None
    }

    /// `None` when the attribute does not exist; missing values are `NaN`.
    fn continuous_attribute(&self, _name: &str, _i: usize) -> Option<f64> {
        None
    }

    /// Category code of node `i`. `None` when the attribute does not exist
    /// or the value is missing.
    fn categorical_attribute(&self, _name: &str, _i: usize) -> Option<u32> {
        None
    }

    fn edge_count(&self) -> usize {
        let total: usize = (0..self.node_count()).map(|i| self.degree(i)).sum();
        if self.is_directed() {
            total
        } else {
            total / 2
        }
    }

    fn density(&self) -> f64 {
        let n = self.node_count() as f64;
        if n < 2.0 {
            return 0.0;
        }
        let pairs = if self.is_directed() {
            n * (n - 1.0)
        } else {
            n * (n - 1.0) / 2.0
        };
        self.edge_count() as f64 / pairs
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    directed: bool,
    out_adj: Vec<Vec<usize>>,
    in_adj: Vec<Vec<usize>>,
    binary_attrs: HashMap<String, Vec<Option<bool>>>,
    continuous_attrs: HashMap<String, Vec<f64>>,
    categorical_attrs: HashMap<String, Vec<Option<u32>>>,
}

impl Graph {
    /// An undirected graph with `n` isolated nodes.
    pub fn new(n: usize) -> Self {
        Self {
            directed: false,
            out_adj: vec![Vec::new(); n],
            in_adj: Vec::new(),
            ..Default::default()
        }
    }

    /// A directed graph with `n` isolated nodes.
    pub fn new_directed(n: usize) -> Self {
        Self {
            directed: true,
            out_adj: vec![Vec::new(); n],
            in_adj: vec![Vec::new(); n],
            ..Default::default()
        }
    }

    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut g = Self::new(n);
        for &(i, j) in edges {
            g.add_edge(i, j)?;
        }
        Ok(g)
    }

    pub fn from_arcs(n: usize, arcs: &[(usize, usize)]) -> Result<Self> {
        let mut g = Self::new_directed(n);
        for &(i, j) in arcs {
            g.add_edge(i, j)?;
        }
        Ok(g)
    }

    /// Erdős–Rényi G(n, p) graph, undirected.
    pub fn erdos_renyi<R: Rng + ?Sized>(n: usize, p: f64, rng: &mut R) -> Result<Self> {
        let coin = Bernoulli::new(p)
            .map_err(|e| AlaamError::Configuration(format!("edge probability {p}: {e}")))?;
        let mut g = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                if coin.sample(rng) {
                    g.add_edge(i, j)?;
                }
            }
        }
        Ok(g)
    }

    /// Adds the edge (arc, if directed) `i -> j`. Self-loops and duplicates are ignored.
    pub fn add_edge(&mut self, i: usize, j: usize) -> Result<()> {
        let n = self.out_adj.len();
        if i >= n || j >= n {
            return Err(AlaamError::Configuration(format!(
                "edge ({i}, {j}) refers to a node outside 0..{n}"
            )));
        }
        if i == j {
            return Ok(());
        }
        insert_sorted(&mut self.out_adj[i], j);
        if self.directed {
            insert_sorted(&mut self.in_adj[j], i);
        } else {
            insert_sorted(&mut self.out_adj[j], i);
        }
        Ok(())
    }

    pub fn set_binary_attribute(&mut self, name: &str, values: Vec<Option<bool>>) -> Result<()> {
        self.check_attribute_len(values.len())?;
        self.binary_attrs.insert(name.to_string(), values);
        Ok(())
    }

    pub fn set_continuous_attribute(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        self.check_attribute_len(values.len())?;
        self.continuous_attrs.insert(name.to_string(), values);
        Ok(())
    }

    pub fn set_categorical_attribute(&mut self, name: &str, values: Vec<Option<u32>>) -> Result<()> {
        self.check_attribute_len(values.len())?;
        self.categorical_attrs.insert(name.to_string(), values);
        Ok(())
    }

    fn check_attribute_len(&self, len: usize) -> Result<()> {
        if len != self.out_adj.len() {
            return Err(AlaamError::DimensionMismatch {
                what: "node attribute",
                expected: self.out_adj.len(),
                found: len,
            });
        }
        Ok(())
    }
}

fn insert_sorted(list: &mut Vec<usize>, v: usize) {
    if let Err(pos) = list.binary_search(&v) {
        list.insert(pos, v);
    }
}

impl Network for Graph {
    fn node_count(&self) -> usize {
        self.out_adj.len()
    }

    fn neighbors(&self, i: usize) -> &[usize] {
        &self.out_adj[i]
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn in_neighbors(&self, i: usize) -> &[usize] {
        if self.directed {
            &self.in_adj[i]
        } else {
            &self.out_adj[i]
        }
    }

    fn is_edge(&self, i: usize, j: usize) -> bool {
        self.out_adj[i].binary_search(&j).is_ok()
    }

    fn binary_attribute(&self, name: &str, i: usize) -> Option<bool> {
        self.binary_attrs.get(name).and_then(|v| v[i])
    }

    fn continuous_attribute(&self, name: &str, i: usize) -> Option<f64> {
        self.continuous_attrs.get(name).map(|v| v[i])
    }

    fn categorical_attribute(&self, name: &str, i: usize) -> Option<u32> {
        self.categorical_attrs.get(name).and_then(|v| v[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn undirected_edges_are_symmetric_and_deduplicated() {
        let mut g = Graph::new(3);
        g.add_edge(0, 1).unwrap();
        g.add_edge(1, 0).unwrap();
        g.add_edge(2, 2).unwrap();
        assert_eq!(g.neighbors(0), &[1]);
        assert_eq!(g.neighbors(1), &[0]);
        assert_eq!(g.degree(2), 0);
        assert_eq!(g.edge_count(), 1);
        assert!((g.density() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn directed_graph_tracks_in_and_out_neighbours() {
        let g = Graph::from_arcs(3, &[(0, 1), (0, 2), (2, 1)]).unwrap();
        assert!(g.is_directed());
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.in_degree(1), 2);
        assert_eq!(g.in_neighbors(1), &[0, 2]);
        assert!(g.is_edge(0, 1));
        assert!(!g.is_edge(1, 0));
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn out_of_range_edge_is_rejected() {
        let err = Graph::from_edges(2, &[(0, 5)]).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn attributes_must_cover_every_node() {
        let mut g = Graph::new(3);
        assert!(g.set_continuous_attribute("age", vec![1.0, 2.0]).is_err());
        g.set_binary_attribute("male", vec![Some(true), None, Some(false)])
            .unwrap();
        assert_eq!(g.binary_attribute("male", 0), Some(true));
        assert_eq!(g.binary_attribute("male", 1), None);
        assert_eq!(g.binary_attribute("female", 0), None);
    }

    #[test]
    fn categorical_attribute_lookup() {
        let mut g = Graph::new(4);
        assert!(g.set_categorical_attribute("class", vec![Some(1), Some(2)]).is_err());
        g.set_categorical_attribute("class", vec![Some(3), None, Some(0), Some(3)])
            .unwrap();
        assert_eq!(g.categorical_attribute("class", 0), Some(3));
        assert_eq!(g.categorical_attribute("class", 1), None);
        assert_eq!(g.categorical_attribute("class", 2), Some(0));
        assert_eq!(g.categorical_attribute("school", 0), None);
    }

    #[test]
    fn erdos_renyi_is_reproducible() {
        let g1 = Graph::erdos_renyi(30, 0.2, &mut SmallRng::seed_from_u64(3)).unwrap();
        let g2 = Graph::erdos_renyi(30, 0.2, &mut SmallRng::seed_from_u64(3)).unwrap();
        for i in 0..30 {
            assert_eq!(g1.neighbors(i), g2.neighbors(i));
        }
        assert!(Graph::erdos_renyi(5, 1.5, &mut SmallRng::seed_from_u64(3)).is_err());
    }
}
