//! AdjacencyMatrix — weighted directed graph over M variables
//!
//! Entry (i, j) holds the direct linear effect of variable i on variable j;
//! zero means no edge. Rows are sources, columns are targets.

use crate::error::{LingamError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// A single directed edge `from → to` with its coefficient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: f64,
}

/// Orientation used when writing an adjacency matrix to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatrixLayout {
    /// Row i, column j = effect of i on j
    #[default]
    SourceRows,
    /// Row i, column j = effect of j on i (the x = Bx + e convention)
    TargetRows,
}

impl FromStr for MatrixLayout {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "source-rows" => Ok(MatrixLayout::SourceRows),
            "target-rows" => Ok(MatrixLayout::TargetRows),
            other => Err(format!(
                "unknown layout '{}' (expected source-rows or target-rows)",
                other
            )),
        }
    }
}

impl MatrixLayout {
    /// Reorient a source-rows matrix into this layout
    pub fn orient(self, source_rows: DMatrix<f64>) -> DMatrix<f64> {
        match self {
            MatrixLayout::SourceRows => source_rows,
            MatrixLayout::TargetRows => source_rows.transpose(),
        }
    }
}

impl fmt::Display for MatrixLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixLayout::SourceRows => write!(f, "source-rows"),
            MatrixLayout::TargetRows => write!(f, "target-rows"),
        }
    }
}

/// Square weighted adjacency matrix of a causal graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    weights: DMatrix<f64>,
}

impl AdjacencyMatrix {
    pub fn new(weights: DMatrix<f64>) -> Result<Self> {
        if !weights.is_square() {
            return Err(LingamError::estimation(format!(
                "adjacency matrix must be square, got {}x{}",
                weights.nrows(),
                weights.ncols()
            )));
        }
        Ok(Self { weights })
    }

    pub fn zeros(n_variables: usize) -> Self {
        Self { weights: DMatrix::zeros(n_variables, n_variables) }
    }

    pub fn n_variables(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weight(&self, from: usize, to: usize) -> f64 {
        self.weights[(from, to)]
    }

    pub fn set_weight(&mut self, from: usize, to: usize, weight: f64) {
        self.weights[(from, to)] = weight;
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.weights
    }

    /// Matrix in the requested on-disk orientation
    pub fn to_layout(&self, layout: MatrixLayout) -> DMatrix<f64> {
        layout.orient(self.weights.clone())
    }

    /// All nonzero edges, ordered by source then target
    pub fn edges(&self) -> Vec<Edge> {
        let n = self.n_variables();
        let mut edges = Vec::new();
        for from in 0..n {
            for to in 0..n {
                let weight = self.weights[(from, to)];
                if weight != 0.0 {
                    edges.push(Edge { from, to, weight });
                }
            }
        }
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }

    /// Zero every edge whose magnitude is below `min_effect`; returns edges removed
    pub fn prune(&mut self, min_effect: f64) -> usize {
        let mut removed = 0;
        for w in self.weights.iter_mut() {
            if *w != 0.0 && w.abs() < min_effect {
                *w = 0.0;
                removed += 1;
            }
        }
        removed
    }

    /// Topological order of the nonzero graph (Kahn), `None` if it has a cycle
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        let n = self.n_variables();
        let mut in_degree: Vec<usize> = (0..n)
            .map(|to| (0..n).filter(|&from| self.weights[(from, to)] != 0.0).count())
            .collect();
        let mut ready: VecDeque<usize> = (0..n).filter(|&v| in_degree[v] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(v) = ready.pop_front() {
            order.push(v);
            for to in 0..n {
                if self.weights[(v, to)] != 0.0 {
                    in_degree[to] -= 1;
                    if in_degree[to] == 0 {
                        ready.push_back(to);
                    }
                }
            }
        }

        (order.len() == n).then_some(order)
    }

    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_some()
    }

    /// SHA256 over every weight, column-major
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for val in self.weights.iter() {
            hasher.update(val.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn summary(&self) -> String {
        format!(
            "AdjacencyMatrix | variables={} | edges={} | acyclic={}",
            self.n_variables(),
            self.edge_count(),
            self.is_acyclic()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chain() -> AdjacencyMatrix {
        // 0 → 1 → 2
        AdjacencyMatrix::new(DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 0.8, 0.0, 0.0, 0.0, -1.2, 0.0, 0.0, 0.0],
        ))
        .unwrap()
    }

    #[test]
    fn test_rejects_non_square() {
        assert!(AdjacencyMatrix::new(DMatrix::zeros(2, 3)).is_err());
    }

    #[test]
    fn test_edges() {
        let adj = chain();
        let edges = adj.edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0], Edge { from: 0, to: 1, weight: 0.8 });
        assert_eq!(edges[1], Edge { from: 1, to: 2, weight: -1.2 });
        assert_eq!(adj.edge_count(), 2);
    }

    #[test]
    fn test_topological_order() {
        assert_eq!(chain().topological_order(), Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_detects_cycle() {
        let mut adj = chain();
        adj.set_weight(2, 0, 0.5);
        assert!(!adj.is_acyclic());
        assert!(adj.topological_order().is_none());
    }

    #[test]
    fn test_self_loop_is_cycle() {
        let mut adj = AdjacencyMatrix::zeros(2);
        adj.set_weight(1, 1, 1.0);
        assert!(!adj.is_acyclic());
    }

    #[test]
    fn test_prune() {
        let mut adj = chain();
        adj.set_weight(0, 2, 0.05);
        assert_eq!(adj.prune(0.1), 1);
        assert_eq!(adj.weight(0, 2), 0.0);
        assert_eq!(adj.edge_count(), 2);
    }

    #[test]
    fn test_layout() {
        let adj = chain();
        assert_eq!(adj.to_layout(MatrixLayout::SourceRows)[(0, 1)], 0.8);
        assert_eq!(adj.to_layout(MatrixLayout::TargetRows)[(1, 0)], 0.8);
        assert_eq!("target-rows".parse::<MatrixLayout>().unwrap(), MatrixLayout::TargetRows);
        assert!("columns".parse::<MatrixLayout>().is_err());
    }

    proptest! {
        #[test]
        fn prop_permuted_triangular_is_acyclic(
            n in 2usize..8,
            seed in any::<u64>(),
        ) {
            use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
            let mut rng = StdRng::seed_from_u64(seed);
            let mut perm: Vec<usize> = (0..n).collect();
            perm.shuffle(&mut rng);

            let mut adj = AdjacencyMatrix::zeros(n);
            for a in 0..n {
                for b in (a + 1)..n {
                    if rng.gen_bool(0.5) {
                        adj.set_weight(perm[a], perm[b], rng.gen_range(0.1..2.0));
                    }
                }
            }
            let order = adj.topological_order();
            prop_assert!(order.is_some());
            let order = order.unwrap();
            let position: Vec<usize> = {
                let mut pos = vec![0; n];
                for (k, v) in order.iter().enumerate() { pos[*v] = k; }
                pos
            };
            for e in adj.edges() {
                prop_assert!(position[e.from] < position[e.to]);
            }
        }
    }
}
