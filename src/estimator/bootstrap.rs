//! Bootstrap — refit on resampled rows to measure how stable each edge is

use super::DirectLingam;
use crate::data::{AdjacencyMatrix, ObservationTable};
use crate::error::{LingamError, Result};
use log::info;
use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Models fitted on bootstrap resamples of one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapResult {
    pub adjacency_matrices: Vec<AdjacencyMatrix>,
    pub causal_orders: Vec<Vec<usize>>,
}

impl BootstrapResult {
    pub fn n_sampling(&self) -> usize {
        self.adjacency_matrices.len()
    }

    /// Share of resamples in which |b_ij| exceeds `min_effect`, per edge i → j
    pub fn edge_probabilities(&self, min_effect: f64) -> DMatrix<f64> {
        let n = self.adjacency_matrices.first().map(|a| a.n_variables()).unwrap_or(0);
        let mut counts = DMatrix::zeros(n, n);
        for adj in &self.adjacency_matrices {
            for e in adj.edges() {
                if e.weight.abs() > min_effect {
                    counts[(e.from, e.to)] += 1.0;
                }
            }
        }
        if self.n_sampling() > 0 {
            counts /= self.n_sampling() as f64;
        }
        counts
    }
}

impl DirectLingam {
    /// Fit `n_sampling` resamples (rows drawn with replacement) of `table`
    pub fn bootstrap<R: Rng>(
        &self,
        table: &ObservationTable,
        n_sampling: usize,
        rng: &mut R,
    ) -> Result<BootstrapResult> {
        if n_sampling == 0 {
            return Err(LingamError::config("bootstrap needs at least one resample"));
        }
        let n = table.n_samples();
        let mut result = BootstrapResult {
            adjacency_matrices: Vec::with_capacity(n_sampling),
            causal_orders: Vec::with_capacity(n_sampling),
        };

        for k in 0..n_sampling {
            let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n.max(1))).collect();
            let model = self.fit_model(&table.resample(&rows)).map_err(|e| match e {
                LingamError::Estimation(msg) => {
                    LingamError::Estimation(format!("bootstrap resample {}: {}", k, msg))
                }
                other => other,
            })?;
            result.causal_orders.push(model.causal_order);
            result.adjacency_matrices.push(model.adjacency);
        }

        info!("Bootstrap finished: {} resamples", n_sampling);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::simulate_sem;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_bootstrap_chain() {
        let mut g = AdjacencyMatrix::zeros(3);
        g.set_weight(0, 1, 1.5);
        g.set_weight(1, 2, -1.2);
        let mut rng = StdRng::seed_from_u64(42);
        let table = simulate_sem(&g, 1000, &mut rng).unwrap();

        let result = DirectLingam::default().bootstrap(&table, 10, &mut rng).unwrap();
        assert_eq!(result.n_sampling(), 10);
        assert_eq!(result.causal_orders.len(), 10);

        let probs = result.edge_probabilities(0.1);
        println!("edge probabilities:\n{}", probs);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs[(0, 1)] >= 0.9);
        assert!(probs[(1, 2)] >= 0.9);
        assert!(probs[(2, 0)] <= 0.1);
    }

    #[test]
    fn test_zero_resamples_rejected() {
        let table = ObservationTable::from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0], vec![0.0, 3.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(DirectLingam::default().bootstrap(&table, 0, &mut rng).is_err());
    }

    #[test]
    fn test_edge_probabilities_counts() {
        let mut a = AdjacencyMatrix::zeros(2);
        a.set_weight(0, 1, 0.5);
        let b = AdjacencyMatrix::zeros(2);
        let result = BootstrapResult {
            adjacency_matrices: vec![a.clone(), a, b],
            causal_orders: vec![vec![0, 1]; 3],
        };
        let probs = result.edge_probabilities(0.0);
        assert!((probs[(0, 1)] - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(probs[(1, 0)], 0.0);
        assert_eq!(result.edge_probabilities(0.6)[(0, 1)], 0.0);
    }
}
