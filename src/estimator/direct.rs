//! DirectLiNGAM — causal order by repeated exogeneity search, then
//! adaptive-lasso regression of each variable on its predecessors.

use super::lasso::AdaptiveLasso;
use super::measure::{kernel_score, pwling_score, Measure};
use super::prior::PriorKnowledge;
use super::stats::{residual, standardize, standardize_columns};
use super::{CausalModel, Estimator};
use crate::data::{AdjacencyMatrix, ObservationTable};
use crate::error::{LingamError, Result};
use log::{debug, info};
use nalgebra::{DMatrix, DVector};

/// The DirectLiNGAM estimator
#[derive(Debug, Clone, Default)]
pub struct DirectLingam {
    pub measure: Measure,
    pub lasso: AdaptiveLasso,
    pub prior_knowledge: Option<PriorKnowledge>,
    /// Edges weaker than this are dropped after estimation (0 keeps all)
    pub min_effect: f64,
}

impl DirectLingam {
    pub fn new(measure: Measure) -> Self {
        Self { measure, ..Self::default() }
    }

    pub fn with_prior_knowledge(mut self, prior_knowledge: PriorKnowledge) -> Self {
        self.prior_knowledge = Some(prior_knowledge);
        self
    }

    pub fn with_min_effect(mut self, min_effect: f64) -> Self {
        self.min_effect = min_effect;
        self
    }

    pub fn with_lasso(mut self, lasso: AdaptiveLasso) -> Self {
        self.lasso = lasso;
        self
    }

    /// Estimate the causal order and the pruned adjacency matrix
    pub fn fit_model(&self, table: &ObservationTable) -> Result<CausalModel> {
        self.check_input(table)?;
        let x = table.as_matrix();
        info!(
            "DirectLiNGAM ({}) on {} samples x {} variables",
            self.measure,
            table.n_samples(),
            table.n_variables()
        );

        let causal_order = self.search_causal_order(x)?;
        debug!("Causal order: {:?}", causal_order);

        let adjacency = self.estimate_adjacency(x, &causal_order)?;
        if !adjacency.is_acyclic() {
            return Err(LingamError::estimation("estimated graph contains a cycle"));
        }
        info!("{}", adjacency.summary());

        Ok(CausalModel { causal_order, adjacency })
    }

    fn check_input(&self, table: &ObservationTable) -> Result<()> {
        let (n, m) = (table.n_samples(), table.n_variables());
        if m < 2 {
            return Err(LingamError::estimation(format!(
                "need at least 2 variables, got {}",
                m
            )));
        }
        if n < m {
            return Err(LingamError::estimation(format!(
                "need at least as many samples as variables, got {} samples for {} variables",
                n, m
            )));
        }
        if let Some(pk) = &self.prior_knowledge {
            if pk.n_variables() != m {
                return Err(LingamError::config(format!(
                    "prior knowledge covers {} variables, data has {}",
                    pk.n_variables(),
                    m
                )));
            }
        }
        Ok(())
    }

    fn search_causal_order(&self, x: &DMatrix<f64>) -> Result<Vec<usize>> {
        let n_vars = x.ncols();
        let mut work = match self.measure {
            Measure::Kernel => standardize_columns(x),
            Measure::Pwling => x.clone(),
        };
        let mut partial_orders = match &self.prior_knowledge {
            Some(pk) => pk.partial_orders()?,
            None => Vec::new(),
        };

        let mut remaining: Vec<usize> = (0..n_vars).collect();
        let mut order = Vec::with_capacity(n_vars);

        while !remaining.is_empty() {
            let candidates: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|v| !partial_orders.iter().any(|(_, after)| after == v))
                .collect();
            if candidates.is_empty() {
                return Err(LingamError::config(
                    "prior knowledge orders the remaining variables in a cycle",
                ));
            }

            let chosen = if candidates.len() == 1 {
                candidates[0]
            } else {
                self.most_exogenous(&work, &candidates, &remaining)
            };

            let root = work.column(chosen).into_owned();
            for &i in remaining.iter().filter(|&&i| i != chosen) {
                let r = residual(&work.column(i).into_owned(), &root);
                work.set_column(i, &r);
            }

            order.push(chosen);
            remaining.retain(|&v| v != chosen);
            partial_orders.retain(|(before, _)| *before != chosen);
        }

        Ok(order)
    }

    /// Ties (including all-degenerate candidates) go to the lowest index
    fn most_exogenous(&self, work: &DMatrix<f64>, candidates: &[usize], remaining: &[usize]) -> usize {
        let n = work.nrows();
        let mut columns = vec![DVector::zeros(n); work.ncols()];
        for &v in remaining {
            let col = work.column(v).into_owned();
            columns[v] = match self.measure {
                Measure::Pwling => standardize(&col),
                Measure::Kernel => col,
            };
        }

        let mut best = candidates[0];
        match self.measure {
            Measure::Pwling => {
                let mut best_score = f64::NEG_INFINITY;
                for &i in candidates {
                    let score = pwling_score(&columns, i, remaining);
                    if score > best_score {
                        best_score = score;
                        best = i;
                    }
                }
            }
            Measure::Kernel => {
                let mut best_score = f64::INFINITY;
                for &j in candidates {
                    let score = kernel_score(&columns, j, remaining);
                    if score < best_score {
                        best_score = score;
                        best = j;
                    }
                }
            }
        }
        best
    }

    fn estimate_adjacency(&self, x: &DMatrix<f64>, order: &[usize]) -> Result<AdjacencyMatrix> {
        let standardized = standardize_columns(x);
        let mut adjacency = AdjacencyMatrix::zeros(x.ncols());

        for (k, &target) in order.iter().enumerate().skip(1) {
            let predictors: Vec<usize> = order[..k]
                .iter()
                .copied()
                .filter(|&p| {
                    self.prior_knowledge
                        .as_ref()
                        .map_or(true, |pk| pk.allows_edge(p, target))
                })
                .collect();
            if predictors.is_empty() {
                continue;
            }

            let coef = self.lasso.fit(x, &standardized, &predictors, target)?;
            for (&p, &c) in predictors.iter().zip(coef.iter()) {
                if c != 0.0 {
                    adjacency.set_weight(p, target, c);
                }
            }
        }

        if self.min_effect > 0.0 {
            let removed = adjacency.prune(self.min_effect);
            debug!("Pruned {} edges below {}", removed, self.min_effect);
        }
        Ok(adjacency)
    }
}

impl Estimator for DirectLingam {
    fn name(&self) -> &str {
        "DirectLiNGAM"
    }

    fn fit(&self, table: &ObservationTable) -> Result<AdjacencyMatrix> {
        Ok(self.fit_model(table)?.adjacency)
    }
}
