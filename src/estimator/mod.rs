//! Causal estimation — from an observation table to a weighted DAG
//!
//! `Estimator` is the seam the pipeline depends on; `DirectLingam` is the
//! implementation shipped with the crate.

mod stats;
mod measure;
mod lasso;
mod prior;
mod direct;
mod bootstrap;

pub use measure::Measure;
pub use lasso::AdaptiveLasso;
pub use prior::{Knowledge, PriorKnowledge};
pub use direct::DirectLingam;
pub use bootstrap::BootstrapResult;

use crate::data::{AdjacencyMatrix, ObservationTable};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Anything that can learn a causal graph from observations
pub trait Estimator {
    fn name(&self) -> &str;

    /// Fit the table and return the pruned adjacency matrix (row = cause, column = effect)
    fn fit(&self, table: &ObservationTable) -> Result<AdjacencyMatrix>;
}

/// A fitted causal model: the variable order and the adjacency matrix consistent with it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalModel {
    pub causal_order: Vec<usize>,
    pub adjacency: AdjacencyMatrix,
}
