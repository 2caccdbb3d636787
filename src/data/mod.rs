//! Data model — observation tables in, weighted DAG adjacency matrices out
//!
//! An observation table holds N samples (rows) of M variables (columns).
//! An adjacency matrix is M × M with entry (i, j) the direct effect i → j.

mod table;
mod adjacency;
mod simulate;

pub use table::ObservationTable;
pub use adjacency::{AdjacencyMatrix, Edge, MatrixLayout};
pub use simulate::simulate_sem;
