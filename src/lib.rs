//! LiNGAM — causal structure discovery from observational data
//!
//! Reads a table of samples × variables, estimates a linear non-Gaussian
//! acyclic model with DirectLiNGAM, and writes the weighted adjacency matrix
//! of the resulting DAG.

pub mod config;
pub mod data;
pub mod error;
pub mod estimator;
pub mod io;
pub mod pipeline;
pub mod report;

pub use config::PipelineConfig;
pub use data::{AdjacencyMatrix, MatrixLayout, ObservationTable};
pub use error::{LingamError, Result};
pub use estimator::{CausalModel, DirectLingam, Estimator, Measure, PriorKnowledge};
pub use pipeline::{run, PipelineError, Stage};
pub use report::RunReport;
