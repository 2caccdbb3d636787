//! Pipeline configuration — every path and tuning knob is explicit
//!
//! Defaults mirror the plain invocation: read `data.csv`, write `result.csv`,
//! both relative to the working directory.

use crate::data::MatrixLayout;
use crate::error::{LingamError, Result};
use crate::estimator::{AdaptiveLasso, DirectLingam, Measure, PriorKnowledge};
use crate::io;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_INPUT: &str = "data.csv";
pub const DEFAULT_OUTPUT: &str = "result.csv";
pub const DEFAULT_PROBABILITIES: &str = "probabilities.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Orientation of the written adjacency matrix
    pub layout: MatrixLayout,
    /// Optional -1/0/1 matrix constraining the search
    pub prior_knowledge: Option<PathBuf>,
    /// Optional file receiving the causal order
    pub order_output: Option<PathBuf>,
    /// Optional JSON run report
    pub report: Option<PathBuf>,
    pub estimator: EstimatorConfig,
    pub bootstrap: Option<BootstrapConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            layout: MatrixLayout::default(),
            prior_knowledge: None,
            order_output: None,
            report: None,
            estimator: EstimatorConfig::default(),
            bootstrap: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub measure: Measure,
    /// Drop edges weaker than this after estimation
    pub min_effect: f64,
    pub lasso: AdaptiveLasso,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub n_sampling: usize,
    pub seed: u64,
    /// Effects at or below this magnitude do not count as edges
    pub min_effect: f64,
    pub output: PathBuf,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            n_sampling: 100,
            seed: 0,
            min_effect: 0.0,
            output: PathBuf::from(DEFAULT_PROBABILITIES),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| LingamError::io(path, e))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| LingamError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.estimator.min_effect >= 0.0 && self.estimator.min_effect.is_finite()) {
            return Err(LingamError::config("min_effect must be a finite value >= 0"));
        }
        let lasso = &self.estimator.lasso;
        if lasso.max_iter == 0 || lasso.n_lambdas == 0 {
            return Err(LingamError::config("lasso max_iter and n_lambdas must be positive"));
        }
        if !(lasso.lambda_ratio > 0.0 && lasso.lambda_ratio < 1.0) {
            return Err(LingamError::config("lasso lambda_ratio must lie in (0, 1)"));
        }
        if let Some(b) = &self.bootstrap {
            if b.n_sampling == 0 {
                return Err(LingamError::config("bootstrap n_sampling must be positive"));
            }
        }
        if same_destination(&self.input, &self.output) {
            return Err(LingamError::config("input and output must be different files"));
        }
        Ok(())
    }

    /// Build the estimator, reading the prior knowledge file if one is configured
    pub fn build_estimator(&self) -> Result<DirectLingam> {
        let mut estimator = DirectLingam::new(self.estimator.measure)
            .with_min_effect(self.estimator.min_effect)
            .with_lasso(self.estimator.lasso.clone());
        if let Some(path) = &self.prior_knowledge {
            let pk = PriorKnowledge::from_matrix(&io::load_matrix(path)?)?;
            pk.partial_orders()?;
            estimator = estimator.with_prior_knowledge(pk);
        }
        Ok(estimator)
    }
}

/// Whether two paths name the same file, whether or not it exists yet.
/// Parents are canonicalized when they exist; otherwise `.` components are ignored.
fn same_destination(a: &Path, b: &Path) -> bool {
    fn resolve(path: &Path) -> PathBuf {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        match (parent.canonicalize(), path.file_name()) {
            (Ok(dir), Some(name)) => dir.join(name),
            _ => path
                .components()
                .filter(|c| !matches!(c, Component::CurDir))
                .collect(),
        }
    }
    resolve(a) == resolve(b)
}
