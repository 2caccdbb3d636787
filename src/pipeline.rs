//! Pipeline — load → estimate → write, strictly in sequence
//!
//! Any failure aborts the run. The error names the stage that failed. Outputs
//! are staged in temporary files and the adjacency matrix is renamed into
//! place last, so a failed run leaves no result file behind.

use crate::config::PipelineConfig;
use crate::error::LingamError;
use crate::estimator::Estimator;
use crate::io;
use crate::report::RunReport;
use chrono::Utc;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Load,
    Estimate,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Config => "config",
            Stage::Load => "load",
            Stage::Estimate => "estimate",
            Stage::Write => "write",
        };
        write!(f, "{}", name)
    }
}

/// A failure tagged with the stage that produced it
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: LingamError,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> Result<T, PipelineError>;
}

impl<T> AtStage<T> for crate::error::Result<T> {
    fn at(self, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

/// Run the whole pipeline described by `config`
pub fn run(config: &PipelineConfig) -> Result<RunReport, PipelineError> {
    let started_at = Utc::now();
    let run_id = Uuid::new_v4().to_string();

    config.validate().at(Stage::Config)?;
    let estimator = config.build_estimator().at(Stage::Config)?;

    info!("Loading {}", config.input.display());
    let table = io::load_table(&config.input).at(Stage::Load)?;
    info!(
        "Loaded {} samples x {} variables",
        table.n_samples(),
        table.n_variables()
    );

    let model = estimator.fit_model(&table).at(Stage::Estimate)?;
    let bootstrap = match &config.bootstrap {
        Some(b) => {
            let mut rng = StdRng::seed_from_u64(b.seed);
            let result = estimator.bootstrap(&table, b.n_sampling, &mut rng).at(Stage::Estimate)?;
            Some((b, result))
        }
        None => None,
    };

    // Stage every output first; the adjacency matrix is committed last so it
    // exists only if everything else was written.
    let mut staged = Vec::new();
    if let Some(path) = &config.order_output {
        staged.push(io::stage_order(path, &model.causal_order).at(Stage::Write)?);
    }
    if let Some((b, result)) = &bootstrap {
        let probabilities = config.layout.orient(result.edge_probabilities(b.min_effect));
        staged.push(io::stage_matrix(&b.output, &probabilities).at(Stage::Write)?);
    }

    let report = RunReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        input: config.input.clone(),
        output: config.output.clone(),
        estimator: estimator.name().to_string(),
        measure: config.estimator.measure,
        layout: config.layout,
        n_samples: table.n_samples(),
        n_variables: table.n_variables(),
        input_fingerprint: table.fingerprint(),
        result_fingerprint: model.adjacency.fingerprint(),
        causal_order: model.causal_order.clone(),
        edges: model.adjacency.edges(),
        bootstrap_samples: bootstrap.as_ref().map(|(_, r)| r.n_sampling()),
    };
    if let Some(path) = &config.report {
        staged.push(report.stage(path).at(Stage::Write)?);
    }
    staged.push(
        io::stage_matrix(&config.output, &model.adjacency.to_layout(config.layout)).at(Stage::Write)?,
    );

    for file in staged {
        let path = file.path().to_path_buf();
        file.commit().at(Stage::Write)?;
        info!("Wrote {}", path.display());
    }

    info!("{}", report.summary());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_stage() {
        let err = PipelineError {
            stage: Stage::Load,
            source: LingamError::estimation("boom"),
        };
        assert_eq!(err.to_string(), "load stage failed: Estimation error: boom");
    }

    #[test]
    fn test_equivalent_paths_rejected_at_config() {
        let config = PipelineConfig {
            input: "data.csv".into(),
            output: "./data.csv".into(),
            ..PipelineConfig::default()
        };
        let err = run(&config).unwrap_err();
        assert_eq!(err.stage, Stage::Config);
    }

    #[test]
    fn test_invalid_config_fails_before_reading() {
        let config = PipelineConfig {
            output: "data.csv".into(),
            ..PipelineConfig::default()
        };
        let err = run(&config).unwrap_err();
        assert_eq!(err.stage, Stage::Config);
    }
}
