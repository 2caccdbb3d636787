//! Run report — a JSON record of what a pipeline run read, found and wrote

use crate::data::{Edge, MatrixLayout};
use crate::error::{LingamError, Result};
use crate::estimator::Measure;
use crate::io::{self, StagedFile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input: PathBuf,
    pub output: PathBuf,
    pub estimator: String,
    pub measure: Measure,
    pub layout: MatrixLayout,
    pub n_samples: usize,
    pub n_variables: usize,
    /// SHA256 of the loaded table
    pub input_fingerprint: String,
    /// SHA256 of the adjacency matrix (source-rows orientation)
    pub result_fingerprint: String,
    pub causal_order: Vec<usize>,
    pub edges: Vec<Edge>,
    pub bootstrap_samples: Option<usize>,
}

impl RunReport {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Pretty JSON staged next to `path`, not yet visible
    pub fn stage(&self, path: impl AsRef<Path>) -> Result<StagedFile> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LingamError::config(format!("cannot serialize report: {}", e)))?;
        io::stage(path, |file| {
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.stage(path)?.commit()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| LingamError::io(path, e))?;
        serde_json::from_str(&json)
            .map_err(|e| LingamError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn summary(&self) -> String {
        format!(
            "Run {} | {} samples x {} variables | order={:?} | edges={} | {}ms",
            self.run_id.get(..8).unwrap_or(&self.run_id),
            self.n_samples,
            self.n_variables,
            self.causal_order,
            self.edge_count(),
            (self.finished_at - self.started_at).num_milliseconds()
        )
    }
}
