//! ObservationTable — N samples × M variables of finite observations

use crate::error::{LingamError, Result};
use nalgebra::{DMatrix, DVector};
use sha2::{Digest, Sha256};

/// A rectangular table of finite observations (rows = samples, columns = variables)
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationTable {
    data: DMatrix<f64>,
}

impl ObservationTable {
    /// Wrap a matrix, refusing NaN and infinite cells
    pub fn from_matrix(data: DMatrix<f64>) -> Result<Self> {
        for j in 0..data.ncols() {
            for i in 0..data.nrows() {
                if !data[(i, j)].is_finite() {
                    return Err(LingamError::estimation(format!(
                        "non-finite value {} at sample {}, variable {}",
                        data[(i, j)],
                        i,
                        j
                    )));
                }
            }
        }
        Ok(Self { data })
    }

    /// Build a table from row vectors; all rows must share one length
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
            return Err(LingamError::estimation(format!(
                "sample {} has {} values, expected {}",
                i,
                row.len(),
                ncols
            )));
        }
        let data = DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]);
        Self::from_matrix(data)
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_variables(&self) -> usize {
        self.data.ncols()
    }

    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn column(&self, j: usize) -> DVector<f64> {
        self.data.column(j).into_owned()
    }

    /// Build a new table from the given sample indices (repeats allowed)
    pub fn resample(&self, rows: &[usize]) -> Self {
        let data = DMatrix::from_fn(rows.len(), self.data.ncols(), |i, j| self.data[(rows[i], j)]);
        Self { data }
    }

    /// SHA256 over the shape and every cell, column-major
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.data.nrows() as u64).to_le_bytes());
        hasher.update((self.data.ncols() as u64).to_le_bytes());
        for val in self.data.iter() {
            hasher.update(val.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
