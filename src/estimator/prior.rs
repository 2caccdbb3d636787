//! Prior knowledge — known or forbidden directed paths between variables
//!
//! Matrix encoding (row = source, column = target):
//!   -1 → nothing known, 0 → no directed path i → j, 1 → directed path i → j.
//! The diagonal is ignored.

use crate::data::AdjacencyMatrix;
use crate::error::{LingamError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Knowledge {
    Unknown,
    Forbidden,
    Required,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorKnowledge {
    n: usize,
    entries: Vec<Knowledge>,
}

impl PriorKnowledge {
    /// Nothing known about any pair
    pub fn unknown(n_variables: usize) -> Self {
        Self {
            n: n_variables,
            entries: vec![Knowledge::Unknown; n_variables * n_variables],
        }
    }

    /// Parse a -1/0/1 matrix
    pub fn from_matrix(m: &DMatrix<f64>) -> Result<Self> {
        if !m.is_square() {
            return Err(LingamError::config(format!(
                "prior knowledge must be square, got {}x{}",
                m.nrows(),
                m.ncols()
            )));
        }
        let mut pk = Self::unknown(m.nrows());
        for i in 0..m.nrows() {
            for j in 0..m.ncols() {
                let k = match m[(i, j)] {
                    v if v == -1.0 => Knowledge::Unknown,
                    v if v == 0.0 => Knowledge::Forbidden,
                    v if v == 1.0 => Knowledge::Required,
                    v => {
                        return Err(LingamError::config(format!(
                            "prior knowledge entry ({}, {}) is {}, expected -1, 0 or 1",
                            i, j, v
                        )))
                    }
                };
                pk.set(i, j, k);
            }
        }
        Ok(pk)
    }

    pub fn n_variables(&self) -> usize {
        self.n
    }

    pub fn get(&self, from: usize, to: usize) -> Knowledge {
        if from == to {
            return Knowledge::Unknown;
        }
        self.entries[from * self.n + to]
    }

    fn set(&mut self, from: usize, to: usize, k: Knowledge) {
        self.entries[from * self.n + to] = k;
    }

    pub fn require_path(mut self, from: usize, to: usize) -> Self {
        self.set(from, to, Knowledge::Required);
        self
    }

    pub fn forbid_path(mut self, from: usize, to: usize) -> Self {
        self.set(from, to, Knowledge::Forbidden);
        self
    }

    /// Nothing causes `v`
    pub fn exogenous(mut self, v: usize) -> Self {
        for from in (0..self.n).filter(|&f| f != v) {
            self.set(from, v, Knowledge::Forbidden);
        }
        self
    }

    /// `v` causes nothing
    pub fn sink(mut self, v: usize) -> Self {
        for to in (0..self.n).filter(|&t| t != v) {
            self.set(v, to, Knowledge::Forbidden);
        }
        self
    }

    /// Whether a direct edge `from → to` may appear in the result
    pub fn allows_edge(&self, from: usize, to: usize) -> bool {
        self.get(from, to) != Knowledge::Forbidden
    }

    /// Pairs `(before, after)` every causal order must respect.
    ///
    /// A required path i → j orders i before j. A forbidden path i → j orders
    /// j before i, unless j → i is forbidden too, in which case the pair is
    /// left unordered.
    pub fn partial_orders(&self) -> Result<Vec<(usize, usize)>> {
        let mut orders = Vec::new();
        for i in 0..self.n {
            for j in 0..self.n {
                if i == j {
                    continue;
                }
                match self.get(i, j) {
                    Knowledge::Required => {
                        if self.get(j, i) == Knowledge::Required {
                            return Err(LingamError::config(format!(
                                "prior knowledge requires paths both ways between {} and {}",
                                i, j
                            )));
                        }
                        orders.push((i, j));
                    }
                    Knowledge::Forbidden => {
                        if self.get(j, i) != Knowledge::Forbidden {
                            orders.push((j, i));
                        }
                    }
                    Knowledge::Unknown => {}
                }
            }
        }
        orders.sort_unstable();
        orders.dedup();

        let mut precedence = AdjacencyMatrix::zeros(self.n);
        for &(before, after) in &orders {
            precedence.set_weight(before, after, 1.0);
        }
        if !precedence.is_acyclic() {
            return Err(LingamError::config("prior knowledge orders the variables in a cycle"));
        }
        Ok(orders)
    }
}
