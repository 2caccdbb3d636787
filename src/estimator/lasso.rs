//! Adaptive lasso pruning of the regression on earlier variables
//!
//! For one target: OLS on standardized data gives weights |β|^γ, a lasso path
//! on the reweighted design is scored by BIC, and the surviving predictors
//! are refit by OLS on the raw data.

use super::stats::{ols, select_columns};
use crate::error::{LingamError, Result};
use log::trace;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Tuning for the adaptive lasso step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveLasso {
    /// Exponent applied to the OLS coefficients to form penalty weights
    pub gamma: f64,
    /// Number of penalties on the log-spaced path
    pub n_lambdas: usize,
    /// Smallest penalty as a fraction of the largest
    pub lambda_ratio: f64,
    /// Coordinate descent sweeps allowed per penalty
    pub max_iter: usize,
    /// Convergence threshold on the largest coefficient update
    pub tol: f64,
}

impl Default for AdaptiveLasso {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            n_lambdas: 100,
            lambda_ratio: 1e-4,
            max_iter: 10_000,
            tol: 1e-8,
        }
    }
}

impl AdaptiveLasso {
    /// Coefficients of `predictors` on `target` (zero for pruned predictors).
    /// `raw` is the untouched data, `standardized` its column-standardized copy.
    pub fn fit(
        &self,
        raw: &DMatrix<f64>,
        standardized: &DMatrix<f64>,
        predictors: &[usize],
        target: usize,
    ) -> Result<DVector<f64>> {
        let xs = select_columns(standardized, predictors);
        let ys = standardized.column(target).into_owned();

        let weights = ols(&xs, &ys)?.map(|b| b.abs().powf(self.gamma));
        let mut xw = xs;
        for (k, w) in weights.iter().enumerate() {
            xw.column_mut(k).scale_mut(*w);
        }

        let coef = self.lasso_bic(&xw, &ys)?;
        let selected: Vec<usize> = (0..predictors.len())
            .filter(|&k| (coef[k] * weights[k]).abs() > 0.0)
            .collect();

        let mut out = DVector::zeros(predictors.len());
        if selected.is_empty() {
            return Ok(out);
        }
        let chosen: Vec<usize> = selected.iter().map(|&k| predictors[k]).collect();
        let refit = ols(&select_columns(raw, &chosen), &raw.column(target).into_owned())?;
        for (slot, &k) in selected.iter().enumerate() {
            out[k] = refit[slot];
        }
        trace!("target {}: kept {:?} of {:?}", target, chosen, predictors);
        Ok(out)
    }

    /// Lasso path by cyclic coordinate descent with warm starts; returns the
    /// coefficients minimising BIC = n·ln(RSS/n) + ln(n)·df.
    fn lasso_bic(&self, x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
        let n = x.nrows();
        let p = x.ncols();
        let nf = n as f64;

        let col_sq: Vec<f64> = (0..p).map(|j| x.column(j).norm_squared() / nf).collect();
        let lambda_max = (0..p)
            .map(|j| x.column(j).dot(y).abs() / nf)
            .fold(0.0, f64::max);

        let mut best = DVector::zeros(p);
        let mut best_bic = bic(y.norm_squared(), nf, 0);
        if lambda_max <= 0.0 {
            return Ok(best);
        }

        let mut w: DVector<f64> = DVector::zeros(p);
        let mut r = y.clone();
        let steps = self.n_lambdas.max(2);

        for step in 0..steps {
            let lambda = lambda_max * self.lambda_ratio.powf(step as f64 / (steps - 1) as f64);

            let mut converged = false;
            for _ in 0..self.max_iter {
                let mut max_delta: f64 = 0.0;
                for j in 0..p {
                    if col_sq[j] == 0.0 {
                        continue;
                    }
                    let rho = x.column(j).dot(&r) / nf + col_sq[j] * w[j];
                    let updated = soft_threshold(rho, lambda) / col_sq[j];
                    let delta = updated - w[j];
                    if delta != 0.0 {
                        r.axpy(-delta, &x.column(j), 1.0);
                        w[j] = updated;
                        max_delta = max_delta.max(delta.abs());
                    }
                }
                if max_delta < self.tol {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(LingamError::estimation(format!(
                    "lasso coordinate descent did not converge in {} iterations (lambda={:.3e})",
                    self.max_iter, lambda
                )));
            }

            let df = w.iter().filter(|c| **c != 0.0).count();
            let score = bic(r.norm_squared(), nf, df);
            if score < best_bic {
                best_bic = score;
                best.copy_from(&w);
            }
        }

        Ok(best)
    }
}

fn soft_threshold(value: f64, lambda: f64) -> f64 {
    if value > lambda {
        value - lambda
    } else if value < -lambda {
        value + lambda
    } else {
        0.0
    }
}

fn bic(rss: f64, n: f64, df: usize) -> f64 {
    n * (rss / n).max(f64::MIN_POSITIVE).ln() + n.ln() * df as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::stats::standardize_columns;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_soft_threshold() {
        assert_eq!(soft_threshold(2.0, 0.5), 1.5);
        assert_eq!(soft_threshold(-2.0, 0.5), -1.5);
        assert_eq!(soft_threshold(0.3, 0.5), 0.0);
    }

    #[test]
    fn test_prunes_irrelevant_predictor() {
        let mut rng = StdRng::seed_from_u64(21);
        let n = 500;
        // columns: a, noise, target = 2a + e
        let mut data = DMatrix::zeros(n, 3);
        for i in 0..n {
            let a: f64 = rng.gen_range(-1.0..1.0);
            let z: f64 = rng.gen_range(-1.0..1.0);
            let e: f64 = rng.gen_range(-0.5..0.5);
            data[(i, 0)] = a;
            data[(i, 1)] = z;
            data[(i, 2)] = 2.0 * a + e;
        }
        let std = standardize_columns(&data);
        let coef = AdaptiveLasso::default().fit(&data, &std, &[0, 1], 2).unwrap();
        assert!((coef[0] - 2.0).abs() < 0.1, "coef {}", coef[0]);
        assert_eq!(coef[1], 0.0);
    }

    #[test]
    fn test_all_pruned_without_signal() {
        let mut rng = StdRng::seed_from_u64(4);
        let data = DMatrix::from_fn(2000, 2, |_, _| rng.gen_range(-1.0..1.0));
        let std = standardize_columns(&data);
        let coef = AdaptiveLasso::default().fit(&data, &std, &[0], 1).unwrap();
        assert_eq!(coef[0], 0.0);
    }

    #[test]
    fn test_non_convergence_is_an_error() {
        let mut rng = StdRng::seed_from_u64(8);
        let data = DMatrix::from_fn(100, 3, |i, j| i as f64 * (j as f64 + 1.0) + rng.gen_range(-0.1..0.1));
        let std = standardize_columns(&data);
        let lasso = AdaptiveLasso { max_iter: 1, tol: 0.0, ..AdaptiveLasso::default() };
        assert!(lasso.fit(&data, &std, &[0, 1], 2).is_err());
    }
}
