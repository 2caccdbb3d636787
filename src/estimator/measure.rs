//! Independence measures used to pick the most exogenous variable
//!
//! - `Pwling`: pairwise likelihood ratio built from a maximum-entropy
//!   approximation of differential entropy
//! - `Kernel`: kernel mutual information between a candidate and the
//!   residuals of the other variables

use super::stats::{residual, std_dev, VARIANCE_EPS};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const K1: f64 = 79.047;
const K2: f64 = 7.4129;
const GAMMA: f64 = 0.37457;

/// Above this many samples the kernel measure switches to a narrower kernel
const KERNEL_LARGE_SAMPLE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Measure {
    #[default]
    #[serde(alias = "pwling_fast", alias = "pwling-fast")]
    Pwling,
    Kernel,
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pwling" | "pwling_fast" | "pwling-fast" => Ok(Measure::Pwling),
            "kernel" => Ok(Measure::Kernel),
            other => Err(format!("unknown measure '{}' (expected pwling or kernel)", other)),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Pwling => write!(f, "pwling"),
            Measure::Kernel => write!(f, "kernel"),
        }
    }
}

/// Maximum-entropy approximation of the differential entropy of a unit-variance sample
pub(crate) fn entropy(u: &DVector<f64>) -> f64 {
    let n = u.len() as f64;
    let log_cosh = u.iter().map(|&x| log_cosh(x)).sum::<f64>() / n;
    let gauss = u.iter().map(|&x| x * (-x * x / 2.0).exp()).sum::<f64>() / n;
    (1.0 + (2.0 * std::f64::consts::PI).ln()) / 2.0
        - K1 * (log_cosh - GAMMA).powi(2)
        - K2 * gauss.powi(2)
}

fn log_cosh(x: f64) -> f64 {
    let a = x.abs();
    a + (-2.0 * a).exp().ln_1p() - std::f64::consts::LN_2
}

/// Difference of mutual information between the two regression directions.
/// Negative values favour `xi → xj`. A pair with a zero-variance residual
/// (collinear or constant) carries no evidence either way and scores 0.
pub(crate) fn diff_mutual_info(
    xi_std: &DVector<f64>,
    xj_std: &DVector<f64>,
    ri_j: &DVector<f64>,
    rj_i: &DVector<f64>,
) -> f64 {
    let si = std_dev(ri_j);
    let sj = std_dev(rj_i);
    if si * si < VARIANCE_EPS || sj * sj < VARIANCE_EPS {
        return 0.0;
    }
    (entropy(xj_std) + entropy(&(ri_j / si))) - (entropy(xi_std) + entropy(&(rj_i / sj)))
}

/// Kernel bandwidth parameters (kappa, sigma) for a sample size
pub(crate) fn kernel_params(n_samples: usize) -> (f64, f64) {
    if n_samples > KERNEL_LARGE_SAMPLE {
        (2e-3, 0.5)
    } else {
        (2e-2, 1.0)
    }
}

/// Kernel generalized-variance estimate of the mutual information between two samples
pub(crate) fn kernel_mutual_information(x1: &DVector<f64>, x2: &DVector<f64>, kappa: f64, sigma: f64) -> f64 {
    let n = x1.len();
    let k1 = gram(x1, sigma);
    let k2 = gram(x2, sigma);
    let ridge = n as f64 * kappa / 2.0;
    let tmp1 = &k1 + DMatrix::identity(n, n) * ridge;
    let tmp2 = &k2 + DMatrix::identity(n, n) * ridge;
    let a = &tmp1 * &tmp1;
    let b = &tmp2 * &tmp2;

    let mut k_kappa = DMatrix::zeros(2 * n, 2 * n);
    k_kappa.view_mut((0, 0), (n, n)).copy_from(&a);
    k_kappa.view_mut((0, n), (n, n)).copy_from(&(&k1 * &k2));
    k_kappa.view_mut((n, 0), (n, n)).copy_from(&(&k2 * &k1));
    k_kappa.view_mut((n, n), (n, n)).copy_from(&b);

    // D_kappa is block diagonal, so its spectrum is the union of both blocks
    let log_sv = |m: DMatrix<f64>| m.singular_values().iter().map(|s| s.ln()).sum::<f64>();
    let log_k = log_sv(k_kappa);
    let log_d = log_sv(a) + log_sv(b);
    -0.5 * (log_k - log_d)
}

fn gram(x: &DVector<f64>, sigma: f64) -> DMatrix<f64> {
    let n = x.len();
    let scale = -1.0 / (2.0 * sigma * sigma);
    DMatrix::from_fn(n, n, |i, j| {
        let d = x[i] - x[j];
        (scale * d * d).exp()
    })
}

/// Pwling score of candidate `i` against every other remaining variable
pub(crate) fn pwling_score(columns: &[DVector<f64>], i: usize, remaining: &[usize]) -> f64 {
    let mut m = 0.0;
    for &j in remaining {
        if j == i {
            continue;
        }
        let xi_std = &columns[i];
        let xj_std = &columns[j];
        let ri_j = residual(xi_std, xj_std);
        let rj_i = residual(xj_std, xi_std);
        let d = diff_mutual_info(xi_std, xj_std, &ri_j, &rj_i);
        m += d.min(0.0).powi(2);
    }
    -m
}

/// Total kernel mutual information between candidate `j` and the residuals of the others
pub(crate) fn kernel_score(columns: &[DVector<f64>], j: usize, remaining: &[usize]) -> f64 {
    let (kappa, sigma) = kernel_params(columns[j].len());
    remaining
        .iter()
        .filter(|&&i| i != j)
        .map(|&i| {
            let ri_j = residual(&columns[i], &columns[j]);
            kernel_mutual_information(&columns[j], &ri_j, kappa, sigma)
        })
        .sum()
}
