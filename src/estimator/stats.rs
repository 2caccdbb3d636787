//! Small column statistics shared by the order search and the regressions

use crate::error::{LingamError, Result};
use nalgebra::{DMatrix, DVector};

/// Variances below this are treated as zero
pub(crate) const VARIANCE_EPS: f64 = 1e-12;

pub(crate) fn mean(x: &DVector<f64>) -> f64 {
    x.sum() / x.len() as f64
}

/// Population standard deviation (divides by n)
pub(crate) fn std_dev(x: &DVector<f64>) -> f64 {
    let m = mean(x);
    (x.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / x.len() as f64).sqrt()
}

/// Zero mean, unit population variance. A constant column becomes all zeros.
pub(crate) fn standardize(x: &DVector<f64>) -> DVector<f64> {
    let m = mean(x);
    let s = std_dev(x);
    if s * s < VARIANCE_EPS {
        return DVector::zeros(x.len());
    }
    x.map(|v| (v - m) / s)
}

/// Standardize every column of a matrix
pub(crate) fn standardize_columns(x: &DMatrix<f64>) -> DMatrix<f64> {
    let mut out = x.clone();
    for j in 0..x.ncols() {
        out.set_column(j, &standardize(&x.column(j).into_owned()));
    }
    out
}

/// Residual of `xi` after least-squares regression on `xj`
pub(crate) fn residual(xi: &DVector<f64>, xj: &DVector<f64>) -> DVector<f64> {
    let mi = mean(xi);
    let mj = mean(xj);
    let mut cov = 0.0;
    let mut var = 0.0;
    for (a, b) in xi.iter().zip(xj.iter()) {
        cov += (a - mi) * (b - mj);
        var += (b - mj) * (b - mj);
    }
    if var < VARIANCE_EPS {
        return xi.clone();
    }
    xi - xj * (cov / var)
}

/// Ordinary least squares with intercept; returns the slope coefficients
pub(crate) fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    let n = x.nrows();
    if n == 0 || x.ncols() == 0 {
        return Ok(DVector::zeros(x.ncols()));
    }
    let mut xc = x.clone();
    for j in 0..xc.ncols() {
        let m = xc.column(j).sum() / n as f64;
        xc.column_mut(j).add_scalar_mut(-m);
    }
    let yc = y.add_scalar(-mean(y));

    xc.svd(true, true)
        .solve(&yc, 1e-12)
        .map_err(|e| LingamError::estimation(format!("least squares failed: {}", e)))
}

/// Columns of `x` selected by index, in the given order
pub(crate) fn select_columns(x: &DMatrix<f64>, columns: &[usize]) -> DMatrix<f64> {
    DMatrix::from_fn(x.nrows(), columns.len(), |i, k| x[(i, columns[k])])
}
