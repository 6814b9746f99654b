use nalgebra::DMatrix;
use tracing::warn;

use crate::error::FeconError;
use crate::error::Result;

/// Relative cutoff for small singular values in [`invert_pseudo`].
pub const RCOND: f64 = 1e-15;

/// 2-norm condition number, `sigma_max / sigma_min`.
pub fn condition_number(mat: &DMatrix<f64>) -> f64 {
  let sv = mat.clone().svd(false, false).singular_values;
  if sv.is_empty() || sv.min() == 0.0 {
    return f64::INFINITY;
  }
  sv.max() / sv.min()
}

/// Ill-conditioned for numerical purposes: condition number at least `1 / eps`.
pub fn is_singular(mat: &DMatrix<f64>) -> bool {
  condition_number(mat) >= 1.0 / f64::EPSILON
}

/// Moore-Penrose pseudo-inverse via SVD; the inverse when one exists.
pub fn invert_pseudo(mat: &DMatrix<f64>) -> Result<DMatrix<f64>> {
  let sv = mat.clone().svd(false, false).singular_values;
  let cutoff = if sv.is_empty() { 0.0 } else { RCOND * sv.max() };
  mat
    .clone()
    .pseudo_inverse(cutoff)
    .map_err(|err| FeconError::Singular(err.into()))
}

/// LU inverse, falling back to [`invert_pseudo`] for ill-conditioned input.
pub fn invert(mat: &DMatrix<f64>) -> Result<DMatrix<f64>> {
  if !mat.is_square() {
    return Err(FeconError::InvalidParameter(format!(
      "cannot invert a {}x{} matrix",
      mat.nrows(),
      mat.ncols()
    )));
  }

  if !is_singular(mat) {
    if let Some(inv) = mat.clone().lu().try_inverse() {
      return Ok(inv);
    }
  }

  warn!(n = mat.nrows(), "ill-conditioned matrix, inverse may be pseudo-nonsense");
  invert_pseudo(mat)
}

/// Covariance to Pearson correlation, `D^-1/2 V D^-1/2`.
pub fn cov2cor(cov: &DMatrix<f64>) -> Result<DMatrix<f64>> {
  if !cov.is_square() {
    return Err(FeconError::InvalidParameter("covariance must be square".into()));
  }
  let d = cov.diagonal();
  if d.iter().any(|v| v.is_nan() || *v <= 0.0) {
    return Err(FeconError::InvalidParameter(
      "covariance diagonal must be positive".into(),
    ));
  }
  let scale = d.map(|v| 1.0 / v.sqrt());
  Ok(DMatrix::from_fn(cov.nrows(), cov.ncols(), |i, j| {
    cov[(i, j)] * scale[i] * scale[j]
  }))
}

#[cfg(test)]
pub(crate) mod fixtures {
  use nalgebra::DMatrix;

  /// Daily log-return covariance of SPY, EEM, EZU, GLD, EWJ, 2011-01 .. 2017-06.
  pub(crate) fn world_cov() -> DMatrix<f64> {
    DMatrix::from_row_slice(
      5,
      5,
      &[
        8.48312099e-05,
        1.02917158e-04,
        1.13943470e-04,
        -2.79505009e-06,
        7.46173310e-05,
        1.02917158e-04,
        1.87393335e-04,
        1.63235156e-04,
        1.80039246e-05,
        1.06210719e-04,
        1.13943470e-04,
        1.63235156e-04,
        2.26817214e-04,
        8.18776853e-06,
        1.15561266e-04,
        -2.79505009e-06,
        1.80039246e-05,
        8.18776853e-06,
        1.13760941e-04,
        -2.73835320e-08,
        7.46173310e-05,
        1.06210719e-04,
        1.15561266e-04,
        -2.73835320e-08,
        1.34652717e-04,
      ],
    )
  }
}
