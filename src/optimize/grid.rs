use argmin::core::CostFunction;
use rayon::prelude::*;

use super::evaluate;
use crate::error::FeconError;
use crate::error::Result;

/// `n` evenly spaced points from `lo` to `hi`, both endpoints included.
fn axis(lo: f64, hi: f64, n: usize) -> Vec<f64> {
  let step = (hi - lo) / (n - 1) as f64;
  (0..n)
    .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
    .collect()
}

/// Exhaustive search over a regular grid.
///
/// Each dimension gets `grids` points spanning its `(min, max)` pair,
/// endpoints included. Points are evaluated in parallel; among equal losses
/// the first point in row-major order (last dimension varying fastest)
/// wins, so the result is independent of thread scheduling.
pub fn min_brute<C>(cost: &C, bounds: &[(f64, f64)], grids: usize) -> Result<Vec<f64>>
where
  C: CostFunction<Param = Vec<f64>, Output = f64> + Sync,
{
  if bounds.is_empty() {
    return Err(FeconError::InvalidParameter(
      "grid search needs at least one dimension".into(),
    ));
  }
  if grids < 2 {
    return Err(FeconError::InvalidParameter(format!(
      "grid resolution must be at least 2, got {grids}"
    )));
  }
  if let Some((lo, hi)) = bounds
    .iter()
    .find(|(lo, hi)| !lo.is_finite() || !hi.is_finite() || lo > hi)
  {
    return Err(FeconError::InvalidParameter(format!(
      "invalid grid bounds ({lo}, {hi})"
    )));
  }

  let total = u32::try_from(bounds.len())
    .ok()
    .and_then(|d| grids.checked_pow(d))
    .ok_or_else(|| FeconError::InvalidParameter("grid too large".into()))?;

  let axes: Vec<Vec<f64>> = bounds.iter().map(|&(lo, hi)| axis(lo, hi, grids)).collect();
  let point = |mut flat: usize| -> Vec<f64> {
    let mut x = vec![0.0; axes.len()];
    for (d, ax) in axes.iter().enumerate().rev() {
      x[d] = ax[flat % grids];
      flat /= grids;
    }
    x
  };

  let (best, _) = (0..total)
    .into_par_iter()
    .map(|flat| (flat, evaluate(cost, &point(flat))))
    .reduce(
      || (usize::MAX, f64::INFINITY),
      |a, b| {
        if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) {
          b
        } else {
          a
        }
      },
    );

  // every point lost (all +inf): fall back to the first grid point
  Ok(point(if best == usize::MAX { 0 } else { best }))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::optimize::testing::LineFit;
  use crate::optimize::FnCost;

  #[test]
  fn axis_pins_both_endpoints() {
    let a = axis(0.0, 1.0, 11);
    assert_eq!(a.len(), 11);
    assert_eq!(a[0], 0.0);
    assert_eq!(a[10], 1.0);
    assert_abs_diff_eq!(a[3], 0.3, epsilon = 1e-15);
  }

  #[test]
  fn optimum_outside_box_lands_on_boundary() {
    let x = min_brute(&LineFit::squared(), &[(10.0, 50.0), (10.0, 30.0)], 20).unwrap();
    assert_eq!(x, vec![50.0, 30.0]);
  }

  #[test]
  fn rosenbrock_on_coarse_box() {
    let rosenbrock = FnCost::new(|z: &[f64]| 0.5 * (1.0 - z[0]).powi(2) + (z[1] - z[0].powi(2)).powi(2));
    let x = min_brute(&rosenbrock, &[(-3.0, 3.0), (-3.0, 3.0)], 25).unwrap();
    assert_eq!(x, vec![1.0, 1.0]);
  }

  #[test]
  fn ties_resolve_to_first_in_row_major_order() {
    let flat = FnCost::new(|z: &[f64]| if z[1] >= 0.5 { 0.0 } else { 1.0 });
    let x = min_brute(&flat, &[(0.0, 1.0), (0.0, 1.0)], 3).unwrap();
    assert_eq!(x, vec![0.0, 0.5]);

    let constant = FnCost::new(|_: &[f64]| 7.0);
    let x = min_brute(&constant, &[(2.0, 4.0), (-1.0, 1.0), (5.0, 6.0)], 4).unwrap();
    assert_eq!(x, vec![2.0, -1.0, 5.0]);
  }

  #[test]
  fn degenerate_dimension_is_allowed() {
    let cost = FnCost::new(|z: &[f64]| (z[0] - 0.4).abs() + z[1]);
    let x = min_brute(&cost, &[(0.0, 1.0), (3.0, 3.0)], 6).unwrap();
    assert_eq!(x[1], 3.0);
    assert_abs_diff_eq!(x[0], 0.4, epsilon = 1e-12);
  }

  #[test]
  fn all_nan_losses_fall_back_to_first_point() {
    let cost = FnCost::new(|_: &[f64]| f64::NAN);
    let x = min_brute(&cost, &[(1.0, 2.0)], 5).unwrap();
    assert_eq!(x, vec![1.0]);
  }
}
