use impl_new_derive::ImplNew;
use ndarray::Array1;

use crate::error::FeconError;
use crate::error::Result;
use crate::series::Series;

/// Default level smoothing, robust for Gaussian, fat-tailed and outlier data (Gelper 2007).
pub const HW_ALPHA: f64 = 0.26;
/// Default growth smoothing (Gelper 2007).
pub const HW_BETA: f64 = 0.19;
/// Default weight for [`ema`].
pub const EMA_ALPHA: f64 = 0.20;

/// Holt-Winters smoothing constants.
///
/// Nominally both lie in `[0, 1]`; the filter does not enforce it.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq)]
pub struct HoltParams {
  /// Weight of the newest observation in the level update.
  pub alpha: f64,
  /// Weight of the newest level change in the growth update.
  pub beta: f64,
}

impl Default for HoltParams {
  fn default() -> Self {
    Self {
      alpha: HW_ALPHA,
      beta: HW_BETA,
    }
  }
}

/// Full state sequence of one filter run: data, smoothed level and local growth.
#[derive(Clone, Debug, PartialEq)]
pub struct HoltWorkout<K = usize> {
  pub keys: Vec<K>,
  pub y: Array1<f64>,
  pub level: Array1<f64>,
  pub growth: Array1<f64>,
}

impl<K> HoltWorkout<K> {
  pub fn len(&self) -> usize {
    self.y.len()
  }

  pub fn is_empty(&self) -> bool {
    self.y.is_empty()
  }

  /// Final `(y, level, growth)` triple.
  pub fn last(&self) -> Option<(f64, f64, f64)> {
    let n = self.len().checked_sub(1)?;
    Some((self.y[n], self.level[n], self.growth[n]))
  }

  /// One-step-ahead prediction errors `y[i+1] - (level[i] + growth[i])`.
  pub fn one_step_errors(&self) -> Array1<f64> {
    let n = self.len();
    if n < 2 {
      return Array1::zeros(0);
    }
    Array1::from_shape_fn(n - 1, |i| self.y[i + 1] - (self.level[i] + self.growth[i]))
  }
}

/// Level and growth recursion over raw observations.
///
/// NaN entries are dropped before the recursion starts. `growth[0]` is fixed
/// at zero rather than `y[1] - y[0]`, so `beta = 0` yields an identically
/// zero growth column.
pub fn holt_winters_growth(y: &[f64], alpha: f64, beta: f64) -> Result<(Array1<f64>, Array1<f64>)> {
  let y: Vec<f64> = y.iter().copied().filter(|v| !v.is_nan()).collect();
  if y.is_empty() {
    return Err(FeconError::EmptySeries);
  }

  let n = y.len();
  let alphac = 1.0 - alpha;
  let betac = 1.0 - beta;

  let mut level = Array1::<f64>::zeros(n);
  let mut growth = Array1::<f64>::zeros(n);
  level[0] = y[0];

  for i in 1..n {
    level[i] = alpha * y[i] + alphac * (level[i - 1] + growth[i - 1]);
    let delta = level[i] - level[i - 1];
    // change in smoothed level, not in raw data
    growth[i] = beta * delta + betac * growth[i - 1];
  }

  Ok((level, growth))
}

/// Run the Holt-Winters filter and keep the whole workout.
pub fn holt<K: Ord + Clone>(series: &Series<K>, alpha: f64, beta: f64) -> Result<HoltWorkout<K>> {
  let (level, growth) = holt_winters_growth(series.values(), alpha, beta)?;

  Ok(HoltWorkout {
    keys: series.keys().to_vec(),
    y: series.to_array(),
    level,
    growth,
  })
}

/// Smoothed level column.
pub fn holt_level<K: Ord + Clone>(series: &Series<K>, alpha: f64, beta: f64) -> Result<Series<K>> {
  let workout = holt(series, alpha, beta)?;
  Ok(series.with_values(workout.level.to_vec()))
}

/// Growth column, in units of the data per period.
pub fn holt_growth<K: Ord + Clone>(series: &Series<K>, alpha: f64, beta: f64) -> Result<Series<K>> {
  let workout = holt(series, alpha, beta)?;
  Ok(series.with_values(workout.growth.to_vec()))
}

/// Annualized percentage growth, `100 * growth * yearly / level`.
///
/// This is the history of forecasted rates.
pub fn holt_pc<K: Ord + Clone>(
  series: &Series<K>,
  yearly: f64,
  alpha: f64,
  beta: f64,
) -> Result<Series<K>> {
  let workout = holt(series, alpha, beta)?;
  let pc = (&workout.growth * yearly / &workout.level) * 100.0;
  Ok(series.with_values(pc.to_vec()))
}

/// Exponential moving average: the Holt-Winters level with `beta = 0`.
pub fn ema<K: Ord + Clone>(series: &Series<K>, alpha: f64) -> Result<Series<K>> {
  holt_level(series, alpha, 0.0)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::series::fixtures::xau;

  #[test]
  fn xau_workout_matches_hand_computation() {
    let w = holt(&xau(), 0.26, 0.19).unwrap();

    let level = [1581.75, 1581.04, 1584.31, 1585.97, 1586.52];
    let growth = [0.00, -0.14, 0.51, 0.73, 0.70];
    for i in 0..5 {
      assert_abs_diff_eq!(w.level[i], level[i], epsilon = 0.01);
      assert_abs_diff_eq!(w.growth[i], growth[i], epsilon = 0.01);
    }

    let (y, l, b) = w.last().unwrap();
    assert_eq!(y, 1393.75);
    assert_abs_diff_eq!(l, 1408.58, epsilon = 0.01);
    assert_abs_diff_eq!(b, -21.69, epsilon = 0.01);
  }

  #[test]
  fn beta_zero_growth_is_exactly_zero() {
    let w = holt(&xau(), 0.20, 0.0).unwrap();
    assert!(w.growth.iter().all(|&b| b == 0.0));
    assert_abs_diff_eq!(w.level[29], 1462.95, epsilon = 0.01);

    let wild = Series::from_values(vec![1.0, -50.0, 1e6, 3.0, f64::NAN, 7.5]);
    for alpha in [0.0, 0.3, 1.0, 1.7] {
      let w = holt(&wild, alpha, 0.0).unwrap();
      assert!(w.growth.iter().all(|&b| b == 0.0));
    }
  }

  #[test]
  fn initial_state_is_fixed() {
    let s = Series::from_values(vec![5.0, 9.0, 2.0]);
    for (alpha, beta) in [(0.0, 0.0), (0.5, 0.5), (1.0, 1.0), (0.26, 0.19)] {
      let w = holt(&s, alpha, beta).unwrap();
      assert_eq!(w.level[0], 5.0);
      assert_eq!(w.growth[0], 0.0);
    }
  }

  #[test]
  fn reruns_are_bit_identical() {
    let xau = xau();
    let a = holt(&xau, 0.37, 0.11).unwrap();
    let b = holt(&xau, 0.37, 0.11).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn empty_input_is_fatal() {
    assert_eq!(
      holt(&Series::from_values(vec![]), 0.26, 0.19),
      Err(FeconError::EmptySeries)
    );
    assert_eq!(
      holt_winters_growth(&[f64::NAN, f64::NAN], 0.26, 0.19),
      Err(FeconError::EmptySeries)
    );
  }

  #[test]
  fn nulls_never_reach_the_recursion() {
    let (l, b) = holt_winters_growth(&[1.0, f64::NAN, 3.0], 0.5, 0.5).unwrap();
    assert_eq!(l.len(), 2);
    assert_eq!(l[1], 2.0);
    assert_eq!(b[1], 0.5);
  }

  #[test]
  fn ema_reads_level_with_beta_zero() {
    let xau = xau();
    let e = ema(&xau, EMA_ALPHA).unwrap();
    assert_eq!(e.keys(), xau.keys());
    assert_abs_diff_eq!(e.values()[1], 1581.20, epsilon = 0.01);
    assert_abs_diff_eq!(e.values()[29], 1462.95, epsilon = 0.01);
  }

  #[test]
  fn holt_pc_annualizes_growth() {
    let xau = xau();
    let w = holt(&xau, HW_ALPHA, HW_BETA).unwrap();
    let pc = holt_pc(&xau, 256.0, HW_ALPHA, HW_BETA).unwrap();
    let growth = holt_growth(&xau, HW_ALPHA, HW_BETA).unwrap();
    assert_eq!(growth.values(), w.growth.as_slice().unwrap());
    assert_abs_diff_eq!(
      pc.values()[29],
      100.0 * 256.0 * w.growth[29] / w.level[29],
      epsilon = 1e-9
    );
  }

  #[test]
  fn one_step_errors_lag_by_one() {
    let w = holt(&Series::from_values(vec![1.0, 2.0, 4.0]), 1.0, 1.0).unwrap();
    // alpha = beta = 1: level tracks y, growth tracks the last change
    assert_eq!(w.one_step_errors().to_vec(), vec![1.0, 1.0]);
  }
}
