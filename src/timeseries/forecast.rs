use ndarray::Array1;

use super::holt::holt;
use super::holt::HoltParams;
use super::holt::HoltWorkout;
use crate::error::FeconError;
use crate::error::Result;
use crate::series::Series;

/// Project `h` periods ahead from the final filter state.
///
/// Index 0 is the last actual observation, not a prediction. For `k >= 1`,
/// `forecast[k] = level[N-1] + growth[N-1] * k`: growth is frozen at its
/// last estimate (no damping, no re-estimation).
pub fn holt_forecast<K>(workout: &HoltWorkout<K>, h: usize) -> Result<Array1<f64>> {
  let (y, level, growth) = workout.last().ok_or(FeconError::EmptySeries)?;

  let mut out = Array1::<f64>::zeros(h + 1);
  out[0] = y;
  for k in 1..=h {
    out[k] = level + growth * k as f64;
  }

  Ok(out)
}

/// Filter `series` with `params` and forecast `h` periods ahead.
pub fn forecast<K: Ord + Clone>(series: &Series<K>, h: usize, params: HoltParams) -> Result<Array1<f64>> {
  let workout = holt(series, params.alpha, params.beta)?;
  holt_forecast(&workout, h)
}
