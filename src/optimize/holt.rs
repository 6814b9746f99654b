use argmin::core::CostFunction;
use statrs::statistics::Data;
use statrs::statistics::Median;
use tracing::info;
use tracing::warn;

use super::optimize;
use crate::error::FeconError;
use crate::error::Result;
use crate::series::Series;
use crate::timeseries::holt::holt_winters_growth;
use crate::timeseries::HoltParams;

/// Leading one-step errors ignored while the filter warms up.
pub const WARMUP: usize = 10;
/// Smallest series the loss accepts.
pub const MIN_POINTS: usize = WARMUP + 2;
/// Grid resolutions above this get a warning: cost grows quadratically.
pub const GRIDS_WARN: usize = 49;

/// Median absolute one-step-ahead error of the Holt-Winters filter.
///
/// The median makes the loss robust to outliers but piecewise flat, which is
/// why the optimizer opens with a grid search.
#[derive(Clone, Debug)]
pub struct HoltLoss {
  y: Vec<f64>,
}

impl HoltLoss {
  pub fn new<K: Ord + Clone>(series: &Series<K>) -> Result<Self> {
    if series.len() < MIN_POINTS {
      return Err(FeconError::InsufficientData {
        needed: MIN_POINTS,
        got: series.len(),
      });
    }
    Ok(Self {
      y: series.values().to_vec(),
    })
  }

  /// Loss at `(alpha, beta)`.
  pub fn loss(&self, alpha: f64, beta: f64) -> Result<f64> {
    let (level, growth) = holt_winters_growth(&self.y, alpha, beta)?;
    let errors: Vec<f64> = (WARMUP..self.y.len() - 1)
      .map(|i| (self.y[i + 1] - (level[i] + growth[i])).abs())
      .collect();
    // diverging constants blow the filter up
    if errors.iter().any(|e| !e.is_finite()) {
      return Ok(f64::INFINITY);
    }
    Ok(Data::new(errors).median())
  }
}

impl CostFunction for HoltLoss {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    match p.as_slice() {
      [alpha, beta] => Ok(self.loss(*alpha, *beta)?),
      _ => Err(argmin::core::Error::msg(format!(
        "holt loss takes (alpha, beta), got {} parameters",
        p.len()
      ))),
    }
  }
}

/// Median absolute one-step-ahead error for fixed smoothing constants.
pub fn holt_loss<K: Ord + Clone>(alpha: f64, beta: f64, series: &Series<K>) -> Result<f64> {
  HoltLoss::new(series)?.loss(alpha, beta)
}

/// Optimal Holt-Winters constants and their loss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoltFit {
  pub alpha: f64,
  pub beta: f64,
  /// Loss relative to the latest observation, in percent.
  pub loss_percent: f64,
  /// Median absolute one-step error, in units of the data.
  pub loss: f64,
}

impl HoltFit {
  pub fn params(&self) -> HoltParams {
    HoltParams::new(self.alpha, self.beta)
  }

  /// Robust standard deviation estimate, `1.48 * loss`.
  pub fn sigma(&self) -> f64 {
    1.48 * self.loss
  }

  /// Half-width of a rough forecast band, `3 * loss`.
  pub fn band(&self) -> f64 {
    3.0 * self.loss
  }
}

/// Fit `(alpha, beta)` by minimizing [`holt_loss`].
///
/// `alphas` and `betas` are `(min, max)` pairs that only bound the initial
/// grid; the returned constants may fall outside `[0, 1]`.
pub fn optimize_holt<K: Ord + Clone>(
  series: &Series<K>,
  grids: usize,
  alphas: (f64, f64),
  betas: (f64, f64),
) -> Result<HoltFit> {
  if grids > GRIDS_WARN {
    warn!(grids, "holt optimization may take time with a fine grid");
  }

  let cost = HoltLoss::new(series)?;
  let res = optimize(&cost, &[alphas, betas], grids)?;
  let (alpha, beta) = (res.params[0], res.params[1]);

  let last = series.tail_value().ok_or(FeconError::EmptySeries)?;
  let loss_percent = 100.0 * res.loss / last.abs();
  info!(alpha, beta, loss = res.loss, loss_percent, "holt fit");

  Ok(HoltFit {
    alpha,
    beta,
    loss_percent,
    loss: res.loss,
  })
}
