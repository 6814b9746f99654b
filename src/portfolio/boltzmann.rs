use nalgebra::DMatrix;
use nalgebra::DVector;
use tracing::debug;

use super::matrix::invert_pseudo;
use super::softmax::softmax;
use crate::error::FeconError;
use crate::error::Result;
use crate::series::Series;
use crate::stats::gemrate::gem_rat;

/// Settings for [`boltz_portfolio`].
#[derive(Debug, Clone, Copy)]
pub struct BoltzConfig {
  /// Observations per year in the price series.
  pub yearly: f64,
  /// Softmax temperature, see [`super::softmax()`].
  pub temp: f64,
  /// Weights below this are replaced by `level`.
  pub floor: f64,
  pub level: f64,
}

impl Default for BoltzConfig {
  fn default() -> Self {
    Self {
      yearly: 256.0,
      temp: 55.0,
      floor: 0.01,
      level: 0.0,
    }
  }
}

/// One line of a [`BoltzPortfolio`].
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
  pub name: String,
  pub weight: f64,
  /// Geometric mean rate of the asset.
  pub rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltzPortfolio {
  /// Weighted geometric mean rate, `sum(weight * rate)`.
  pub rate: f64,
  pub holdings: Vec<Holding>,
}

/// Global minimum variance weights `V^-1 1 / (1' V^-1 1)`.
///
/// Uses the pseudo-inverse so an ill-conditioned covariance still yields
/// weights. Short positions show up as negative weights.
pub fn weigh_cov(cov: &DMatrix<f64>) -> Result<DVector<f64>> {
  let viv = invert_pseudo(cov)?;
  let one = DVector::from_element(cov.nrows(), 1.0);
  let top = &viv * &one;
  let bot = one.dot(&top);
  if bot == 0.0 || !bot.is_finite() {
    return Err(FeconError::Singular(
      "global minimum variance normalizer is degenerate".into(),
    ));
  }
  Ok(top / bot)
}

/// Keep weights `>= floor`, replace the rest with `level`.
pub fn trim_it(weights: &[f64], floor: f64, level: f64) -> Vec<f64> {
  weights
    .iter()
    .map(|&w| if w >= floor { w } else { level })
    .collect()
}

/// Scale weights proportionally so they sum to one.
pub fn renormalize(weights: &[f64]) -> Result<Vec<f64>> {
  let sum: f64 = weights.iter().sum();
  if sum == 0.0 || !sum.is_finite() {
    return Err(FeconError::InvalidParameter(format!(
      "cannot renormalize weights summing to {sum}"
    )));
  }
  Ok(weights.iter().map(|w| w / sum).collect())
}

/// [`trim_it`] followed by [`renormalize`].
pub fn ren_trim(weights: &[f64], floor: f64, level: f64) -> Result<Vec<f64>> {
  renormalize(&trim_it(weights, floor, level))
}

/// Softmax allocation over the geometric mean rates of named price series.
///
/// Each asset's rate comes from [`gem_rat`]; the softmax probabilities at
/// `config.temp` become weights, which are trimmed and renormalized.
pub fn boltz_portfolio<K: Ord + Clone>(
  assets: &[(&str, &Series<K>)],
  config: &BoltzConfig,
) -> Result<BoltzPortfolio> {
  let rates = assets
    .iter()
    .map(|(_, prices)| gem_rat(prices, config.yearly).map(|g| g.rate))
    .collect::<Result<Vec<f64>>>()?;

  let probs = softmax(&rates, config.temp)?.probs;
  let weights = ren_trim(&probs, config.floor, config.level)?;
  debug!(?rates, ?weights, "boltzmann weights");

  let holdings: Vec<Holding> = assets
    .iter()
    .zip(weights.iter().zip(&rates))
    .map(|((name, _), (&weight, &rate))| Holding {
      name: name.to_string(),
      weight,
      rate,
    })
    .collect();
  let rate = holdings.iter().map(|h| h.weight * h.rate).sum();

  Ok(BoltzPortfolio { rate, holdings })
}
