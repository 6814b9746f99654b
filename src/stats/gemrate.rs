use tracing::warn;

use super::moments::moments;
use crate::error::FeconError;
use crate::error::Result;
use crate::series::Series;

/// Geometric mean rate corrected for volatility and kurtosis.
///
/// `mu` and `sigma` are rates per `yearly` periods in decimal form;
/// `kurtosis` is Pearson (3 for a Gaussian). The series expansion of
/// `E[log(1 + r)]` breaks down when `1 + mu <= 0`; there the first-order
/// `(mu - sigma^2 / 2) * yearly` is returned instead.
pub fn gem_rate(mu: f64, sigma: f64, kurtosis: f64, yearly: f64) -> f64 {
  let onemu = 1.0 + mu;
  let log_g = onemu.ln()
    - sigma.powi(2) / (2.0 * onemu.powi(2))
    - kurtosis * sigma.powi(4) / (4.0 * onemu.powi(4));
  let rate = log_g.exp().powf(yearly) - 1.0;

  if rate.is_nan() {
    let fallback = (mu - 0.5 * sigma.powi(2)) * yearly;
    warn!(mu, sigma, kurtosis, fallback, "gem rate undefined, using first-order approximation");
    return fallback;
  }
  rate
}

/// Annualized return statistics of a price series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GemRat {
  /// Kurtosis-corrected geometric mean rate.
  pub rate: f64,
  /// Arithmetic mean of log returns, annualized.
  pub mu: f64,
  /// Population sigma of log returns, annualized.
  pub sigma: f64,
  /// Pearson kurtosis of log returns.
  pub kurtosis: f64,
  pub yearly: f64,
  /// Number of returns.
  pub n: usize,
}

/// [`gem_rate`] from the log returns of `prices`, `yearly` periods per year.
pub fn gem_rat<K: Ord + Clone>(prices: &Series<K>, yearly: f64) -> Result<GemRat> {
  if prices.len() < 3 {
    return Err(FeconError::InsufficientData {
      needed: 3,
      got: prices.len(),
    });
  }

  let returns = prices.log_returns();
  let m = moments(returns.values())?;
  let mu = m.mean * yearly;
  let sigma = m.sigma * yearly.sqrt();

  Ok(GemRat {
    rate: gem_rate(mu, sigma, m.kurtosis, 1.0),
    mu,
    sigma,
    kurtosis: m.kurtosis,
    yearly,
    n: m.n,
  })
}
