use roots::find_root_brent;
use roots::SimpleConvergency;
use tracing::warn;

use super::gemrate::gem_rat;
use super::gemrate::GemRat;
use crate::error::FeconError;
use crate::error::Result;
use crate::series::Series;

/// Increment applied to `b` after an infeasible solve.
pub const B_STEP: f64 = 0.5;
/// Extra attempts made by [`gm2_gem_rate`].
pub const RETRIES: usize = 2;

/// Structured zero-mean GM(2): `N(0, (a sigma)^2)` with weight `p`,
/// `N(0, (b sigma)^2)` with weight `q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gm2Spec {
  pub a: f64,
  pub b: f64,
  pub p: f64,
  pub q: f64,
  /// Calm component sigma, `a * sigma`.
  pub sigma1: f64,
  /// Turbulent component sigma, `b * sigma`.
  pub sigma2: f64,
}

/// Solve for `a` given Pearson `kurtosis` and `b`, returning `(a, p)`.
///
/// Matching second and fourth moments requires
/// `(K/3 - b^4) / (a^4 - b^4) = (1 - b^2) / (a^2 - b^2)`. After
/// cross-multiplying, the residual changes sign on `(0, 1)` exactly when
/// `3 < K < 3 b^2`, and the root there is unique.
pub fn gm2_solve(kurtosis: f64, b: f64) -> Result<(f64, f64)> {
  if b.is_nan() || b <= 1.0 {
    return Err(FeconError::Infeasible(format!("b must exceed 1, got {b}")));
  }
  if kurtosis.is_nan() || kurtosis <= 3.0 {
    return Err(FeconError::Infeasible(format!(
      "kurtosis must exceed 3, got {kurtosis}"
    )));
  }

  let k = kurtosis / 3.0;
  let b2 = b * b;
  let b4 = b2 * b2;
  if k >= b2 {
    return Err(FeconError::Infeasible(format!(
      "kurtosis {kurtosis} too extreme for b = {b}, increase b"
    )));
  }

  let residual = |a: f64| {
    let a2 = a * a;
    (k - b4) * (a2 - b2) - (1.0 - b2) * (a2 * a2 - b4)
  };
  let mut convergency = SimpleConvergency {
    eps: 1e-12,
    max_iter: 100,
  };
  let a = find_root_brent(0.0, 1.0, residual, &mut convergency)
    .map_err(|err| FeconError::Infeasible(format!("no root for a in (0, 1): {err}")))?;

  let p = (1.0 - b2) / (a * a - b2);
  Ok((a, p))
}

/// Full GM(2) specification for observed `sigma` and `kurtosis`.
pub fn gm2_main(kurtosis: f64, sigma: f64, b: f64) -> Result<Gm2Spec> {
  let (a, p) = gm2_solve(kurtosis, b)?;
  Ok(Gm2Spec {
    a,
    b,
    p,
    q: 1.0 - p,
    sigma1: a * sigma,
    sigma2: b * sigma,
  })
}

/// [`gm2_main`], raising `b` by [`B_STEP`] after each infeasible attempt.
///
/// Makes at most `retries` extra attempts, then returns the last error.
pub fn gm2_main_with_retry(kurtosis: f64, sigma: f64, b: f64, retries: usize) -> Result<Gm2Spec> {
  let mut b = b;
  let mut attempt = 0;
  loop {
    match gm2_main(kurtosis, sigma, b) {
      Err(FeconError::Infeasible(reason)) if attempt < retries => {
        attempt += 1;
        warn!(kurtosis, b, %reason, "gm2 infeasible, retrying with larger b");
        b += B_STEP;
      }
      res => return res,
    }
  }
}

/// GM(2) fit to the annualized log-return statistics of `prices`.
pub fn gm2_vols<K: Ord + Clone>(prices: &Series<K>, b: f64, yearly: f64) -> Result<Gm2Spec> {
  let g = gem_rat(prices, yearly)?;
  gm2_main(g.kurtosis, g.sigma, b)
}

/// Geometric mean rate with its GM(2) decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gm2GemRat {
  pub gem: GemRat,
  pub mix: Gm2Spec,
}

/// [`gem_rat`] plus a GM(2) fit, retrying infeasible fits with a larger `b`.
pub fn gm2_gem_rate<K: Ord + Clone>(prices: &Series<K>, yearly: f64, b: f64) -> Result<Gm2GemRat> {
  let gem = gem_rat(prices, yearly)?;
  let mix = gm2_main_with_retry(gem.kurtosis, gem.sigma, b, RETRIES)?;
  Ok(Gm2GemRat { gem, mix })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;
  use crate::series::fixtures::date;
  use crate::series::fixtures::xau;

  #[test]
  fn kurtosis_seven_b_two() {
    let (a, p) = gm2_solve(7.0, 2.0).unwrap();
    assert_abs_diff_eq!(a, 0.7454, epsilon = 1e-4);
    assert!(p > 0.0 && p < 1.0);
  }

  #[test]
  fn moments_are_reproduced() {
    let (kurtosis, sigma) = (5.5, 0.2);
    let s = gm2_main(kurtosis, sigma, 2.0).unwrap();
    let var = s.p * s.sigma1.powi(2) + s.q * s.sigma2.powi(2);
    let m4 = 3.0 * (s.p * s.sigma1.powi(4) + s.q * s.sigma2.powi(4));
    assert_abs_diff_eq!(var, sigma * sigma, epsilon = 1e-10);
    assert_abs_diff_eq!(m4 / (var * var), kurtosis, epsilon = 1e-8);
    assert!(s.a > 0.0 && s.a < 1.0);
  }

  #[test]
  fn extreme_kurtosis_is_infeasible() {
    assert!(matches!(gm2_solve(13.0, 2.0), Err(FeconError::Infeasible(_))));
    assert!(matches!(gm2_solve(2.5, 2.0), Err(FeconError::Infeasible(_))));
    assert!(matches!(gm2_solve(5.0, 0.9), Err(FeconError::Infeasible(_))));
  }

  #[traced_test]
  #[test]
  fn retry_raises_b() {
    let s = gm2_main_with_retry(13.0, 0.1, 2.0, RETRIES).unwrap();
    assert_eq!(s.b, 2.5);
    assert!(logs_contain("retrying with larger b"));

    let s = gm2_main_with_retry(25.0, 0.1, 2.0, RETRIES).unwrap();
    assert_eq!(s.b, 3.0);
  }

  #[test]
  fn retry_gives_up() {
    assert!(matches!(
      gm2_main_with_retry(40.0, 0.1, 2.0, RETRIES),
      Err(FeconError::Infeasible(_))
    ));
    assert!(gm2_main_with_retry(13.0, 0.1, 2.0, 0).is_err());
  }

  #[test]
  fn gold_mixture() {
    let prices = xau().until(&date(4, 12));
    let s = gm2_vols(&prices, 2.5, 256.0).unwrap();
    assert_abs_diff_eq!(s.sigma1, 0.111829, epsilon = 1e-6);
    assert_abs_diff_eq!(s.sigma2, 0.287713, epsilon = 1e-6);
    assert_abs_diff_eq!(s.q, 0.0105, epsilon = 1e-4);

    let g = gm2_gem_rate(&prices, 256.0, 2.5).unwrap();
    assert_eq!(g.mix, s);
    assert_abs_diff_eq!(g.gem.rate, -0.313826, epsilon = 1e-6);
  }
}
