use statrs::statistics::Statistics;

use crate::error::FeconError;
use crate::error::Result;

/// Central sample moments with population (biased) normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
  pub n: usize,
  pub mean: f64,
  /// Population standard deviation.
  pub sigma: f64,
  pub skewness: f64,
  /// Pearson kurtosis, 3 for a Gaussian.
  pub kurtosis: f64,
}

impl Moments {
  pub fn excess_kurtosis(&self) -> f64 {
    self.kurtosis - 3.0
  }
}

/// Mean, population sigma, skewness and Pearson kurtosis of `sample`.
///
/// Fails on fewer than two points or on a constant sample, where the
/// standardized moments are undefined.
pub fn moments(sample: &[f64]) -> Result<Moments> {
  if sample.len() < 2 {
    return Err(FeconError::InsufficientData {
      needed: 2,
      got: sample.len(),
    });
  }

  let mean = sample.iter().mean();
  let sigma = sample.iter().population_std_dev();
  if sigma <= 0.0 || !sigma.is_finite() {
    return Err(FeconError::InvalidParameter(
      "sample has zero variance".into(),
    ));
  }

  let n = sample.len() as f64;
  let (mut m3, mut m4) = (0.0, 0.0);
  for &x in sample {
    let d2 = (x - mean) * (x - mean);
    m3 += d2 * (x - mean);
    m4 += d2 * d2;
  }
  let m2 = sigma * sigma;

  Ok(Moments {
    n: sample.len(),
    mean,
    sigma,
    skewness: m3 / n / m2.powf(1.5),
    kurtosis: m4 / n / (m2 * m2),
  })
}
