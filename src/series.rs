//! # Series
//!
//! $$
//! S = \{(k_i, y_i)\}_{i=0}^{N-1},\quad k_0 < k_1 < \dots < k_{N-1},\quad y_i \in \mathbb{R}
//! $$
//!
//! Ordered numeric series with a strictly increasing key. Null entries (NaN or
//! non-finite values) never survive construction: they are dropped together
//! with their keys, so downstream recursions never see gaps.

use ndarray::Array1;
use statrs::statistics::Statistics;

use crate::error::FeconError;
use crate::error::Result;

/// Ordered, null-free numeric series indexed by a totally ordered key.
#[derive(Clone, Debug, PartialEq)]
pub struct Series<K = usize> {
  keys: Vec<K>,
  values: Vec<f64>,
}

impl<K> Series<K> {
  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn keys(&self) -> &[K] {
    &self.keys
  }

  pub fn values(&self) -> &[f64] {
    &self.values
  }

  /// Iterate over `(key, value)` pairs in key order.
  pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> + '_ {
    self.keys.iter().zip(self.values.iter().copied())
  }

  /// Latest observation.
  pub fn tail_value(&self) -> Option<f64> {
    self.values.last().copied()
  }

  pub fn last_key(&self) -> Option<&K> {
    self.keys.last()
  }

  /// Values as an owned `Array1`.
  pub fn to_array(&self) -> Array1<f64> {
    Array1::from(self.values.clone())
  }
}

impl<K: Ord + Clone> Series<K> {
  /// Build a series from parallel keys and values.
  ///
  /// Keys must be strictly increasing. Non-finite values are treated as
  /// nulls and dropped along with their keys.
  pub fn new(keys: Vec<K>, values: Vec<f64>) -> Result<Self> {
    if keys.len() != values.len() {
      return Err(FeconError::LengthMismatch {
        keys: keys.len(),
        values: values.len(),
      });
    }

    if let Some(index) = keys.windows(2).position(|w| w[0] >= w[1]) {
      return Err(FeconError::UnorderedKeys { index: index + 1 });
    }

    let (keys, values) = keys
      .into_iter()
      .zip(values)
      .filter(|(_, v)| v.is_finite())
      .unzip();

    Ok(Self { keys, values })
  }

  /// Build a series where missing observations are explicit `None`s.
  pub fn from_options(keys: Vec<K>, values: Vec<Option<f64>>) -> Result<Self> {
    let values = values
      .into_iter()
      .map(|v| v.unwrap_or(f64::NAN))
      .collect();
    Self::new(keys, values)
  }

  /// Reuse this series' keys for a derived column of the same length.
  pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
    debug_assert_eq!(self.keys.len(), values.len());
    let (keys, values) = self
      .keys
      .iter()
      .cloned()
      .zip(values)
      .filter(|(_, v)| v.is_finite())
      .unzip();
    Self { keys, values }
  }

  /// Observations with key `<= end`.
  pub fn until(&self, end: &K) -> Self {
    let n = self.keys.partition_point(|k| k <= end);
    Self {
      keys: self.keys[..n].to_vec(),
      values: self.values[..n].to_vec(),
    }
  }

  /// Observations with key `>= start`.
  pub fn since(&self, start: &K) -> Self {
    let n = self.keys.partition_point(|k| k < start);
    Self {
      keys: self.keys[n..].to_vec(),
      values: self.values[n..].to_vec(),
    }
  }

  /// Apply `f(y[i - freq], y[i])` for every index with a lag available.
  fn lagged(&self, freq: usize, f: impl Fn(f64, f64) -> f64) -> Self {
    let freq = freq.max(1);
    let (keys, values) = (freq..self.len())
      .map(|i| (self.keys[i].clone(), f(self.values[i - freq], self.values[i])))
      .filter(|(_, v)| v.is_finite())
      .unzip();
    Self { keys, values }
  }

  /// Lagged difference; `freq = 1` is the first difference.
  pub fn diff(&self, freq: usize) -> Self {
    self.lagged(freq, |prev, cur| cur - prev)
  }

  /// Percentage change over `freq` periods, expressed in percent.
  pub fn pct_change(&self, freq: usize) -> Self {
    self.lagged(freq, |prev, cur| (cur / prev - 1.0) * 100.0)
  }

  /// One-period log returns. Non-positive prices yield nulls, which are dropped.
  pub fn log_returns(&self) -> Self {
    self.lagged(1, |prev, cur| (cur / prev).ln())
  }

  /// Center around mean zero and scale to unit sample standard deviation.
  pub fn normalize(&self) -> Self {
    let mean = self.values.iter().mean();
    let sd = self.values.iter().std_dev();
    self.with_values(self.values.iter().map(|v| (v - mean) / sd).collect())
  }
}

impl Series<usize> {
  /// Series keyed by position `0..N`; nulls are dropped but positions are kept.
  pub fn from_values(values: Vec<f64>) -> Self {
    let (keys, values) = values
      .into_iter()
      .enumerate()
      .filter(|(_, v)| v.is_finite())
      .unzip();
    Self { keys, values }
  }
}

impl From<Vec<f64>> for Series<usize> {
  fn from(values: Vec<f64>) -> Self {
    Series::from_values(values)
  }
}


#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::fixtures::date;
  use super::fixtures::xau;
  use super::*;

  #[test]
  fn nulls_are_dropped_with_their_keys() {
    let s = Series::from_options(vec![1, 2, 3, 4], vec![Some(1.0), None, Some(3.0), None]).unwrap();
    assert_eq!(s.keys(), &[1, 3]);
    assert_eq!(s.values(), &[1.0, 3.0]);

    let s = Series::from_values(vec![f64::NAN, 2.0, f64::NAN, 4.0]);
    assert_eq!(s.keys(), &[1, 3]);
    assert_eq!(s.len(), 2);
  }

  #[test]
  fn rejects_unordered_or_duplicate_keys() {
    assert_eq!(
      Series::new(vec![1, 3, 2], vec![0.0; 3]),
      Err(FeconError::UnorderedKeys { index: 2 })
    );
    assert_eq!(
      Series::new(vec![1, 1], vec![0.0; 2]),
      Err(FeconError::UnorderedKeys { index: 1 })
    );
    assert_eq!(
      Series::new(vec![1, 2], vec![0.0]),
      Err(FeconError::LengthMismatch { keys: 2, values: 1 })
    );
  }

  #[test]
  fn xau_fixture_shape() {
    let xau = xau();
    assert_eq!(xau.len(), 30);
    assert_eq!(xau.tail_value(), Some(1393.75));
    assert_eq!(xau.until(&date(4, 12)).len(), 26);
    assert_eq!(xau.since(&date(4, 15)).len(), 4);
  }

  #[test]
  fn lagged_transforms() {
    let s = Series::from_values(vec![100.0, 110.0, 99.0]);

    let d = s.diff(1);
    assert_eq!(d.keys(), &[1, 2]);
    assert_abs_diff_eq!(d.values()[0], 10.0);
    assert_abs_diff_eq!(d.values()[1], -11.0, epsilon = 1e-12);

    let pc = s.pct_change(1);
    assert_abs_diff_eq!(pc.values()[0], 10.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pc.values()[1], -10.0, epsilon = 1e-12);

    let lr = s.log_returns();
    assert_abs_diff_eq!(lr.values()[0], 1.1f64.ln(), epsilon = 1e-15);

    assert_eq!(s.diff(2).values(), &[-1.0]);
  }

  #[test]
  fn normalize_centers_and_scales() {
    let s = Series::from_values(vec![1.0, 2.0, 3.0, 4.0, 5.0]).normalize();
    assert_abs_diff_eq!(s.values().iter().sum::<f64>(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(s.values()[4], 2.0 / 2.5f64.sqrt(), epsilon = 1e-12);
  }
}
