use crate::error::FeconError;
use crate::error::Result;

/// Softmax probabilities together with the hard (argmax) choice.
#[derive(Clone, Debug, PartialEq)]
pub struct Softmax {
  /// Index of the first maximum.
  pub idmax: usize,
  /// The maximum value itself.
  pub hardmax: f64,
  /// Probability assigned to `idmax`.
  pub hardprob: f64,
  /// Temperature setting the probabilities were computed with.
  pub temp: f64,
  pub probs: Vec<f64>,
}

/// Softmax with a temperature scaled to the data.
///
/// `tau` is `temp` percent of the gap between the maximum and the next
/// distinct value, so the result does not depend on the units of `values`.
/// Around 30..80 is a useful range: larger `temp` flattens the
/// probabilities, smaller sharpens them. `temp = 0` gives the plain softmax
/// (`tau = 1`), as does an input with no distinct second value.
pub fn softmax(values: &[f64], temp: f64) -> Result<Softmax> {
  if values.is_empty() {
    return Err(FeconError::InvalidParameter("softmax of an empty slice".into()));
  }
  if values.iter().any(|v| !v.is_finite()) {
    return Err(FeconError::InvalidParameter(
      "softmax needs finite values".into(),
    ));
  }

  let (idmax, hardmax) = values
    .iter()
    .copied()
    .enumerate()
    .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });

  // shifted values are <= 0, maxima exactly 0
  let stable: Vec<f64> = values.iter().map(|v| v - hardmax).collect();
  let second = stable
    .iter()
    .copied()
    .filter(|&v| v < 0.0)
    .fold(f64::NEG_INFINITY, f64::max);
  let tau = if temp == 0.0 || second == f64::NEG_INFINITY {
    1.0
  } else {
    (second * temp / 100.0).abs()
  };

  let exps: Vec<f64> = stable.iter().map(|v| (v / tau).exp()).collect();
  let sum: f64 = exps.iter().sum();
  let probs: Vec<f64> = exps.iter().map(|e| e / sum).collect();

  Ok(Softmax {
    idmax,
    hardmax,
    hardprob: probs[idmax],
    temp,
    probs,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  const SCORES: [f64; 6] = [16.0, 8.0, 4.0, 0.0, -8.0, -16.0];

  fn assert_probs(temp: f64, expected: &[f64]) {
    let s = softmax(&SCORES, temp).unwrap();
    assert_eq!(s.idmax, 0);
    assert_eq!(s.hardmax, 16.0);
    for (p, e) in s.probs.iter().zip(expected) {
      assert_abs_diff_eq!(*p, *e, epsilon = 5e-5);
    }
    assert_abs_diff_eq!(s.probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
  }

  #[test]
  fn temperature_flattens() {
    assert_probs(200.0, &[0.3565, 0.2162, 0.1684, 0.1311, 0.0795, 0.0482]);
    assert_probs(50.0, &[0.829, 0.1122, 0.0413, 0.0152, 0.0021, 0.0003]);
    assert_probs(30.0, &[0.9581, 0.0342, 0.0065, 0.0012, 0.0, 0.0]);
  }

  #[test]
  fn zero_temperature_is_plain_softmax() {
    assert_probs(0.0, &[0.9997, 0.0003, 0.0, 0.0, 0.0, 0.0]);
  }

  #[test]
  fn cold_is_nearly_hardmax() {
    let s = softmax(&SCORES, 1.0).unwrap();
    assert_abs_diff_eq!(s.hardprob, 1.0, epsilon = 1e-12);
  }

  #[test]
  fn scale_free_with_temperature() {
    let a = softmax(&SCORES, 55.0).unwrap();
    let scaled: Vec<f64> = SCORES.iter().map(|v| v * 0.01).collect();
    let b = softmax(&scaled, 55.0).unwrap();
    for (x, y) in a.probs.iter().zip(&b.probs) {
      assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
    }
  }

  #[test]
  fn ties_are_equiprobable() {
    let s = softmax(&[2.0, 2.0, 2.0], 50.0).unwrap();
    assert_eq!(s.idmax, 0);
    assert!(s.probs.iter().all(|&p| (p - 1.0 / 3.0).abs() < 1e-15));
  }

  #[test]
  fn rejects_bad_input() {
    assert!(softmax(&[], 50.0).is_err());
    assert!(softmax(&[1.0, f64::NAN], 50.0).is_err());
  }
}
