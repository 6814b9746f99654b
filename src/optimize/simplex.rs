use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use super::evaluate;
use super::OptimizeConfig;
use super::Problem;
use crate::error::FeconError;
use crate::error::Result;

/// Relative perturbation for the initial simplex vertices.
const NONZDELT: f64 = 0.05;
/// Absolute perturbation for zero coordinates.
const ZDELT: f64 = 0.00025;

/// `initial` plus one vertex per coordinate, that coordinate nudged by 5%.
fn initial_simplex(initial: &[f64]) -> Vec<Vec<f64>> {
  let mut simplex = Vec::with_capacity(initial.len() + 1);
  simplex.push(initial.to_vec());
  for i in 0..initial.len() {
    let mut vertex = initial.to_vec();
    vertex[i] = if vertex[i] != 0.0 {
      (1.0 + NONZDELT) * vertex[i]
    } else {
      ZDELT
    };
    simplex.push(vertex);
  }
  simplex
}

/// Unconstrained Nelder-Mead refinement from `initial`.
///
/// Solver failures are not errors: the seed comes back unchanged, as it
/// does when the simplex ends on a worse point than it started from.
pub fn min_nelder<C>(cost: &C, initial: &[f64], config: &OptimizeConfig) -> Result<Vec<f64>>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  if initial.is_empty() {
    return Err(FeconError::InvalidParameter(
      "nelder-mead needs at least one parameter".into(),
    ));
  }

  let x0 = initial.to_vec();
  let solver = match NelderMead::new(initial_simplex(initial)).with_sd_tolerance(config.sd_tolerance) {
    Ok(solver) => solver,
    Err(err) => {
      debug!(%err, "nelder-mead setup failed, keeping seed");
      return Ok(x0);
    }
  };

  let best = match Executor::new(Problem::new(cost), solver)
    .configure(|state| state.max_iters(config.nelder_max_iters))
    .run()
  {
    Ok(res) => res.state.best_param,
    Err(err) => {
      debug!(%err, "nelder-mead failed, keeping seed");
      None
    }
  };

  Ok(match best {
    Some(x) if evaluate(cost, &x) <= evaluate(cost, &x0) => x,
    _ => x0,
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::optimize::testing::LineFit;
  use crate::optimize::testing::B_TRUE;
  use crate::optimize::testing::M_TRUE;
  use crate::optimize::FnCost;

  #[test]
  fn simplex_nudges_each_coordinate() {
    let s = initial_simplex(&[2.0, 0.0]);
    assert_eq!(s.len(), 3);
    assert_eq!(s[0], vec![2.0, 0.0]);
    assert_abs_diff_eq!(s[1][0], 2.1, epsilon = 1e-15);
    assert_eq!(s[1][1], 0.0);
    assert_eq!(s[2], vec![2.0, ZDELT]);
  }

  #[test]
  fn converges_from_a_wild_start() {
    let x = min_nelder(&LineFit::squared(), &[1000.0, 1000.0], &OptimizeConfig::default()).unwrap();
    assert_abs_diff_eq!(x[0], M_TRUE, epsilon = 0.01);
    assert_abs_diff_eq!(x[1], B_TRUE, epsilon = 0.01);
  }

  #[test]
  fn never_returns_a_worse_point() {
    // loss is flat everywhere except a pit at the seed
    let pit = FnCost::new(|z: &[f64]| if z[0] == 3.0 { -1.0 } else { 0.0 });
    let x = min_nelder(&pit, &[3.0], &OptimizeConfig::default()).unwrap();
    assert_eq!(x, vec![3.0]);
  }

  #[test]
  fn empty_seed_is_rejected() {
    let cost = FnCost::new(|_: &[f64]| 0.0);
    assert!(min_nelder(&cost, &[], &OptimizeConfig::default()).is_err());
  }
}
