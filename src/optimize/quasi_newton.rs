use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::LBFGS;
use tracing::debug;

use super::evaluate;
use super::OptimizeConfig;
use super::Problem;
use crate::error::FeconError;
use crate::error::Result;

/// Unconstrained L-BFGS from `initial`, gradient by central differences.
///
/// Like [`super::min_nelder`], a failed run or a worse end point returns the
/// seed. Non-smooth losses often stop at the seed after a single step.
pub fn min_broyden<C>(cost: &C, initial: &[f64], config: &OptimizeConfig) -> Result<Vec<f64>>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  if initial.is_empty() {
    return Err(FeconError::InvalidParameter(
      "l-bfgs needs at least one parameter".into(),
    ));
  }

  let x0 = initial.to_vec();
  let f0 = evaluate(cost, &x0);
  if !f0.is_finite() {
    debug!(f0, "l-bfgs seed has no finite loss, skipping");
    return Ok(x0);
  }

  let solver = MoreThuenteLineSearch::new()
    .with_c(1e-4, 0.9)
    .and_then(|linesearch| LBFGS::new(linesearch, config.lbfgs_memory).with_tolerance_grad(config.grad_tolerance));
  let solver = match solver {
    Ok(solver) => solver,
    Err(err) => {
      debug!(%err, "l-bfgs setup failed, keeping seed");
      return Ok(x0);
    }
  };

  let best = match Executor::new(Problem::new(cost), solver)
    .configure(|state| state.param(x0.clone()).max_iters(config.lbfgs_max_iters))
    .run()
  {
    Ok(res) => res.state.best_param,
    Err(err) => {
      debug!(%err, "l-bfgs failed, keeping seed");
      None
    }
  };

  Ok(match best {
    Some(x) if evaluate(cost, &x) <= f0 => x,
    _ => x0,
  })
}
