//! # Optimize
//!
//! $$
//! \hat\theta = \operatorname{LBFGS}\big(\operatorname{NM}(\arg\min_{\theta\in G} L(\theta))\big)
//! $$
//!
//! Three-stage minimization for noisy loss functions: a coarse grid search
//! over the given box, an unconstrained Nelder-Mead simplex refinement and a
//! final L-BFGS step with a finite-difference gradient. The box only guides
//! the grid; later stages are free to leave it.
//!
//! Loss functions are `argmin` cost functions over `Vec<f64>`; data the
//! loss needs (but which is not optimized) lives inside the implementing
//! struct.

use argmin::core::CostFunction;
use argmin::core::Gradient;
use tracing::debug;

use crate::error::Result;

pub mod grid;
pub mod holt;
pub mod quasi_newton;
pub mod simplex;

pub use grid::min_brute;
pub use holt::holt_loss;
pub use holt::optimize_holt;
pub use holt::HoltFit;
pub use holt::HoltLoss;
pub use quasi_newton::min_broyden;
pub use simplex::min_nelder;

/// Tuning for the three optimizer stages.
#[derive(Clone, Debug)]
pub struct OptimizeConfig {
  /// Grid points per dimension, endpoints included.
  pub grids: usize,
  /// Iteration cap for Nelder-Mead.
  pub nelder_max_iters: u64,
  /// Nelder-Mead stops once the standard deviation of vertex costs falls below this.
  pub sd_tolerance: f64,
  /// Iteration cap for L-BFGS.
  pub lbfgs_max_iters: u64,
  /// Number of correction pairs kept by L-BFGS.
  pub lbfgs_memory: usize,
  /// L-BFGS stops once the gradient norm falls below this.
  pub grad_tolerance: f64,
}

impl Default for OptimizeConfig {
  fn default() -> Self {
    Self {
      grids: 20,
      nelder_max_iters: 5000,
      sd_tolerance: 1e-10,
      lbfgs_max_iters: 200,
      lbfgs_memory: 7,
      grad_tolerance: 1e-8,
    }
  }
}

/// Best point found and the loss achieved there.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizeResult {
  /// Final estimate.
  pub params: Vec<f64>,
  /// Loss at `params`.
  pub loss: f64,
  /// Grid-search estimate (stage 1).
  pub brute: Vec<f64>,
  /// Nelder-Mead estimate (stage 2).
  pub nelder: Vec<f64>,
}

/// Adapts a plain closure into a cost function.
pub struct FnCost<F> {
  f: F,
}

impl<F> FnCost<F>
where
  F: Fn(&[f64]) -> f64,
{
  pub fn new(f: F) -> Self {
    Self { f }
  }
}

impl<F> CostFunction for FnCost<F>
where
  F: Fn(&[f64]) -> f64,
{
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    Ok((self.f)(x.as_slice()))
  }
}

/// Loss at `x`; failures and NaN count as `+inf` so every point stays comparable.
pub(crate) fn evaluate<C>(cost: &C, x: &Vec<f64>) -> f64
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  match cost.cost(x) {
    Ok(v) if !v.is_nan() => v,
    _ => f64::INFINITY,
  }
}

/// Borrowed view of a cost function handed to `argmin` executors.
///
/// Supplies a central-difference gradient for the quasi-Newton stage.
pub(crate) struct Problem<'a, C> {
  cost: &'a C,
}

impl<'a, C> Problem<'a, C> {
  pub(crate) fn new(cost: &'a C) -> Self {
    Self { cost }
  }
}

impl<C> CostFunction for Problem<'_, C>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    Ok(evaluate(self.cost, x))
  }
}

impl<C> Gradient for Problem<'_, C>
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  type Param = Vec<f64>;
  type Gradient = Vec<f64>;

  fn gradient(&self, x: &Self::Param) -> std::result::Result<Self::Gradient, argmin::core::Error> {
    let step = f64::EPSILON.cbrt();
    let mut grad = vec![0.0; x.len()];
    let mut probe = x.clone();

    for i in 0..x.len() {
      let h = step * x[i].abs().max(1.0);
      probe[i] = x[i] + h;
      let f_plus = evaluate(self.cost, &probe);
      probe[i] = x[i] - h;
      let f_minus = evaluate(self.cost, &probe);
      probe[i] = x[i];
      grad[i] = (f_plus - f_minus) / (2.0 * h);
    }

    Ok(grad)
  }
}

/// Grid search, then Nelder-Mead, then L-BFGS, each seeded by the previous stage.
///
/// `initial_pairs` are `(min, max)` per parameter and only bound the grid.
/// The pipeline always returns a point: a stage that fails or does not
/// improve on its seed passes the seed through unchanged.
pub fn optimize<C>(cost: &C, initial_pairs: &[(f64, f64)], grids: usize) -> Result<OptimizeResult>
where
  C: CostFunction<Param = Vec<f64>, Output = f64> + Sync,
{
  let config = OptimizeConfig {
    grids,
    ..OptimizeConfig::default()
  };
  optimize_with_config(cost, initial_pairs, &config)
}

/// [`optimize`] with explicit stage tuning.
pub fn optimize_with_config<C>(
  cost: &C,
  initial_pairs: &[(f64, f64)],
  config: &OptimizeConfig,
) -> Result<OptimizeResult>
where
  C: CostFunction<Param = Vec<f64>, Output = f64> + Sync,
{
  let brute = min_brute(cost, initial_pairs, config.grids)?;
  debug!(?brute, loss = evaluate(cost, &brute), "grid search");

  let nelder = min_nelder(cost, &brute, config)?;
  debug!(?nelder, loss = evaluate(cost, &nelder), "nelder-mead");

  let params = min_broyden(cost, &nelder, config)?;
  let loss = evaluate(cost, &params);
  debug!(?params, loss, "l-bfgs");

  Ok(OptimizeResult {
    params,
    loss,
    brute,
    nelder,
  })
}
