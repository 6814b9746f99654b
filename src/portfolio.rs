//! # Portfolio
//!
//! $$
//! w_i=\frac{e^{(r_i-r_{\max})/\tau}}{\sum_j e^{(r_j-r_{\max})/\tau}}
//! $$
//!
//! Boltzmann (softmax) allocation over geometric mean rates, plus the
//! covariance algebra used to compare it with the global minimum variance
//! portfolio.

pub mod boltzmann;
pub mod matrix;
pub mod softmax;

pub use boltzmann::boltz_portfolio;
pub use boltzmann::ren_trim;
pub use boltzmann::renormalize;
pub use boltzmann::trim_it;
pub use boltzmann::weigh_cov;
pub use boltzmann::BoltzConfig;
pub use boltzmann::BoltzPortfolio;
pub use boltzmann::Holding;
pub use softmax::softmax;
pub use softmax::Softmax;
