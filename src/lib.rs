//! # fecon-rs
//!
//! $$
//! \hat y_{N+k} = \ell_N + k\,b_N
//! $$
//!
//! Financial-economics toolkit: Holt-Winters smoothing and forecasting with
//! a three-stage parameter optimizer, kurtosis-corrected geometric mean
//! rates, GM(2) mixture decomposition and a Boltzmann portfolio allocator.
//!
//! The library logs through `tracing` and never installs a subscriber;
//! binaries decide where the output goes.
//!
//! ```ignore
//! use fecon_rs::optimize::optimize_holt;
//! use fecon_rs::series::Series;
//! use fecon_rs::timeseries::forecast;
//!
//! let prices = Series::from_values(vec![/* .. */]);
//! let fit = optimize_holt(&prices, 20, (0.0, 1.0), (0.0, 1.0))?;
//! let path = forecast(&prices, 12, fit.params())?;
//! ```

pub mod error;
pub mod optimize;
pub mod portfolio;
pub mod series;
pub mod source;
pub mod stats;
pub mod timeseries;

pub use error::FeconError;
pub use error::FetchError;
pub use error::Result;
pub use series::Series;
