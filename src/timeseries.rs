//! # Time Series
//!
//! $$
//! \ell_t = \alpha y_t + (1-\alpha)(\ell_{t-1}+b_{t-1}),\qquad
//! b_t = \beta(\ell_t-\ell_{t-1}) + (1-\beta)b_{t-1}
//! $$
//!
//! Holt-Winters linear growth model (no seasonal component) and its naive
//! linear forecast.

pub mod forecast;
pub mod holt;

pub use forecast::forecast;
pub use forecast::holt_forecast;
pub use holt::ema;
pub use holt::holt;
pub use holt::holt_growth;
pub use holt::holt_level;
pub use holt::holt_pc;
pub use holt::holt_winters_growth;
pub use holt::HoltParams;
pub use holt::HoltWorkout;
