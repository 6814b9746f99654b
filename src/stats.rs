//! # Stats
//!
//! $$
//! \log g \approx \log(1+\mu) - \frac{\sigma^2}{2(1+\mu)^2} - \frac{\kappa\,\sigma^4}{4(1+\mu)^4}
//! $$
//!
//! Return statistics: sample moments, the kurtosis-corrected geometric mean
//! rate and the structured zero-mean two-component Gaussian mixture GM(2).
pub mod gauss_mix;
pub mod gemrate;
pub mod moments;

pub use gauss_mix::gm2_gem_rate;
pub use gauss_mix::gm2_main;
pub use gauss_mix::gm2_main_with_retry;
pub use gauss_mix::gm2_solve;
pub use gauss_mix::gm2_vols;
pub use gauss_mix::Gm2GemRat;
pub use gauss_mix::Gm2Spec;
pub use gemrate::gem_rat;
pub use gemrate::gem_rate;
pub use gemrate::GemRat;
pub use moments::moments;
pub use moments::Moments;
