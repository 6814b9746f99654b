//! # Error
//!
//! $$
//! \mathcal{E} = \{\text{invalid data}\} \cup \{\text{infeasible}\} \cup \{\text{fetch}\}
//! $$
//!
//! Error taxonomy shared by every module. Numerical-instability conditions
//! that have a closed-form fallback are logged, not raised.

use thiserror::Error;

/// Result type alias for fecon operations.
pub type Result<T> = std::result::Result<T, FeconError>;

/// Errors raised by the toolkit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeconError {
  /// Series is empty, or became empty after dropping nulls.
  #[error("empty series: at least one non-null observation is required")]
  EmptySeries,

  /// Too few observations for the requested operation.
  #[error("insufficient data: need at least {needed} observations, got {got}")]
  InsufficientData { needed: usize, got: usize },

  /// Keys and values have different lengths.
  #[error("length mismatch: {keys} keys but {values} values")]
  LengthMismatch { keys: usize, values: usize },

  /// Keys are not strictly increasing.
  #[error("keys must be strictly increasing, violated at index {index}")]
  UnorderedKeys { index: usize },

  /// Malformed argument to an optimizer or estimator.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// No real solution exists within the admissible range.
  #[error("infeasible: {0}")]
  Infeasible(String),

  /// Matrix could not be inverted, not even by pseudo-inverse.
  #[error("singular matrix: {0}")]
  Singular(String),

  /// Every configured data source failed.
  #[error(transparent)]
  Fetch(#[from] FetchError),
}

/// Failure of a single data source, or of a whole source chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
  /// The source does not know the requested code.
  #[error("{source_name}: unknown code '{code}'")]
  UnknownCode { source_name: String, code: String },

  /// The source answered but the data was unusable.
  #[error("{source_name}: {reason}")]
  Unavailable { source_name: String, reason: String },

  /// All sources in a chain were tried; one message per attempt.
  #[error("all sources failed for '{code}': {}", .attempts.join("; "))]
  Exhausted { code: String, attempts: Vec<String> },
}
