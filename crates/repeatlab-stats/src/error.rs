//! Errors for distribution comparison.

use thiserror::Error;

/// Errors raised by the comparator's API boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("probability at index {index} is {value}; expected a finite non-negative value")]
    InvalidProbability { index: usize, value: f64 },

    #[error("vectors are not aligned: {left} vs {right} outcomes")]
    LengthMismatch { left: usize, right: usize },

    /// The count vector does not sum to the declared number of trials.
    #[error("counts sum to {counted} but {declared} trials were declared")]
    ConsistencyViolation { counted: u64, declared: u64 },

    #[error(transparent)]
    Core(#[from] repeatlab_core::Error),
}

pub type Result<T> = std::result::Result<T, CompareError>;
