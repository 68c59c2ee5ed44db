//! Validation errors

use thiserror::Error;

/// Errors raised when validating bounds, positions, groupings or parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    #[error("{what} must have {expected} components, got {actual}")]
    InvalidDimension {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{what} contains a non-finite component")]
    NonFiniteComponent { what: &'static str },
    #[error("lower bound {lower} exceeds upper bound {upper} on axis {axis}")]
    InvertedBounds { axis: usize, lower: f64, upper: f64 },
    #[error("step size must be positive and finite, got {0}")]
    NonPositiveStep(f64),
    #[error("a composite requires at least one instanton")]
    EmptyComposite,
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

pub type Result<T> = std::result::Result<T, SimError>;
