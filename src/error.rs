//! Error types for graphnets operations.
//!
//! Graph layers and models validate their inputs and report problems through
//! [`GraphNetsError`]. Dense modules keep asserting on internal shape
//! invariants.

use thiserror::Error;

/// Main error type for graphnets operations.
///
/// # Examples
///
/// ```
/// use graphnets::error::GraphNetsError;
///
/// let err = GraphNetsError::dimension_mismatch("node features", 16, 8);
/// assert!(err.to_string().contains("dimension mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum GraphNetsError {
    /// Tensor dimensions don't match what the operation expects.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// An edge endpoint or row index lies outside the valid range.
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Valid length
        len: usize,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// An input that must be non-empty was empty.
    #[error("empty input: {context}")]
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// I/O error (config file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GraphNetsError {
    /// Create a dimension mismatch error with a named context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{context}={actual}"),
        }
    }

    /// Create a shape mismatch error from two shapes.
    #[must_use]
    pub fn shape_mismatch(context: &str, expected: &[usize], actual: &[usize]) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context} {expected:?}"),
            actual: format!("{context} {actual:?}"),
        }
    }

    /// Create an invalid hyperparameter error.
    #[must_use]
    pub fn invalid_hyperparameter(
        param: &str,
        value: impl ToString,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }

    /// Create an empty input error.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, GraphNetsError>;
