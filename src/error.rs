//! Error types for nufft

use thiserror::Error;

/// Result type alias using nufft's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or applying a transform
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Geometry or kernel-designer output cannot form a valid plan
    #[error("Invalid plan: {reason}")]
    InvalidPlan {
        /// Why the plan was rejected
        reason: String,
    },

    /// Operator state (channel profile, Toeplitz requirements, formats) is inconsistent
    #[error("Configuration error: {reason}")]
    Configuration {
        /// Description of the inconsistency
        reason: String,
    },

    /// Input shape does not match the plan-derived expected shape
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Device resources were released and the operation needs them
    #[error("Device resources have been released")]
    Released,
}

impl Error {
    /// Create an invalid plan error
    pub fn invalid_plan(reason: impl Into<String>) -> Self {
        Self::InvalidPlan {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::shape_mismatch(&[16, 16], &[16, 8]);
        assert_eq!(
            err.to_string(),
            "Shape mismatch: expected [16, 16], got [16, 8]"
        );

        let err = Error::invalid_plan("Kd[0]=8 is smaller than Nd[0]=16");
        assert!(err.to_string().starts_with("Invalid plan:"));

        let err = Error::invalid_argument("group_width", "must be a power of two");
        assert_eq!(
            err.to_string(),
            "Invalid argument 'group_width': must be a power of two"
        );

        let err = Error::configuration("Kd too small for Toeplitz embedding");
        assert_eq!(
            err.to_string(),
            "Configuration error: Kd too small for Toeplitz embedding"
        );
        assert_eq!(
            Error::Released.to_string(),
            "Device resources have been released"
        );
    }
}
