//! Error types for the ACO TSP solver.
//!
//! Input validation happens once, when an instance or a colony is built.
//! Nothing inside a running colony returns an error.

use thiserror::Error;

/// Result type alias for solver operations
pub type Result<T> = std::result::Result<T, ColonyError>;

/// Errors raised while building instances, configurations or colonies
#[derive(Error, Debug)]
pub enum ColonyError {
    /// Instance with no cities
    #[error("Instance must contain at least one city")]
    EmptyInstance,

    /// Matrix shape does not match the declared number of cities
    #[error("Dimension mismatch: expected {expected} {what}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// Negative distance
    #[error("Negative distance {value} between cities {from} and {to}")]
    NegativeDistance { from: usize, to: usize, value: f64 },

    /// Zero distance between two distinct cities (would divide by zero in the desirability)
    #[error("Zero distance between distinct cities {from} and {to}")]
    ZeroDistance { from: usize, to: usize },

    /// NaN or infinite distance
    #[error("Non-finite distance {value} between cities {from} and {to}")]
    NonFiniteDistance { from: usize, to: usize, value: f64 },

    /// Algorithm parameter out of range
    #[error("Invalid parameter {name} = {value}: {constraint}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },

    /// Malformed instance file
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ColonyError::ZeroDistance { from: 1, to: 3 };
        assert_eq!(err.to_string(), "Zero distance between distinct cities 1 and 3");

        let err = ColonyError::InvalidParameter {
            name: "rho",
            value: 1.5,
            constraint: "must lie in [0, 1]",
        };
        assert!(err.to_string().contains("rho = 1.5"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ColonyError = io.into();
        assert!(matches!(err, ColonyError::Io(_)));
    }
}
