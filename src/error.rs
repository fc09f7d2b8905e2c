//! Error types shared by the matrix, selection and combination layers.

use std::fmt;

/// Errors that can occur while building matrices or running a decomposition.
#[derive(Debug, Clone, PartialEq)]
pub enum DecompositionError {
    /// Two shapes that must agree do not.
    DimensionMismatch {
        /// Operation that rejected its inputs.
        operation: &'static str,
        /// Expected shape, as `(rows, columns)` or `(n, n)` for a single extent.
        expected: (usize, usize),
        /// Shape actually received.
        got: (usize, usize),
    },
    /// Cell or row access outside `[0, height) x [0, width)`.
    IndexOutOfBounds {
        row: usize,
        column: usize,
        height: usize,
        width: usize,
    },
    /// More basis rows requested than there are candidates.
    DimensionTooHigh {
        /// Requested basis dimension.
        requested: usize,
        /// Number of candidate rows.
        available: usize,
    },
    /// A configuration parameter is outside its legal range.
    InvalidParameter { name: &'static str, value: f64 },
    /// A local search exceeded its sweep bound.
    NonConvergence {
        algorithm: &'static str,
        sweeps: usize,
    },
    /// Text matrix could not be parsed.
    Parse { line: usize, message: String },
}

impl fmt::Display for DecompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompositionError::DimensionMismatch {
                operation,
                expected,
                got,
            } => write!(
                f,
                "Dimension mismatch in {}: expected {} x {}, got {} x {}",
                operation, expected.0, expected.1, got.0, got.1
            ),
            DecompositionError::IndexOutOfBounds {
                row,
                column,
                height,
                width,
            } => write!(
                f,
                "Index ({}, {}) out of bounds for {} x {} matrix",
                row, column, height, width
            ),
            DecompositionError::DimensionTooHigh {
                requested,
                available,
            } => write!(
                f,
                "dimension too high: cannot choose {} basis rows out of {} candidates",
                requested, available
            ),
            DecompositionError::InvalidParameter { name, value } => {
                write!(f, "Invalid value for {}: {}", name, value)
            }
            DecompositionError::NonConvergence { algorithm, sweeps } => {
                write!(f, "{} did not converge within {} sweeps", algorithm, sweeps)
            }
            DecompositionError::Parse { line, message } => {
                write!(f, "Parse error on line {}: {}", line, message)
            }
        }
    }
}

impl std::error::Error for DecompositionError {}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DecompositionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e1 = DecompositionError::DimensionMismatch {
            operation: "boolean_product",
            expected: (3, 3),
            got: (4, 2),
        };
        assert!(e1.to_string().contains("boolean_product"));
        assert!(e1.to_string().contains("4 x 2"));

        let e2 = DecompositionError::DimensionTooHigh {
            requested: 5,
            available: 3,
        };
        assert!(e2.to_string().contains("dimension too high"));

        let e3 = DecompositionError::NonConvergence {
            algorithm: "Iter",
            sweeps: 10,
        };
        assert_eq!(e3.to_string(), "Iter did not converge within 10 sweeps");
    }
}
