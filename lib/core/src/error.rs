//! Error types for core session operations.

use std::fmt;

/// Errors from session variable operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A required variable was not set.
    Missing { name: String },
    /// A variable held a value of an unexpected shape.
    TypeMismatch { name: String, reason: String },
    /// The backing store failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { name } => write!(f, "session variable not set: {name}"),
            Self::TypeMismatch { name, reason } => {
                write!(f, "session variable {name} has unexpected shape: {reason}")
            }
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let err = SessionError::Missing {
            name: "search_number".to_string(),
        };
        assert!(err.to_string().contains("search_number"));

        let err = SessionError::StorageFailed {
            reason: "connection reset".to_string(),
        };
        assert!(err.to_string().contains("connection reset"));
    }
}
