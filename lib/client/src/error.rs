//! Error types for the knowledge REST client.

use std::fmt;

/// Upstream error code indicating the session token has expired.
pub const SESSION_EXPIRED_CODE: &str = "OK-SESSION0003";

/// Upstream error code indicating a requested document does not exist.
pub const NOT_FOUND_CODE: &str = "OKDOM-GEN0002";

/// Errors from knowledge service requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure (connection, TLS, timeout).
    Transport { reason: String },
    /// Non-2xx response from the service.
    Status {
        status: u16,
        /// Service error code extracted from the response body, if any.
        code: Option<String>,
        body: String,
    },
    /// 2xx response whose body did not have the expected shape.
    InvalidResponse { reason: String },
}

impl ApiError {
    /// Returns true if the service reported an expired session token.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::Status { code: Some(code), .. } if code == SESSION_EXPIRED_CODE)
    }

    /// Returns true if the service reported a missing document.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { code: Some(code), .. } if code == NOT_FOUND_CODE)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => write!(f, "transport failure: {reason}"),
            Self::Status { status, code, body } => {
                if let Some(code) = code {
                    write!(f, "service returned {status} ({code}): {body}")
                } else {
                    write!(f, "service returned {status}: {body}")
                }
            }
            Self::InvalidResponse { reason } => {
                write!(f, "unexpected response shape: {reason}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
