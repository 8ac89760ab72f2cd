//! Error types for the search orchestrators.

use crate::article::ClassificationError;
use helpdesk_kb_client::ApiError;
use helpdesk_kb_core::SessionError;
use std::fmt;

/// Errors from a search invocation.
///
/// Every variant maps to the REST-error outcome at the dialog boundary; the
/// expired-token case never surfaces here because the client retries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The knowledge service call failed.
    Api(ApiError),
    /// Session variable access failed.
    Session(SessionError),
    /// A result could not be classified to a content type.
    Classification(ClassificationError),
    /// The service responded 2xx with an unexpected shape.
    InvalidResponse { reason: String },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(err) => write!(f, "knowledge service call failed: {err}"),
            Self::Session(err) => write!(f, "session access failed: {err}"),
            Self::Classification(err) => write!(f, "result classification failed: {err}"),
            Self::InvalidResponse { reason } => {
                write!(f, "unexpected search response: {reason}")
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::Classification(err) => Some(err),
            Self::InvalidResponse { .. } => None,
        }
    }
}

impl From<ApiError> for SearchError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<SessionError> for SearchError {
    fn from(err: SessionError) -> Self {
        Self::Session(err)
    }
}

impl From<ClassificationError> for SearchError {
    fn from(err: ClassificationError) -> Self {
        Self::Classification(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_api_error() {
        let err = SearchError::from(ApiError::Transport {
            reason: "connection refused".to_string(),
        });
        assert!(err.to_string().contains("connection refused"));
    }
}
