//! Failure taxonomy of the query adapter

use crate::backend::BackendError;
use crate::graph::{GraphModelError, VertexId};
use thiserror::Error;

/// Errors returned by `QueryAdapter` operations
///
/// Backend error shapes never cross this boundary: every failure is one of
/// these five kinds. `detail` strings are for server-side logs only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// The requested vertex does not exist
    #[error("vertex {0} not found")]
    NotFound(VertexId),

    /// Malformed or out-of-range input, caught before any upstream call
    #[error("invalid {parameter}: {message}")]
    InvalidArgument {
        parameter: &'static str,
        message: String,
    },

    /// Connection or transport failure; safe to retry
    #[error("graph database unavailable: {detail}")]
    UpstreamUnavailable { detail: String },

    /// The query exceeded its deadline
    #[error("graph query timed out: {detail}")]
    UpstreamTimeout { detail: String },

    /// Anything else the database or its responses threw at us
    #[error("unexpected graph failure: {detail}")]
    Unknown { detail: String },
}

pub type AdapterResult<T> = Result<T, AdapterError>;

impl AdapterError {
    pub fn invalid(parameter: &'static str, err: impl std::fmt::Display) -> Self {
        AdapterError::InvalidArgument {
            parameter,
            message: err.to_string(),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        AdapterError::Unknown {
            detail: detail.into(),
        }
    }

    /// Short kind name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::NotFound(_) => "not_found",
            AdapterError::InvalidArgument { .. } => "invalid_argument",
            AdapterError::UpstreamUnavailable { .. } => "upstream_unavailable",
            AdapterError::UpstreamTimeout { .. } => "upstream_timeout",
            AdapterError::Unknown { .. } => "unknown",
        }
    }
}

impl From<BackendError> for AdapterError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(detail) => AdapterError::UpstreamUnavailable { detail },
            BackendError::Timeout(detail) => AdapterError::UpstreamTimeout { detail },
            BackendError::Closed => AdapterError::UpstreamUnavailable {
                detail: "backend closed".to_string(),
            },
            other @ (BackendError::Rejected { .. } | BackendError::Protocol(_)) => {
                AdapterError::unknown(other.to_string())
            }
        }
    }
}

impl From<GraphModelError> for AdapterError {
    fn from(err: GraphModelError) -> Self {
        AdapterError::invalid(err.parameter(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_classification() {
        assert!(matches!(
            AdapterError::from(BackendError::Unavailable("refused".into())),
            AdapterError::UpstreamUnavailable { .. }
        ));
        assert!(matches!(
            AdapterError::from(BackendError::Timeout("598".into())),
            AdapterError::UpstreamTimeout { .. }
        ));
        let unknown = AdapterError::from(BackendError::Rejected {
            status: 500,
            message: "No such property: foo".into(),
        });
        assert_eq!(unknown.kind(), "unknown");
        assert!(unknown.to_string().contains("No such property"));
        assert!(matches!(
            AdapterError::from(BackendError::Protocol("bad json".into())),
            AdapterError::Unknown { .. }
        ));
    }

    #[test]
    fn test_model_errors_name_their_parameter() {
        let err = AdapterError::from(GraphModelError::UnknownDirection("sideways".into()));
        assert!(matches!(
            err,
            AdapterError::InvalidArgument { parameter: "direction", .. }
        ));
        let err = AdapterError::from(GraphModelError::EmptyId);
        assert!(matches!(err, AdapterError::InvalidArgument { parameter: "id", .. }));
    }
}
