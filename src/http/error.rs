//! HTTP error responses
//!
//! Every failure leaves the service as `{ error, code?, details? }`.
//! Upstream detail is logged here and never serialized.

use crate::adapter::AdapterError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid {parameter}: {message}")]
    Validation {
        parameter: &'static str,
        message: String,
    },

    #[error("missing required parameter {0}")]
    MissingParameter(&'static str),

    #[error("vertex not found")]
    NotFound,

    #[error("route not found")]
    RouteNotFound,

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("upstream timeout: {0}")]
    Timeout(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(parameter: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            parameter,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. 5xx bodies carry no internal detail.
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation { parameter, message } => ErrorBody {
                error: "Invalid parameters".to_string(),
                code: Some("VALIDATION_ERROR"),
                details: Some(json!({ "parameter": parameter, "message": message })),
            },
            ApiError::MissingParameter(parameter) => ErrorBody {
                error: format!("{} parameter is required", parameter),
                code: Some("MISSING_PARAMETER"),
                details: Some(json!({ "parameter": parameter })),
            },
            ApiError::NotFound => ErrorBody {
                error: "Vertex not found".to_string(),
                code: None,
                details: None,
            },
            ApiError::RouteNotFound => ErrorBody {
                error: "Route not found".to_string(),
                code: Some("NOT_FOUND"),
                details: None,
            },
            ApiError::Unavailable(_) => ErrorBody {
                error: "Graph database unavailable".to_string(),
                code: Some("UPSTREAM_UNAVAILABLE"),
                details: None,
            },
            ApiError::Timeout(_) => ErrorBody {
                error: "Graph database timed out".to_string(),
                code: Some("UPSTREAM_TIMEOUT"),
                details: None,
            },
            ApiError::Internal(_) => ErrorBody {
                error: "Internal server error".to_string(),
                code: Some("INTERNAL_ERROR"),
                details: None,
            },
        }
    }
}

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::NotFound(_) => ApiError::NotFound,
            AdapterError::InvalidArgument { parameter, message } => {
                ApiError::Validation { parameter, message }
            }
            AdapterError::UpstreamUnavailable { detail } => ApiError::Unavailable(detail),
            AdapterError::UpstreamTimeout { detail } => ApiError::Timeout(detail),
            AdapterError::Unknown { detail } => ApiError::Internal(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_json(err: &ApiError) -> Value {
        serde_json::to_value(err.body()).unwrap()
    }

    #[test]
    fn test_validation_body() {
        let err = ApiError::validation("direction", "unknown direction 'sideways'");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&err),
            json!({
                "error": "Invalid parameters",
                "code": "VALIDATION_ERROR",
                "details": {"parameter": "direction", "message": "unknown direction 'sideways'"}
            })
        );
    }

    #[test]
    fn test_not_found_body_has_no_code() {
        assert_eq!(body_json(&ApiError::NotFound), json!({"error": "Vertex not found"}));
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let cases = [
            (ApiError::Unavailable("connect ECONNREFUSED 10.0.0.1".into()), 503),
            (ApiError::Timeout("status 598".into()), 504),
            (ApiError::Internal("groovy.lang.MissingMethodException".into()), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status);
            let text = serde_json::to_string(&err.body()).unwrap();
            assert!(!text.contains("ECONNREFUSED"));
            assert!(!text.contains("598"));
            assert!(!text.contains("groovy"));
            assert!(!text.contains("details"));
        }
    }

    #[test]
    fn test_from_adapter_error() {
        assert!(matches!(
            ApiError::from(AdapterError::UpstreamTimeout { detail: "x".into() }),
            ApiError::Timeout(_)
        ));
        assert!(matches!(
            ApiError::from(AdapterError::invalid("id", "vertex tt1 is a movie, not a person")),
            ApiError::Validation { parameter: "id", .. }
        ));
    }
}
