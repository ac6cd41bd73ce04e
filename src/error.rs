// Error types for the proxy.
// Maps validation, upstream, and transport failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("malformed repository identifier: {0}")]
    MalformedRepo(String),

    #[error("invalid item number: {0}")]
    InvalidNumber(String),

    #[error("not found on GitHub: {0}")]
    NotFound(String),

    #[error("GitHub rate limit exceeded")]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    #[error("GitHub returned HTTP {status}")]
    Upstream { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ProxyError::MalformedRepo(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "malformed repository identifier".to_string(),
                    details: Some(reason),
                    reset: None,
                },
            ),
            ProxyError::InvalidNumber(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid item number".to_string(),
                    details: Some(reason),
                    reset: None,
                },
            ),
            ProxyError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not found on GitHub".to_string(),
                    details: Some(what),
                    reset: None,
                },
            ),
            ProxyError::RateLimited { reset_at } => (
                StatusCode::TOO_MANY_REQUESTS,
                ErrorBody {
                    error: "GitHub rate limit exceeded".to_string(),
                    details: None,
                    reset: reset_at.map(|t| t.to_rfc3339()),
                },
            ),
            ProxyError::Upstream { status, message } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                ErrorBody {
                    error: format!("GitHub returned HTTP {status}"),
                    details: non_empty(message),
                    reset: None,
                },
            ),
            ProxyError::Api(err) => {
                let error = if err.is_timeout() {
                    "GitHub request timed out"
                } else {
                    "GitHub request failed"
                };
                // without_url keeps upstream addresses out of client-facing bodies.
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: error.to_string(),
                        details: Some(err.without_url().to_string()),
                        reset: None,
                    },
                )
            }
            ProxyError::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "internal error".to_string(),
                    details: Some(err.to_string()),
                    reset: None,
                },
            ),
            ProxyError::Other(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: message,
                    details: None,
                    reset: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn non_empty(message: String) -> Option<String> {
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_maps_to_429() {
        let err = ProxyError::RateLimited {
            reset_at: DateTime::from_timestamp(1_700_000_000, 0),
        };
        assert_eq!(err.into_response().status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_upstream_status_passes_through() {
        let err = ProxyError::Upstream {
            status: 403,
            message: "abuse detection".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_unknown_upstream_status_falls_back_to_500() {
        let err = ProxyError::Upstream {
            status: 42,
            message: String::new(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_skips_absent_fields() {
        let body = ErrorBody {
            error: "nope".to_string(),
            details: None,
            reset: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"error":"nope"}"#);
    }
}
