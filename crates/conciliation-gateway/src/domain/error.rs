//! Gateway error types and their HTTP mapping.
//!
//! Handlers return [`ApiError`]; it carries only a generic client-facing
//! message. Internal detail is logged and never written to the response.

use super::config::ConfigError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

/// Boundary error for HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, invalid or expired session credential
    #[error("unauthorized")]
    Unauthorized,

    /// Login with the wrong identity
    #[error("invalid credentials")]
    InvalidCredentials,

    /// CSRF origin or token failure
    #[error("forbidden")]
    Forbidden,

    /// Malformed request input
    #[error("bad request: {0}")]
    BadRequest(&'static str),

    /// Addressed row does not exist
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Anything else; the detail stays in the logs
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::InvalidCredentials => "Invalid credentials",
            ApiError::Forbidden => "Forbidden",
            ApiError::BadRequest(message) | ApiError::NotFound(message) => *message,
            ApiError::Internal(_) => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Request failed");
        }

        let status = self.status();
        let body = serde_json::json!({ "error": self.public_message() });
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

/// Result type for handler operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Sheet store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Sheet name unknown to the store
    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    /// Transport failure talking to the remote store
    #[error("transport error: {0}")]
    Transport(String),

    /// Remote store answered with a non-success status
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Service account key unreadable or rejected
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Store settings unusable (bad endpoint URL)
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// Row index beyond what a sheet can hold
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

/// Gateway-level errors (startup, not per-request)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(#[source] std::io::Error),

    /// Server loop failed
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    /// Store could not be initialised
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::BadRequest("Invalid ID").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_detail_not_exposed() {
        let response = ApiError::Internal("sheet token expired at 12:00".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert!(!body.contains("sheet token"));
        assert!(body.contains("Internal server error"));
    }

    #[tokio::test]
    async fn test_unauthorized_sets_challenge() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(body_string(response).await, r#"{"error":"Unauthorized"}"#);
    }

    #[test]
    fn test_store_error_becomes_internal() {
        let err: ApiError = StoreError::SheetNotFound("DIF".into()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
