//! Authentication and CSRF failure reasons.
//!
//! The detailed variants are for logs only. At the HTTP boundary they
//! collapse into [`AuthError`], which maps to a bare 401 or 403.

use crate::domain::ApiError;

/// Why a session credential was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("no credential presented")]
    Missing,

    #[error("malformed credential")]
    Malformed,

    #[error("signature mismatch")]
    BadSignature,

    #[error("credential expired")]
    Expired,

    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,

    #[error("failed to sign credential: {0}")]
    Signing(String),
}

/// Why a mutating request failed the double-submit check
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CsrfError {
    #[error("origin or referer not trusted")]
    InvalidOrigin,

    #[error("csrf cookie missing")]
    MissingCookie,

    #[error("csrf header missing")]
    MissingHeader,

    #[error("csrf token mismatch")]
    Mismatch,
}

/// Entropy source failed twice in a row
#[derive(Debug, thiserror::Error)]
#[error("entropy source unavailable: {0}")]
pub struct TokenError(pub String);

/// Outcome of the auth gate as seen by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,
}

impl From<CredentialError> for AuthError {
    fn from(_: CredentialError) -> Self {
        AuthError::Unauthorized
    }
}

impl From<CsrfError> for AuthError {
    fn from(_: CsrfError) -> Self {
        AuthError::Forbidden
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => ApiError::Unauthorized,
            AuthError::Forbidden => ApiError::Forbidden,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
