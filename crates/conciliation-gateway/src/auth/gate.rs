//! The auth gate: one decision shared by the route middleware and the
//! proxy verification endpoint.
//!
//! ```text
//! credential? --no--> 401
//!     | yes
//! valid? -----no--> 401
//!     | yes
//! mutating? --no--> allow
//!     | yes
//! csrf ok? ---no--> 403
//!     | yes
//!   allow
//! ```

use super::cookies::SESSION_COOKIE;
use super::credential::{CredentialCodec, SessionClaims};
use super::csrf::{requires_csrf, validate_csrf};
use super::error::{AuthError, CredentialError};
use axum::http::{header, HeaderMap, Method};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::{debug, warn};

/// Header a delegating proxy uses to forward the client's real method
pub const ORIGINAL_METHOD_HEADER: &str = "x-original-method";

/// Authenticates requests and enforces CSRF on mutating methods
#[derive(Debug, Clone)]
pub struct AuthGate {
    codec: Arc<CredentialCodec>,
    trusted_origin: Arc<str>,
}

impl AuthGate {
    pub fn new(codec: Arc<CredentialCodec>, trusted_origin: &str) -> Self {
        Self {
            codec,
            trusted_origin: Arc::from(trusted_origin),
        }
    }

    /// Decide a request made with `method`.
    ///
    /// Authentication is checked first; CSRF only for mutating methods.
    pub fn authorize(&self, headers: &HeaderMap, method: &str) -> Result<SessionClaims, AuthError> {
        let claims = extract_credential(headers)
            .ok_or(CredentialError::Missing)
            .and_then(|token| self.codec.verify(&token))
            .map_err(|reason| {
                warn!(%reason, method, "Rejected credential");
                AuthError::from(reason)
            })?;

        if requires_csrf(method) {
            validate_csrf(headers, &self.trusted_origin).map_err(|reason| {
                warn!(%reason, method, subject = %claims.sub, "CSRF check failed");
                AuthError::from(reason)
            })?;
        }

        debug!(method, subject = %claims.sub, "Request authorized");
        Ok(claims)
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }
}

/// Bearer token from `Authorization`, else the session cookie.
///
/// Only the exact form `Bearer <token>` counts as a bearer header; anything
/// else falls through to the cookie.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|value| {
            let parts: Vec<&str> = value.split(' ').collect();
            match parts.as_slice() {
                ["Bearer", token] if !token.is_empty() => Some(token.to_string()),
                _ => None,
            }
        });

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Method the CSRF rule applies to on the verification endpoint.
///
/// The forwarded `X-Original-Method`, trimmed and upper-cased, or `GET`.
pub fn original_method(headers: &HeaderMap) -> String {
    headers
        .get(ORIGINAL_METHOD_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_uppercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| Method::GET.to_string())
}
