//! Signed session credentials.
//!
//! HS256 JWTs carrying `sub`, `iat` and `exp`. Expiry is judged against the
//! injected [`TimeSource`], never the library's own clock, with zero leeway.

use super::error::CredentialError;
use crate::ports::TimeSource;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The only algorithm issued or accepted
pub const CREDENTIAL_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by a session credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Authenticated identity
    pub sub: String,
    /// Issued at, Unix seconds
    pub iat: u64,
    /// Expires at, Unix seconds
    pub exp: u64,
}

/// Issues and verifies session credentials under one symmetric secret
pub struct CredentialCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    time: Arc<dyn TimeSource>,
}

impl CredentialCodec {
    pub fn new(secret: &str, time: Arc<dyn TimeSource>) -> Self {
        let mut validation = Validation::new(CREDENTIAL_ALGORITHM);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            time,
        }
    }

    /// Sign a credential for `subject` valid for `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, CredentialError> {
        let iat = self.time.now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat,
            exp: iat.saturating_add(ttl.as_secs()),
        };

        encode(&Header::new(CREDENTIAL_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| CredentialError::Signing(e.to_string()))
    }

    /// Check signature, algorithm and expiry; return the claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, CredentialError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => CredentialError::BadSignature,
                ErrorKind::InvalidAlgorithm => CredentialError::UnexpectedAlgorithm,
                _ => CredentialError::Malformed,
            },
        )?;

        let now = self.time.now();
        if now >= data.claims.exp {
            debug!(exp = data.claims.exp, now, "Credential expired");
            return Err(CredentialError::Expired);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("algorithm", &CREDENTIAL_ALGORITHM)
            .finish_non_exhaustive()
    }
}
