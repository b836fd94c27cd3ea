//! Session authentication and CSRF defence.
//!
//! Stateless: a request is authenticated by a signed, unexpired session
//! credential and, for mutating methods, by a double-submit CSRF token
//! from a trusted origin. Nothing is stored server side.

pub mod compare;
pub mod cookies;
pub mod credential;
pub mod csrf;
pub mod error;
pub mod gate;
pub mod origin;
pub mod token;

pub use compare::{constant_time_compare, constant_time_eq};
pub use cookies::{CookiePolicy, CSRF_COOKIE, SESSION_COOKIE};
pub use credential::{CredentialCodec, SessionClaims, CREDENTIAL_ALGORITHM};
pub use csrf::{requires_csrf, validate_csrf, CSRF_HEADER};
pub use error::{AuthError, CredentialError, CsrfError, TokenError};
pub use gate::{extract_credential, original_method, AuthGate, ORIGINAL_METHOD_HEADER};
pub use origin::validate_origin;
pub use token::generate_csrf_token;
