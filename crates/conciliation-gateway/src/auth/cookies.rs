//! Session and CSRF cookies.
//!
//! Both cookies share every attribute except `HttpOnly`: the CSRF cookie
//! must stay readable by same-origin script so it can be echoed back in
//! the `X-CSRF-Token` header.

use crate::domain::AuthConfig;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::time::Duration;
use time::OffsetDateTime;

/// HTTP-only cookie carrying the session credential
pub const SESSION_COOKIE: &str = "olivia_session";

/// Script-readable cookie carrying the CSRF token
pub const CSRF_COOKIE: &str = "olivia_csrf";

/// Cookie attributes derived from configuration
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    domain: Option<String>,
    secure: bool,
    max_age: Duration,
}

impl CookiePolicy {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
            max_age: config.session_ttl,
        }
    }

    /// Add both auth cookies to `jar`; `now` is Unix seconds
    pub fn set_auth_cookies(
        &self,
        jar: CookieJar,
        session_token: &str,
        csrf_token: &str,
        now: u64,
    ) -> CookieJar {
        let max_age = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let expires = i64::try_from(now)
            .ok()
            .and_then(|now| now.checked_add(max_age))
            .and_then(|at| OffsetDateTime::from_unix_timestamp(at).ok());

        let session = self.build(SESSION_COOKIE, session_token, true, max_age, expires);
        let csrf = self.build(CSRF_COOKIE, csrf_token, false, max_age, expires);
        jar.add(session).add(csrf)
    }

    /// Overwrite both auth cookies with empty, already-expired values
    pub fn clear_auth_cookies(&self, jar: CookieJar) -> CookieJar {
        let epoch = Some(OffsetDateTime::UNIX_EPOCH);
        let session = self.build(SESSION_COOKIE, "", true, 0, epoch);
        let csrf = self.build(CSRF_COOKIE, "", false, 0, epoch);
        jar.add(session).add(csrf)
    }

    fn build(
        &self,
        name: &'static str,
        value: &str,
        http_only: bool,
        max_age_secs: i64,
        expires: Option<OffsetDateTime>,
    ) -> Cookie<'static> {
        let mut builder = Cookie::build((name, value.to_string()))
            .path("/")
            .http_only(http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(time::Duration::seconds(max_age_secs));

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(at) = expires {
            builder = builder.expires(at);
        }

        builder.build()
    }
}
