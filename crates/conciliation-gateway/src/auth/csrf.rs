//! Double-submit cookie CSRF validation.

use super::compare::constant_time_compare;
use super::cookies::CSRF_COOKIE;
use super::error::CsrfError;
use super::origin::validate_origin;
use axum::http::{header, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

/// Header that must echo the CSRF cookie
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Methods that change state and therefore need a CSRF check
const MUTATING_METHODS: [&str; 4] = ["POST", "PUT", "PATCH", "DELETE"];

/// Whether `method` needs the double-submit check (case-insensitive)
pub fn requires_csrf(method: &str) -> bool {
    MUTATING_METHODS
        .iter()
        .any(|m| m.eq_ignore_ascii_case(method))
}

/// Run the CSRF checks in order, stopping at the first failure:
/// origin, cookie present, header present, cookie equals header.
pub fn validate_csrf(headers: &HeaderMap, trusted_origin: &str) -> Result<(), CsrfError> {
    validate_origin(
        header_str(headers, header::ORIGIN.as_str()),
        header_str(headers, header::REFERER.as_str()),
        trusted_origin,
    )?;

    let jar = CookieJar::from_headers(headers);
    let cookie = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CsrfError::MissingCookie)?;

    let token = header_str(headers, CSRF_HEADER)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(CsrfError::MissingHeader)?;

    if constant_time_compare(&cookie, token) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
