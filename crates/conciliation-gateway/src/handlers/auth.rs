//! Login, logout and the proxy verification endpoint.

use super::AppState;
use crate::auth::{constant_time_compare, generate_csrf_token, original_method};
use crate::domain::{ApiError, ApiResult, LoginRequest, LoginResponse};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, warn};

/// `POST /api/login`
///
/// Checks the admin identity, then sets the session and CSRF cookies.
/// Tokens are never echoed in the body.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let request: LoginRequest =
        serde_json::from_slice(&body).map_err(|_| ApiError::BadRequest("Invalid request"))?;

    // Evaluate both so a wrong username costs the same as a wrong password.
    let user_ok = constant_time_compare(&request.username, &state.auth.admin_username);
    let pass_ok = constant_time_compare(&request.password, &state.auth.admin_password);
    if !(user_ok & pass_ok) {
        warn!(username = %request.username, "Login failed");
        return Err(ApiError::InvalidCredentials);
    }

    let csrf_token = generate_csrf_token()?;
    let session_token = state
        .gate
        .codec()
        .issue(&request.username, state.auth.session_ttl)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let jar = state
        .cookies
        .set_auth_cookies(jar, &session_token, &csrf_token, state.time.now());

    info!(username = %request.username, "Login succeeded");
    Ok((jar, Json(LoginResponse { authenticated: true })))
}

/// `POST /api/logout`
///
/// Always succeeds. Credentials are stateless, so this only tells the
/// client to drop its cookies.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (state.cookies.clear_auth_cookies(jar), StatusCode::NO_CONTENT)
}

/// `GET /api/auth/verify`
///
/// For a reverse proxy's auth-request hook: CSRF is judged against the
/// forwarded `X-Original-Method`, not this request's own GET.
pub async fn verify(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<StatusCode> {
    let method = original_method(&headers);
    state.gate.authorize(&headers, &method)?;
    Ok(StatusCode::OK)
}

/// `HEAD /api/auth/verify`
///
/// Only GET is served; axum would otherwise answer HEAD with the GET handler.
pub async fn verify_head() -> (StatusCode, [(header::HeaderName, &'static str); 1]) {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET")])
}
