//! HTTP handlers and the state they share.

pub mod auth;
pub mod conciliation;

use crate::auth::{AuthGate, CookiePolicy};
use crate::conciliation::ConciliationService;
use crate::domain::AuthConfig;
use crate::ports::TimeSource;
use axum::Json;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub cookies: Arc<CookiePolicy>,
    pub conciliation: Arc<ConciliationService>,
    pub time: Arc<dyn TimeSource>,
    pub auth: Arc<AuthConfig>,
}

/// Liveness check
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
    }))
}
