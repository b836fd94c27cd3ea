//! Shared helpers for router-level tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use conciliation_gateway::{GatewayConfig, GatewayService, ManualTime, MemorySheetStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TRUSTED: &str = "https://console.olivinha.site";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse battery staple";
pub const START: u64 = 1_700_000_000;
pub const DAY: u64 = 86_400;

pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualTime>,
    pub store: Arc<MemorySheetStore>,
}

/// Session and CSRF cookie values issued at login
pub struct Session {
    pub session: String,
    pub csrf: String,
}

impl Session {
    pub fn cookie_header(&self) -> String {
        format!("olivia_session={}; olivia_csrf={}", self.session, self.csrf)
    }
}

pub fn config() -> GatewayConfig {
    let env = [
        ("ADMIN_USER", ADMIN_USER),
        ("ADMIN_PASS", ADMIN_PASS),
        ("JWT_SECRET", "integration-signing-secret"),
        ("SHEET_SPREADSHEET_ID", "sheet-id"),
        ("SHEET_ES", "ES"),
        ("SHEET_DIF", "DIF"),
        ("SHEET_REJ", "REJ"),
        ("APP_ORIGIN", TRUSTED),
        ("SHEETS_BACKEND", "memory"),
    ];
    GatewayConfig::from_lookup(|key| {
        env.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    })
    .expect("test config is valid")
}

fn row(valor: f64, dono: &str, recorrente: &str, id: &str) -> Vec<Value> {
    vec![
        json!("1"),
        json!("10/03/2025"),
        json!("Internet"),
        json!(valor),
        json!("Casa"),
        json!(dono),
        json!("Itaú"),
        json!("CC"),
        json!(recorrente),
        json!(id),
    ]
}

pub fn seeded_store() -> MemorySheetStore {
    MemorySheetStore::new()
        .with_sheet(
            "ES",
            vec![
                vec![json!("header")],
                row(119.90, "Ana", "Sim", ""),
                row(150.00, "Ana", "Sim", ""),
            ],
        )
        .with_sheet(
            "DIF",
            vec![vec![json!("header")], row(120.00, "Ana", "", "P-42")],
        )
        .with_sheet("REJ", vec![vec![json!("header")]])
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(ManualTime::new(START));
        let store = Arc::new(seeded_store());
        let service = GatewayService::new(config(), store.clone(), clock.clone())
            .expect("service builds");
        Self {
            router: service.router(),
            clock,
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn login(&self) -> Session {
        let response = self
            .send(login_request(ADMIN_USER, ADMIN_PASS))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        Session {
            session: set_cookie_value(&response, "olivia_session").expect("session cookie"),
            csrf: set_cookie_value(&response, "olivia_csrf").expect("csrf cookie"),
        }
    }
}

pub fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::post("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

/// All `Set-Cookie` headers on a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Value of the named cookie as set by the response
pub fn set_cookie_value(response: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response).into_iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    })
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
