//! Gateway service: wires state, routes and middleware, and runs the server.

use crate::auth::{AuthGate, CookiePolicy, CredentialCodec};
use crate::conciliation::ConciliationService;
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::handlers::{self, AppState};
use crate::middleware::{AuthLayer, TracingLayer};
use crate::ports::{SheetStore, TimeSource};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

/// The conciliation gateway
pub struct GatewayService {
    config: GatewayConfig,
    state: AppState,
}

impl GatewayService {
    /// Validate configuration and build shared state
    pub fn new(
        config: GatewayConfig,
        store: Arc<dyn SheetStore>,
        time: Arc<dyn TimeSource>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;

        let codec = Arc::new(CredentialCodec::new(
            &config.auth.jwt_secret,
            Arc::clone(&time),
        ));
        let gate = Arc::new(AuthGate::new(codec, &config.auth.trusted_origin));
        let conciliation = Arc::new(ConciliationService::new(store, &config.sheets));

        let state = AppState {
            gate,
            cookies: Arc::new(CookiePolicy::from_config(&config.auth)),
            conciliation,
            time,
            auth: Arc::new(config.auth.clone()),
        };

        Ok(Self { config, state })
    }

    /// Full router with middleware applied
    pub fn router(&self) -> Router {
        let protected = Router::new()
            .route("/api/conciliations", get(handlers::conciliation::list))
            .route("/api/conciliations/:id", get(handlers::conciliation::details))
            .route(
                "/api/conciliations/:id/accept",
                post(handlers::conciliation::accept),
            )
            .route(
                "/api/conciliations/:id/reject",
                post(handlers::conciliation::reject),
            )
            .route_layer(AuthLayer::new(Arc::clone(&self.state.gate)));

        Router::new()
            .route("/api/login", post(handlers::auth::login))
            .route("/api/logout", post(handlers::auth::logout))
            .route(
                "/api/auth/verify",
                get(handlers::auth::verify).head(handlers::auth::verify_head),
            )
            .route("/health", get(handlers::health))
            .merge(protected)
            .layer(RequestBodyLimitLayer::new(self.config.http.max_body_bytes))
            .layer(TracingLayer::new())
            .with_state(self.state.clone())
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(GatewayError::Bind)?;
        info!(
            addr = %addr,
            trusted_origin = %self.config.auth.trusted_origin,
            secure_cookies = self.config.auth.cookie_secure,
            "Gateway listening"
        );
        if !self.config.auth.cookie_secure {
            warn!("Secure cookie attribute disabled");
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(GatewayError::Serve)?;

        info!("Gateway stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
