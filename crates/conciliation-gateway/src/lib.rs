//! Conciliation gateway: session authentication, CSRF defence and the
//! conciliation API over a spreadsheet store.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     CONCILIATION GATEWAY                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Tracing → BodyLimit → Router                                 │
//! │                          │                                    │
//! │      public ─────────────┼──────────── protected              │
//! │  /api/login              │        AuthLayer (AuthGate)        │
//! │  /api/logout             │        /api/conciliations/...      │
//! │  /api/auth/verify ── AuthGate                │                │
//! │  /health                                     │                │
//! │                                   ConciliationService         │
//! │                                              │                │
//! │                                  SheetStore (Google | Memory) │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Auth decision
//!
//! - No credential, bad signature, wrong algorithm or expired: **401**
//! - Mutating method (`POST`, `PUT`, `PATCH`, `DELETE`) failing the
//!   origin or double-submit token check: **403**
//! - Otherwise allowed
//!
//! `/api/auth/verify` runs the same decision against the method a reverse
//! proxy forwards in `X-Original-Method`.
//!
//! # Usage
//!
//! ```ignore
//! use conciliation_gateway::{GatewayConfig, GatewayService, MemorySheetStore, SystemTimeSource};
//!
//! let config = GatewayConfig::from_env()?;
//! let service = GatewayService::new(config, Arc::new(MemorySheetStore::new()), Arc::new(SystemTimeSource))?;
//! service.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod auth;
pub mod conciliation;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod service;
pub mod telemetry;

// Re-exports for public API
pub use adapters::{GoogleSheetsStore, MemorySheetStore};
pub use auth::{AuthError, AuthGate, CookiePolicy, CredentialCodec, SessionClaims};
pub use conciliation::{ConciliationError, ConciliationService};
pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, ApiResult, GatewayError, StoreError};
pub use domain::types::*;
pub use ports::{ManualTime, SheetStore, SystemTimeSource, TimeSource};
pub use service::GatewayService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
