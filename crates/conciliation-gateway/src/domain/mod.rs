//! Domain types for the gateway.
//!
//! Configuration, errors, API types and the pure matching rules.
//! Store access lives behind the ports in [`crate::ports`].

pub mod config;
pub mod error;
pub mod matching;
pub mod types;

// Re-exports for convenience
pub use config::{AuthConfig, ConfigError, GatewayConfig, HttpConfig, SheetsBackend, SheetsConfig};
pub use error::{ApiError, ApiResult, GatewayError, StoreError};
pub use types::*;
