//! Middleware stack for the gateway.
//!
//! Layer order: Request → Tracing → BodyLimit → Router → Auth (protected routes only) → Handler

pub mod auth;
pub mod tracing;

pub use auth::{AuthLayer, AuthenticatedUser};
pub use tracing::{TracingLayer, REQUEST_ID_HEADER};
