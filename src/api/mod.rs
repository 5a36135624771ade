//! HTTP API for the medicine catalog.
//!
//! Exposes the suggestion pipeline as `GET /api/medicines/suggest` plus a
//! health check. Every route is open to any origin (CORS) and passes
//! through the access-log middleware.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{bind, serve, ServerError};
pub use types::ApiContext;
