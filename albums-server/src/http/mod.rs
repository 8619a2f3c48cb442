//! HTTP server layer
//!
//! Axum server with:
//! - Request IDs, request tracing and real-IP extraction
//! - Panic recovery and a per-request timeout
//! - A store handle bound to each album request
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig, ServerError};
