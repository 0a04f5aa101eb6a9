//! HTTP API module
//!
//! This module provides the HTTP server and endpoints including:
//! - Routing for pages, data and auth endpoints
//! - Trace ID and security header middleware
//! - Page and mock data handlers

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use middleware::{trace_id_middleware, TraceId, TRACE_ID_HEADER};
pub use server::ApiServer;
