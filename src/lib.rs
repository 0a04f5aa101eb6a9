//! Sales Dashboard Server Library
//!
//! HTML pages and JSON endpoints for sales and inventory data, gated by
//! JWT session authentication.

pub mod api;
pub mod auth;
pub mod core;

// Re-export commonly used types
pub use api::{ApiServer, AppState};
pub use crate::core::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
