use serde::{Deserialize, Serialize};

// Health API models

/// Response for the health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: String,
    /// Crate version
    pub version: String,
    /// Unix timestamp of the check
    pub timestamp: i64,
    /// Number of registered users
    pub users: usize,
}
