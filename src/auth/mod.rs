//! Authentication module
//!
//! This module provides authentication functionality including:
//! - In-memory credential store with bcrypt verification
//! - JWT session token issuance and validation
//! - Bearer/cookie authentication middleware
//! - Login, logout and identity handlers

pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod store;

pub use handlers::{get_me, login, logout};
pub use jwt::{TokenError, TokenService};
pub use middleware::{optional_auth, require_auth, AuthUser};
pub use models::{Claims, User, UserPublic};
pub use store::{CredentialStore, StoreError};
