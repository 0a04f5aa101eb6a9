pub mod data;
pub mod pages;
pub mod system;

pub use data::*;
pub use pages::*;
pub use system::*;

use crate::auth::jwt::TokenService;
use crate::auth::store::CredentialStore;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CredentialStore>,
    pub tokens: Arc<TokenService>,
    /// Add `Secure` to session cookies
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(store: Arc<CredentialStore>, tokens: Arc<TokenService>, secure_cookies: bool) -> Self {
        Self {
            store,
            tokens,
            secure_cookies,
        }
    }
}

/// Lowest cost bcrypt accepts; keeps hashing cheap in tests
#[cfg(test)]
pub(crate) const TEST_BCRYPT_COST: u32 = 4;

/// Seeded state with a cheap bcrypt cost for handler tests
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    let store = CredentialStore::with_default_admin(TEST_BCRYPT_COST)
        .expect("seeding the test store");
    let tokens = TokenService::new("test-secret", chrono::Duration::hours(24));
    AppState::new(Arc::new(store), Arc::new(tokens), false)
}
