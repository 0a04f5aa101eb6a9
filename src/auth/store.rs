//! In-memory credential store
//!
//! Users are indexed by both username and email. Lookups share a read lock;
//! creation takes the write lock for the uniqueness check and insert.

use crate::auth::models::User;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@dashboard.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Hashed once per store; logins for unknown identities verify against it
const DECOY_PASSWORD: &str = "decoy-password-never-issued";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is already registered")]
    DuplicateIdentity(String),

    #[error("no user matches {0}")]
    NotFound(String),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Default)]
struct Registry {
    by_identity: HashMap<String, Arc<User>>,
    user_count: usize,
    next_id: u64,
}

impl Registry {
    fn conflict(&self, username: &str, email: &str) -> Option<String> {
        [username, email]
            .into_iter()
            .find(|identity| self.by_identity.contains_key(*identity))
            .map(str::to_string)
    }
}

/// Registry of user accounts with bcrypt password verification
pub struct CredentialStore {
    registry: RwLock<Registry>,
    cost: u32,
    decoy_hash: String,
}

impl CredentialStore {
    /// Create an empty store hashing with the given bcrypt cost
    pub fn new(cost: u32) -> Self {
        let decoy_hash = bcrypt::hash(DECOY_PASSWORD, cost).unwrap_or_else(|e| {
            warn!(error = %e, cost, "Failed to hash decoy password");
            String::new()
        });

        Self {
            registry: RwLock::new(Registry {
                next_id: 1,
                ..Registry::default()
            }),
            cost,
            decoy_hash,
        }
    }

    /// Create a store seeded with the bootstrap administrator account
    pub fn with_default_admin(cost: u32) -> Result<Self, StoreError> {
        let store = Self::new(cost);
        let admin = store.create_user(
            DEFAULT_ADMIN_USERNAME,
            DEFAULT_ADMIN_EMAIL,
            DEFAULT_ADMIN_PASSWORD,
        )?;

        info!(
            user_id = admin.id,
            username = %admin.username,
            "Default admin user created (username: admin, password: admin123)"
        );
        warn!("Change the default admin password before exposing this server");

        Ok(store)
    }

    /// Register a new user; username and email must both be unused identities
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Arc<User>, StoreError> {
        // Early rejection before hashing; re-checked under the write lock.
        if let Some(taken) = self.registry.read().conflict(username, email) {
            return Err(StoreError::DuplicateIdentity(taken));
        }

        let password_hash = bcrypt::hash(password, self.cost)?;

        let mut registry = self.registry.write();
        if let Some(taken) = registry.conflict(username, email) {
            return Err(StoreError::DuplicateIdentity(taken));
        }

        let user = Arc::new(User {
            id: registry.next_id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        });

        registry.next_id += 1;
        registry.user_count += 1;
        registry
            .by_identity
            .insert(user.username.clone(), Arc::clone(&user));
        registry
            .by_identity
            .insert(user.email.clone(), Arc::clone(&user));

        info!(user_id = user.id, username = %user.username, "Created user");
        Ok(user)
    }

    /// Look up a user by username or email
    pub fn get_user_by_identifier(&self, identifier: &str) -> Result<Arc<User>, StoreError> {
        self.registry
            .read()
            .by_identity
            .get(identifier)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(identifier.to_string()))
    }

    /// Check a candidate password against the user's stored hash
    pub fn verify_password(&self, user: &User, candidate: &str) -> bool {
        match bcrypt::verify(candidate, &user.password_hash) {
            Ok(valid) => {
                debug!(user_id = user.id, valid, "Password verification");
                valid
            }
            Err(e) => {
                warn!(user_id = user.id, error = %e, "Stored password hash could not be verified");
                false
            }
        }
    }

    /// Spend the same bcrypt work as [`Self::verify_password`] for an identity
    /// that does not exist. Always false.
    pub fn verify_unknown_identity(&self, candidate: &str) -> bool {
        let matched = bcrypt::verify(candidate, &self.decoy_hash).unwrap_or(false);
        debug!(matched, "Decoy password verification");
        false
    }

    /// Number of registered users
    pub fn len(&self) -> usize {
        self.registry.read().user_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::api::handlers::TEST_BCRYPT_COST as TEST_COST;

    #[test]
    fn test_default_admin_created() {
        let store = CredentialStore::with_default_admin(TEST_COST).unwrap();

        let admin = store.get_user_by_identifier("admin").unwrap();
        assert_eq!(admin.id, 1);
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.email, "admin@dashboard.com");

        let by_email = store.get_user_by_identifier("admin@dashboard.com").unwrap();
        assert!(Arc::ptr_eq(&admin, &by_email));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_password_verification() {
        let store = CredentialStore::with_default_admin(TEST_COST).unwrap();
        let admin = store.get_user_by_identifier("admin").unwrap();

        assert!(store.verify_password(&admin, "admin123"));
        assert!(!store.verify_password(&admin, "wrongpassword"));
        assert!(!store.verify_password(&admin, ""));
    }

    #[test]
    fn test_ids_are_sequential() {
        let store = CredentialStore::with_default_admin(TEST_COST).unwrap();
        let alice = store.create_user("alice", "alice@example.com", "pw1").unwrap();
        let bob = store.create_user("bob", "bob@example.com", "pw2").unwrap();

        assert_eq!(alice.id, 2);
        assert_eq!(bob.id, 3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = CredentialStore::with_default_admin(TEST_COST).unwrap();
        let result = store.create_user("admin", "other@example.com", "pw");
        assert!(matches!(result, Err(StoreError::DuplicateIdentity(ref id)) if id == "admin"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let store = CredentialStore::with_default_admin(TEST_COST).unwrap();
        let result = store.create_user("someone", "admin@dashboard.com", "pw");
        assert!(matches!(result, Err(StoreError::DuplicateIdentity(_))));
    }

    #[test]
    fn test_username_cannot_shadow_existing_email() {
        let store = CredentialStore::with_default_admin(TEST_COST).unwrap();
        let result = store.create_user("admin@dashboard.com", "new@example.com", "pw");
        assert!(matches!(result, Err(StoreError::DuplicateIdentity(_))));
    }

    #[test]
    fn test_unknown_identifier() {
        let store = CredentialStore::new(TEST_COST);
        assert!(store.is_empty());
        assert!(matches!(
            store.get_user_by_identifier("nobody"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_decoy_hash_uses_store_cost() {
        let store = CredentialStore::new(TEST_COST);
        assert!(store
            .decoy_hash
            .starts_with(&format!("$2b${:02}$", TEST_COST)));

        assert!(!store.verify_unknown_identity(DECOY_PASSWORD));
        assert!(!store.verify_unknown_identity("admin123"));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let store = CredentialStore::new(TEST_COST);
        let user = User {
            id: 99,
            username: "broken".to_string(),
            email: "broken@example.com".to_string(),
            password_hash: "not-a-bcrypt-hash".to_string(),
        };
        assert!(!store.verify_password(&user, "anything"));
    }

    #[test]
    fn test_concurrent_creation_keeps_identities_unique() {
        let store = Arc::new(CredentialStore::new(TEST_COST));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    store
                        .create_user("racer", "racer@example.com", "pw")
                        .is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_created_user_found_by_either_identity(
            username in "[a-z][a-z0-9_]{2,15}",
            email in "[a-z]{1,10}@[a-z]{1,8}\\.com",
            password in "[A-Za-z0-9!#%]{1,32}",
            other in "[A-Za-z0-9!#%]{1,32}",
        ) {
            prop_assume!(other != password);

            let store = CredentialStore::new(TEST_COST);
            let created = store.create_user(&username, &email, &password).unwrap();

            let by_name = store.get_user_by_identifier(&username).unwrap();
            let by_email = store.get_user_by_identifier(&email).unwrap();
            prop_assert_eq!(by_name.id, created.id);
            prop_assert_eq!(by_email.id, created.id);
            prop_assert_eq!(&by_name.email, &email);

            prop_assert!(store.verify_password(&by_name, &password));
            prop_assert!(!store.verify_password(&by_name, &other));
        }
    }
}
