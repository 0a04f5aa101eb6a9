//! Sales Dashboard Server
//!
//! Serves the dashboard pages and data API behind JWT authentication.

use sales_dashboard::auth::{CredentialStore, TokenService};
use sales_dashboard::{api, core};

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize logging system based on configuration
    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Sales Dashboard v{}", sales_dashboard::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        environment = ?config.security.environment,
        "Server configuration"
    );

    let security = &config.security;
    if security.uses_insecure_secret() {
        warn!("Signing tokens with the built-in development secret; set JWT_SECRET before deploying");
    }
    let secret = security.resolve_jwt_secret()?;
    let tokens = TokenService::new(&secret, chrono::Duration::hours(security.token_ttl_hours));

    let store = if security.seed_admin {
        CredentialStore::with_default_admin(security.bcrypt_cost)?
    } else {
        CredentialStore::new(security.bcrypt_cost)
    };
    info!(
        users = store.len(),
        bcrypt_cost = security.bcrypt_cost,
        token_ttl_hours = security.token_ttl_hours,
        "Credential store ready"
    );

    let state = api::AppState::new(Arc::new(store), Arc::new(tokens), security.secure_cookies);

    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(&config, state);

    info!(url = %server_url, "Server ready - starting to serve requests");

    // Start serving (this will block until shutdown signal)
    server.serve().await?;

    Ok(())
}
