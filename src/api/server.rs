//! HTTP Server implementation
//!
//! This module provides the HTTP server using Axum framework with:
//! - Configurable host/port binding
//! - Graceful shutdown handling
//! - Concurrency limits and request timeouts
//! - Static asset serving
//! - CORS support

use crate::api::handlers::AppState;
use crate::api::middleware::{security_headers_middleware, trace_id_middleware, SecurityHeadersConfig};
use crate::api::routes::build_app_routes;
use crate::core::config::ServerConfig;
use crate::core::Config;
use axum::{middleware, Router};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower::{limit::GlobalConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

/// HTTP API Server
pub struct ApiServer {
    router: Router,
    config: ServerConfig,
}

impl ApiServer {
    /// Create a new API server with the given configuration and application state
    pub fn new(config: &Config, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
            config: config.server.clone(),
        }
    }

    /// Build the Axum router with all routes and middleware
    fn build_router(config: &Config, state: AppState) -> Router {
        let security_headers = SecurityHeadersConfig::from(&config.security);

        build_app_routes(state)
            .nest_service("/static", ServeDir::new(&config.server.static_dir))
            .layer(
                ServiceBuilder::new()
                    // Add tracing for all requests
                    .layer(TraceLayer::new_for_http())
                    // Add trace ID middleware for request tracking
                    .layer(middleware::from_fn(trace_id_middleware))
                    // Add security headers middleware
                    .layer(middleware::from_fn_with_state(
                        security_headers,
                        security_headers_middleware,
                    ))
                    // Add CORS support
                    .layer(Self::build_cors_layer(&config.security.allowed_origins))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout,
                    )))
                    .layer(GlobalConcurrencyLimitLayer::new(config.server.max_connections)),
            )
    }

    /// Build CORS layer from allowed origins configuration
    fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
        let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

        if allowed_origins.iter().any(|origin| origin == "*") {
            cors.allow_origin(Any)
        } else {
            let origins: Vec<_> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            cors.allow_origin(origins)
        }
    }

    /// Start the HTTP server and listen for requests
    ///
    /// This method will block until the server is shut down gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let socket_addr: SocketAddr = addr.parse()?;

        info!(
            host = %self.config.host,
            port = self.config.port,
            max_connections = self.config.max_connections,
            request_timeout = self.config.request_timeout,
            static_dir = %self.config.static_dir.display(),
            "Starting HTTP server"
        );

        let listener = tokio::net::TcpListener::bind(socket_addr).await?;

        info!(addr = %socket_addr, "HTTP server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server shut down gracefully");

        Ok(())
    }

    /// Get a reference to the router
    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Initiating graceful shutdown...");
}
