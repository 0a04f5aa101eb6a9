use crate::core::config::SecurityConfig;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; script-src 'self'; \
    style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; \
    object-src 'none'; frame-ancestors 'none'; form-action 'self'";

/// Configuration for security headers
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Send Strict-Transport-Security
    pub enable_hsts: bool,
    /// HSTS max-age in seconds
    pub hsts_max_age: u64,
}

impl SecurityHeadersConfig {
    pub fn new(enable_hsts: bool, hsts_max_age: u64) -> Self {
        Self {
            enable_hsts,
            hsts_max_age,
        }
    }

    fn hsts_value(&self) -> Option<HeaderValue> {
        if !self.enable_hsts {
            return None;
        }
        HeaderValue::from_str(&format!("max-age={}; includeSubDomains", self.hsts_max_age)).ok()
    }
}

impl From<&SecurityConfig> for SecurityHeadersConfig {
    fn from(config: &SecurityConfig) -> Self {
        Self::new(config.enable_hsts, config.hsts_max_age)
    }
}

/// Add browser hardening headers to every response.
///
/// HSTS is only sent when enabled in the security configuration.
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("same-origin"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );

    if let Some(hsts) = config.hsts_value() {
        headers.insert(header::STRICT_TRANSPORT_SECURITY, hsts);
    }

    response
}
