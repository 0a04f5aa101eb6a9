//! Authentication middleware

use crate::api::handlers::AppState;
use crate::auth::models::Claims;
use crate::core::error::DashboardError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{
        header::{self, InvalidHeaderValue},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Cookie carrying the session token for browser navigation
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Where unauthenticated browser navigation is sent
pub const LOGIN_PATH: &str = "/login";

/// Authenticated identity, available to handlers behind [`require_auth`]
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub email: String,
}

impl From<&Claims> for AuthUser {
    fn from(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username.clone(),
            email: claims.email.clone(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = DashboardError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .map(AuthUser::from)
            .ok_or_else(|| DashboardError::Unauthorized("User not authenticated".to_string()))
    }
}

/// Gate a route: bearer header first, then the auth cookie for HTML navigation.
///
/// Browsers without a valid token are redirected to the login page (clearing
/// a bad cookie); API clients get 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let is_html = accepts_html(request.headers());

    let Some(token) = extract_token(request.headers(), is_html) else {
        tracing::debug!(uri = %request.uri(), is_html, "Request without session token");
        if is_html {
            return Redirect::to(LOGIN_PATH).into_response();
        }
        return DashboardError::Unauthorized("Missing token".to_string()).into_response();
    };

    match state.tokens.validate_token(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) if is_html => {
            tracing::info!(uri = %request.uri(), reason = %e, "Rejected session cookie, redirecting to login");
            match clear_session_cookie(state.secure_cookies) {
                Ok(cookie) => ([(header::SET_COOKIE, cookie)], Redirect::to(LOGIN_PATH)).into_response(),
                Err(_) => Redirect::to(LOGIN_PATH).into_response(),
            }
        }
        Err(e) => DashboardError::from(e).into_response(),
    }
}

/// Attach claims when a valid token is present; never rejects
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let is_html = accepts_html(request.headers());

    if let Some(token) = extract_token(request.headers(), is_html) {
        if let Ok(claims) = state.tokens.validate_token(&token) {
            request.extensions_mut().insert(claims);
        }
    }

    next.run(request).await
}

/// Whether the client negotiates for HTML, i.e. a browser navigation
pub fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

/// Find the session token; the cookie is only consulted when `allow_cookie`
pub fn extract_token(headers: &HeaderMap, allow_cookie: bool) -> Option<String> {
    extract_bearer_token(headers).or_else(|| {
        if allow_cookie {
            extract_cookie_token(headers)
        } else {
            None
        }
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.trim().strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

fn extract_cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == AUTH_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a fresh session token
pub fn session_cookie(
    token: &str,
    max_age_secs: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` value that removes the session cookie immediately
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE_NAME}=; Path=/; HttpOnly; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
