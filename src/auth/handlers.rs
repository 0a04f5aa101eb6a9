//! Authentication API handlers

use crate::api::handlers::AppState;
use crate::auth::middleware::{clear_session_cookie, session_cookie, AuthUser};
use crate::auth::models::{LoginRequest, LoginResponse, MessageResponse, UserPublic};
use crate::core::error::{DashboardError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// Handler for POST /api/auth/login - User login
///
/// Unknown identifiers and wrong passwords produce the same response.
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Unreadable login body");
        DashboardError::BadRequest("Invalid request body".to_string())
    })?;

    if req.username.is_empty() || req.password.is_empty() {
        return Err(DashboardError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    tracing::info!(username = %req.username, "Login attempt");

    let user = state.store.get_user_by_identifier(&req.username).ok();

    // bcrypt verification must not run on the async workers. Unknown
    // identities verify against the decoy hash so both paths cost the same.
    let store = Arc::clone(&state.store);
    let candidate_user = user.clone();
    let password = req.password;
    let is_valid = tokio::task::spawn_blocking(move || match candidate_user {
        Some(user) => store.verify_password(&user, &password),
        None => store.verify_unknown_identity(&password),
    })
    .await
    .map_err(|e| DashboardError::Internal(format!("Password verification task failed: {}", e)))?;

    let user = match user {
        Some(user) if is_valid => user,
        Some(_) => {
            tracing::warn!(username = %req.username, "Invalid password");
            return Err(DashboardError::InvalidCredentials);
        }
        None => {
            tracing::warn!(username = %req.username, "Login for unknown identity");
            return Err(DashboardError::InvalidCredentials);
        }
    };

    let token = state.tokens.issue_token(&user)?;
    let cookie = session_cookie(&token, state.tokens.ttl().num_seconds(), state.secure_cookies)
        .map_err(|e| DashboardError::Internal(format!("Failed to build session cookie: {}", e)))?;

    tracing::info!(user_id = user.id, username = %user.username, "Login successful");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token,
            user: user.public(),
        }),
    ))
}

/// Handler for POST /api/auth/logout - Clear the session cookie
///
/// Tokens are stateless, so an already-issued token stays valid until it expires.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    match clear_session_cookie(state.secure_cookies) {
        Ok(cookie) => {
            headers.insert(header::SET_COOKIE, cookie);
        }
        Err(e) => tracing::error!(error = %e, "Failed to build clearing cookie"),
    }

    (
        headers,
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// Handler for GET /api/auth/me - Get current user info
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserPublic>> {
    tracing::debug!(user_id = user.user_id, "Getting current user info");

    let record = state.store.get_user_by_identifier(&user.username)?;

    Ok(Json(record.public()))
}

/// Fallback for auth endpoints hit with the wrong method
pub async fn method_not_allowed() -> DashboardError {
    DashboardError::MethodNotAllowed
}
