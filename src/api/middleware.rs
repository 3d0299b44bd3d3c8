//! Bearer-token authentication for handlers and the admin subtree.

use crate::error::ApiError;
use crate::models::{Role, User};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Raw `Authorization` header value, if present and valid UTF-8.
#[must_use]
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
}

/// Resolves the bearer token in `headers` to a user.
///
/// # Errors
/// Returns `ApiError::Unauthorized` when the header is missing or the token
/// does not resolve.
pub fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = authorization_header(headers)
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
    state
        .sessions
        .resolve(token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))
}

/// Resolves the bearer token and requires the admin role.
///
/// # Errors
/// Returns `ApiError::Unauthorized` without a valid token and
/// `ApiError::Forbidden` for non-admin users.
pub fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let user = resolve_user(state, headers)?;
    if user.role != Role::Admin {
        return Err(ApiError::Forbidden("Admin role required".to_string()));
    }
    Ok(user)
}

/// The authenticated user of a request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(state, &parts.headers).map(CurrentUser)
    }
}

/// Guards the admin subtree when `auth.protect_admin` is enabled.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.auth.protect_admin {
        return next.run(request).await;
    }

    match authorize_admin(&state, request.headers()) {
        Ok(user) => {
            debug!(username = %user.username, path = %request.uri().path(), "Admin access");
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}
