//! Route guard for authenticated endpoints.
//!
//! Verifies the bearer token (signature + expiry), rejects revoked tokens,
//! and loads the user row so handlers get a `CurrentUser` that is known to
//! exist. Authorization always runs on the verified path — the unverified
//! decode in the activity logger is for attribution only.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::errors::AppError;
use crate::AppState;

/// Authenticated user attached to the request by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

/// Raw bearer token attached to the request, used by logout.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Extract the token from an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers()).ok_or(AppError::TokenInvalid)?;

    let claims = state.tokens.verify(token)?;
    if !state.tokens.is_valid(token) {
        tracing::debug!("rejected revoked token");
        return Err(AppError::TokenInvalid);
    }

    let user_id = claims.user_id().ok_or(AppError::TokenInvalid)?;
    let user = state
        .db
        .find_user_by_id(user_id)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    let token = token.to_string();
    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
    });
    req.extensions_mut().insert(BearerToken(token));

    Ok(next.run(req).await)
}
