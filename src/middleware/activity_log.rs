//! Activity-logging interceptor.
//!
//! Applied to the whole router, outermost, so it sees every request before
//! the auth guard runs. Per request it resolves an identity (from the
//! bearer token, or for login from the response), classifies the request,
//! and hands a record to the recorder. Logging is best-effort throughout:
//! no failure here may fail or delay the primary request, with the single
//! deliberate exception of the awaited insert on `/transactions` (so a
//! history view shows up in its own response).
//!
//! Skip rule: `/users/me` is never logged — the profile lookup is issued
//! internally by clients after most actions and logging it would double
//! every entry.

use std::sync::Arc;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::guard::bearer_token;
use crate::auth::token::TokenService;
use crate::middleware::{classify, recorder};
use crate::models::activity::{ActivityType, NewActivity};
use crate::AppState;

/// Upper bound on request bodies, shared with the router's
/// `DefaultBodyLimit` so any body a handler would accept can also be
/// buffered here. Bodies that declare a larger length are forwarded
/// unbuffered (and unrecorded) for the limit layer to reject.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// True unless the declared Content-Length exceeds the capture cap.
fn body_within_limit(headers: &HeaderMap) -> bool {
    match headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
    {
        Some(len) => len <= MAX_BODY_BYTES,
        None => true,
    }
}

pub async fn intercept(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();

    let is_history = path.starts_with("/transactions");
    if path.contains("/users/me") && !is_history {
        tracing::debug!(%path, "skipping activity logging");
        return next.run(req).await;
    }

    if path.contains("/auth/login") {
        return capture_login(state, req, next, path).await;
    }

    if is_history {
        return record_history_view(state, req, next, path).await;
    }

    record_standard(state, req, next, path).await
}

/// Login carries no bearer token, so identity is only known once the
/// handler has answered. Forward the request, buffer the response, and if
/// it is a success whose body contains a token, attribute the login to that
/// token's subject. The response bytes are forwarded unchanged either way.
async fn capture_login(
    state: Arc<AppState>,
    req: Request,
    next: Next,
    path: String,
) -> Response {
    let method = req.method().clone();
    let query = classify::query_map(req.uri());

    let (req, body_json) = if body_within_limit(req.headers()) {
        let (parts, body) = req.into_parts();
        let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to buffer login request body: {}", e);
                Bytes::new()
            }
        };
        let json: Option<Value> = serde_json::from_slice(&bytes).ok();
        (Request::from_parts(parts, Body::from(bytes)), json)
    } else {
        tracing::debug!("login body exceeds capture limit, forwarding unbuffered");
        (req, None)
    };
    let email = body_json
        .as_ref()
        .and_then(|b| b.get("email"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    let resp = next.run(req).await;

    if resp.status() != StatusCode::OK && resp.status() != StatusCode::CREATED {
        return resp;
    }

    let (resp_parts, resp_body) = resp.into_parts();
    let resp_bytes = match to_bytes(resp_body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to buffer login response body: {}", e);
            return Response::from_parts(resp_parts, Body::empty());
        }
    };

    if let Some(user_id) = login_subject(&state.tokens, &resp_bytes) {
        let params = classify::sanitized_params(&method, &query, body_json.as_ref());
        recorder::log_async(
            state.db.clone(),
            NewActivity {
                user_id,
                kind: ActivityType::Auth,
                endpoint: path,
                params,
                description: format!("User login: {}", email),
            },
        );
    } else {
        tracing::debug!("login response carried no decodable token, not recording");
    }

    Response::from_parts(resp_parts, Body::from(resp_bytes))
}

/// Pull the subject out of a successful login response body. The token is
/// decoded without signature verification — attribution only.
fn login_subject(tokens: &TokenService, body: &[u8]) -> Option<Uuid> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let token = json.get("data")?.get("token")?.as_str()?;
    tokens.decode_unverified(token)?.user_id()
}

/// `/transactions` is recorded with an awaited insert before the handler
/// runs, so the listing a user gets back already includes this view. Minimal
/// params keep the entry from quoting its own output.
async fn record_history_view(
    state: Arc<AppState>,
    req: Request,
    next: Next,
    path: String,
) -> Response {
    let user_id = bearer_token(req.headers())
        .and_then(|t| state.tokens.decode_unverified(t))
        .and_then(|c| c.user_id());

    match user_id {
        Some(user_id) => {
            recorder::log_sync(
                &state.db,
                NewActivity {
                    user_id,
                    kind: ActivityType::Transaction,
                    endpoint: path,
                    params: "{}".to_string(),
                    description: "Viewed transaction history".to_string(),
                },
            )
            .await;
        }
        None => tracing::debug!("no attributable token on history view, not recording"),
    }

    next.run(req).await
}

/// Every other route: attribute via the bearer token if one decodes,
/// classify, record asynchronously, and forward regardless of outcome.
async fn record_standard(
    state: Arc<AppState>,
    req: Request,
    next: Next,
    path: String,
) -> Response {
    let user_id = bearer_token(req.headers())
        .and_then(|t| state.tokens.decode_unverified(t))
        .and_then(|c| c.user_id());

    let Some(user_id) = user_id else {
        tracing::debug!("no attributable token, skipping activity logging");
        return next.run(req).await;
    };

    let method = req.method().clone();
    let query = classify::query_map(req.uri());

    let (req, body_json) = if method == Method::GET || !body_within_limit(req.headers()) {
        (req, None)
    } else {
        let (parts, body) = req.into_parts();
        match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => {
                let json = serde_json::from_slice(&bytes).ok();
                (Request::from_parts(parts, Body::from(bytes)), json)
            }
            Err(e) => {
                tracing::warn!("failed to buffer request body for logging: {}", e);
                (Request::from_parts(parts, Body::empty()), None)
            }
        }
    };

    let classification = classify::classify(&method, &path, &query);
    let params = classify::sanitized_params(&method, &query, body_json.as_ref());

    recorder::log_async(
        state.db.clone(),
        NewActivity {
            user_id,
            kind: classification.kind,
            endpoint: path,
            params,
            description: classification.description,
        },
    );

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_body_within_limit_checks_content_length() {
        let mut headers = HeaderMap::new();
        // No declared length: buffer and let `to_bytes` enforce the cap.
        assert!(body_within_limit(&headers));

        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("1024"));
        assert!(body_within_limit(&headers));

        let over = (MAX_BODY_BYTES + 1).to_string();
        headers.insert(
            header::CONTENT_LENGTH,
            HeaderValue::from_str(&over).unwrap(),
        );
        assert!(!body_within_limit(&headers));
    }

    #[test]
    fn test_login_subject_reads_data_token() {
        let tokens = TokenService::new("capture-secret", 3600);
        let id = Uuid::new_v4();
        let token = tokens.issue(id, "alice@example.com").unwrap();

        let body = json!({
            "success": true,
            "message": "Login successful",
            "data": { "token": token, "user": { "id": id, "email": "alice@example.com" } }
        });
        assert_eq!(
            login_subject(&tokens, body.to_string().as_bytes()),
            Some(id)
        );
    }

    #[test]
    fn test_login_subject_ignores_tokenless_bodies() {
        let tokens = TokenService::new("capture-secret", 3600);
        assert_eq!(
            login_subject(&tokens, br#"{"success":true,"data":{}}"#),
            None
        );
        assert_eq!(login_subject(&tokens, br#"{"success":false}"#), None);
        assert_eq!(login_subject(&tokens, b"not json"), None);
        assert_eq!(
            login_subject(&tokens, br#"{"data":{"token":"not-a-jwt"}}"#),
            None
        );
    }
}
