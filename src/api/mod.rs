use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::guard;
use crate::AppState;

pub mod handlers;

/// Build the application router. Registration and login are public; every
/// other route sits behind the bearer-token guard.
pub fn api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/profile", get(handlers::profile))
        .route("/users/me", get(handlers::me))
        .route("/users/:id", get(handlers::user_by_id))
        .route("/restaurants", get(handlers::find_restaurants))
        .route("/transactions", get(handlers::transaction_history))
        .route_layer(middleware::from_fn_with_state(state, guard::require_auth));

    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .merge(protected)
}
