//! PlateFinder API — library crate.
//!
//! Exposes the application modules to the binary in `main.rs` and to the
//! integration tests in `tests/`.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod poi;
pub mod store;

use auth::service::CredentialService;
use auth::token::TokenService;
use poi::overpass::OverpassClient;
use store::postgres::PgStore;

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub db: PgStore,
    pub tokens: TokenService,
    pub auth: CredentialService,
    pub poi: OverpassClient,
    pub config: config::Config,
}

impl AppState {
    pub fn new(db: PgStore, config: config::Config) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.jwt_expiry_secs);
        let auth = CredentialService::new(db.clone(), tokens.clone());
        let poi = OverpassClient::new(&config.overpass_url);
        Self {
            db,
            tokens,
            auth,
            poi,
            config,
        }
    }
}
