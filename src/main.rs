use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use platefinder::auth::service::CredentialService;
use platefinder::auth::token::TokenService;
use platefinder::store::postgres::PgStore;
use platefinder::{api, cli, config, middleware, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "platefinder=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::User { command }) => {
            let db = PgStore::connect(&cfg.database_url).await?;
            handle_user_command(&db, &cfg, command).await
        }
        None => {
            let port = cfg.port;
            run_server(cfg, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;

    let cors_origin = cfg.cors_origin.clone();
    let state = Arc::new(AppState::new(db, cfg));

    let app = api::api_router(state.clone())
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state.clone())
        // Same bound the activity logger buffers with, so any body a
        // handler accepts can also be captured for logging.
        .layer(DefaultBodyLimit::max(
            middleware::activity_log::MAX_BODY_BYTES,
        ))
        // Outermost of the route stack: sees every request before the guard.
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::activity_log::intercept,
        ))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer({
            use axum::http::{HeaderName, Method};
            use tower_http::cors::AllowOrigin;
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(move |origin, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str == cors_origin
                        || origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                }))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([
                    HeaderName::from_static("content-type"),
                    HeaderName::from_static("authorization"),
                    HeaderName::from_static("x-request-id"),
                ])
        })
        .layer(axum::middleware::from_fn(request_id_middleware));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("PlateFinder API listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Middleware: injects a unique X-Request-Id into every response so clients
/// can correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}

async fn handle_user_command(
    db: &PgStore,
    cfg: &config::Config,
    cmd: cli::UserCommands,
) -> anyhow::Result<()> {
    match cmd {
        cli::UserCommands::Create { email, password } => {
            let tokens = TokenService::new(&cfg.jwt_secret, cfg.jwt_expiry_secs);
            let auth = CredentialService::new(db.clone(), tokens);
            match auth.register(&email, &password).await {
                Ok(user) => {
                    println!("User created:\n  ID:    {}\n  Email: {}", user.id, user.email);
                }
                Err(e) => anyhow::bail!("failed to create user: {}", e),
            }
        }
        cli::UserCommands::List => {
            let users = db.list_users().await?;
            if users.is_empty() {
                println!("No users found.");
            } else {
                println!("{:<38} {:<30} CREATED", "ID", "EMAIL");
                for u in users {
                    println!(
                        "{:<38} {:<30} {}",
                        u.id,
                        u.email,
                        u.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
    }
    Ok(())
}
