use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Secret used to sign and verify bearer tokens (HS256).
    pub jwt_secret: String,
    /// Token lifetime in seconds. Set via PLATEFINDER_JWT_EXPIRY. Default: 3600.
    pub jwt_expiry_secs: i64,
    /// Overpass API endpoint used for restaurant lookups.
    pub overpass_url: String,
    /// Origin allowed by CORS in addition to localhost.
    pub cors_origin: String,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let jwt_secret =
        std::env::var("PLATEFINDER_JWT_SECRET").unwrap_or_else(|_| "CHANGE_ME_DEV_SECRET".into());

    if jwt_secret == "CHANGE_ME_DEV_SECRET" {
        let env_mode = std::env::var("PLATEFINDER_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        if env_mode == "production" {
            anyhow::bail!(
                "PLATEFINDER_JWT_SECRET is still the insecure placeholder. \
                 Set a proper secret before running in production."
            );
        }
        eprintln!("⚠️  PLATEFINDER_JWT_SECRET is not set — using insecure placeholder. Set a real secret for production.");
    }

    Ok(Config {
        port: std::env::var("PLATEFINDER_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .unwrap_or(3000),
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/platefinder".into()),
        jwt_secret,
        jwt_expiry_secs: std::env::var("PLATEFINDER_JWT_EXPIRY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600),
        overpass_url: std::env::var("OVERPASS_URL")
            .unwrap_or_else(|_| "https://overpass-api.de/api/interpreter".into()),
        cors_origin: std::env::var("PLATEFINDER_CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".into()),
    })
}
