//! Application configuration loaded from environment variables.

use std::env;

use hub_infra::{DatabaseConfig, JwtConfig, RateLimitConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    /// Frontend origin; informational only.
    pub cors_origin: Option<String>,
    pub run_migrations: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let mut config = DatabaseConfig::new(url);
            if let Some(max) = parse_var("DB_MAX_CONNECTIONS") {
                config.max_connections = max;
            }
            if let Some(min) = parse_var("DB_MIN_CONNECTIONS") {
                config.min_connections = min;
            }
            config
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(5000),
            database,
            jwt: JwtConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            cors_origin: env::var("CORS_ORIGIN")
                .or_else(|_| env::var("FRONTEND_URL"))
                .ok(),
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
