//! Application state - shared across all handlers.

use std::sync::Arc;

use hub_core::ports::{PasswordService, PostRepository, RateLimiter, TokenService, UserRepository};
use hub_infra::{
    Argon2PasswordService, InMemoryRateLimiter, InMemoryStore, JwtConfig, JwtTokenService,
    RateLimitConfig,
};

#[cfg(feature = "postgres")]
use hub_infra::DatabasePool;
#[cfg(feature = "postgres")]
use hub_infra::database::{PostgresPostRepository, PostgresUserRepository};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    #[cfg(feature = "postgres")]
    pub db: Option<Arc<DatabasePool>>,
}

impl AppState {
    /// Build the state from configuration, falling back to the in-memory
    /// store when no database is configured or reachable.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabasePool::init(db_config).await {
                    Ok(pool) => {
                        let pool = Arc::new(pool);
                        tracing::info!("Application state initialized (postgres)");
                        return Self {
                            users: Arc::new(PostgresUserRepository::new(pool.main.clone())),
                            posts: Arc::new(PostgresPostRepository::new(pool.main.clone())),
                            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
                            passwords: Arc::new(Argon2PasswordService::new()),
                            rate_limiter: Arc::new(InMemoryRateLimiter::new(
                                config.rate_limit.clone(),
                            )),
                            db: Some(pool),
                        };
                    }
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            "Failed to connect to database. Using in-memory fallback."
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory store");

        let state = Self::in_memory(config.jwt.clone(), config.rate_limit.clone());
        tracing::info!("Application state initialized (in-memory)");
        state
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(jwt: JwtConfig, rate_limit: RateLimitConfig) -> Self {
        let store = InMemoryStore::new();

        Self {
            users: Arc::new(store.users()),
            posts: Arc::new(store.posts()),
            tokens: Arc::new(JwtTokenService::new(jwt)),
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: Arc::new(InMemoryRateLimiter::new(rate_limit)),
            #[cfg(feature = "postgres")]
            db: None,
        }
    }
}
