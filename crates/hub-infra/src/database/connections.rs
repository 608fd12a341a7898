use std::time::Duration;

#[cfg(feature = "postgres")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the primary database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// Process-wide connection pool, opened once at startup and closed on shutdown.
///
/// Repositories receive a clone of the pool handle instead of reaching for a global.
#[cfg(feature = "postgres")]
pub struct DatabasePool {
    pub main: DbConn,
}

#[cfg(feature = "postgres")]
impl DatabasePool {
    /// Open the pool described by `config`.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        tracing::info!("Initializing database connection pool...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .sqlx_logging(false)
            .to_owned();

        let main = Database::connect(opts).await?;
        main.ping().await?;
        tracing::info!(pool = config.max_connections, "Database connected");

        Ok(Self { main })
    }

    /// Close every pooled connection. Repository handles cloned from this pool stop working too.
    pub async fn close(&self) -> Result<(), DbErr> {
        tracing::info!("Closing database connection pool");
        self.main.close_by_ref().await
    }
}
