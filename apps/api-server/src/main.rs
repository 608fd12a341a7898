//! # Project Hub API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer};
use tracing_actix_web::TracingLogger;

use api_server::config::AppConfig;
use api_server::handlers;
use api_server::observability::RequestIdMiddleware;
use api_server::state::AppState;
use api_server::telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Project Hub API Server on {}:{}",
        config.host,
        config.port
    );
    if let Some(origin) = &config.cors_origin {
        tracing::info!(origin = %origin, "Frontend origin configured");
    }

    let state = AppState::new(&config).await;

    #[cfg(feature = "postgres")]
    {
        if config.run_migrations {
            run_migrations(&state).await?;
        }
    }

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(|cfg| handlers::configure(cfg, &server_state))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "postgres")]
    {
        if let Some(db) = &state.db {
            if let Err(e) = db.close().await {
                tracing::error!(error = %e, "Failed to close database pool");
            }
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(feature = "postgres")]
async fn run_migrations(state: &AppState) -> std::io::Result<()> {
    use migration::{Migrator, MigratorTrait};

    let Some(db) = &state.db else {
        tracing::warn!("RUN_MIGRATIONS set but no database is connected; skipping");
        return Ok(());
    };

    Migrator::up(&db.main, None).await.map_err(|e| {
        tracing::error!(error = %e, "Database migration failed");
        std::io::Error::other(e.to_string())
    })?;

    tracing::info!("Database migrations applied");
    Ok(())
}
