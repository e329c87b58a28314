//! Gift Ledger Service
//!
//! Main entry point for the gift ledger backend.
//! This service provides:
//! - HTTP API for current gold prices and price history
//! - Per-owner gift revaluation against the resolved prices

use gift_ledger::config::AppConfig;
use gift_ledger::database::{create_pool, run_migrations};
use gift_ledger::error::{AppError, AppResult};
use gift_ledger::{build_router, AppState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gift_ledger={},sqlx=warn,tower_http=info", config.log_level).into()
            }),
        )
        .init();

    info!("Gift ledger service starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("HTTP port: {}", config.http_port);
    info!("Price feed: {} (timeout {}s)", config.price_feed.url, config.price_feed.timeout_secs);
    if config.price_feed.uses_demo_key() {
        warn!("COLLECTAPI_KEY not set - live prices will likely be unavailable");
    }

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created (max connections: {})", config.database.max_connections);

    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;
    info!("Database migrations completed successfully");

    // =========================================================================
    // SERVICES
    // =========================================================================
    let state = AppState::from_pool(pool, &config.price_feed)?;
    info!("✓ Price resolution, valuation and portfolio services initialized");

    // =========================================================================
    // HTTP SERVER
    // =========================================================================
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid HTTP address: {}", e)))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Message(format!("Failed to bind HTTP server: {}", e)))?;

    info!("✓ HTTP server listening on {}", addr);
    info!("Press Ctrl+C to shutdown gracefully");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received, shutting down gracefully...");
        })
        .await
        .map_err(|e| AppError::Message(format!("HTTP server error: {}", e)))?;

    info!("Gift ledger service shutdown complete");
    Ok(())
}
