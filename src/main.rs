use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kpi_dashboard_api::auth::{spawn_purge_task, TokenAuthority};
use kpi_dashboard_api::config;
use kpi_dashboard_api::database::DatabaseManager;
use kpi_dashboard_api::insights::AnalyticsClient;
use kpi_dashboard_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    info!("Starting KPI Dashboard API in {:?} mode", config.environment);

    let tokens = TokenAuthority::new(config.security.jwt_secret.clone(), config.security.jwt_expiry_hours)
        .context("JWT_SECRET must be set and SECURITY_JWT_EXPIRY_HOURS at most 87600")?;
    let analytics = AnalyticsClient::new(
        &config.analytics.base_url,
        Duration::from_secs(config.analytics.timeout_secs),
    )?;

    let database = match config.database.url {
        Some(_) => {
            let db = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            db.bootstrap_schema().await?;
            Some(db)
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            None
        }
    };
    let state = match &database {
        Some(db) => AppState::postgres(db.pool().clone(), tokens, analytics),
        None => AppState::in_memory(tokens, analytics),
    };
    let state = Arc::new(state);

    spawn_purge_task(
        state.revocations.clone(),
        Duration::from_secs(config.security.revocation_purge_interval_secs),
    );

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("KPI Dashboard API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
