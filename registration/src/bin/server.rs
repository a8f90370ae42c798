//! Registration server.
//!
//! This binary:
//! - Connects to `PostgreSQL` and applies migrations
//! - Optionally exposes Prometheus metrics
//! - Serves the registration API until Ctrl+C
//!
//! # Usage
//!
//! ```bash
//! docker compose up -d
//! cargo run --bin server
//! ```

use anyhow::Context;
use fest_admission_postgres::PostgresRegistrationStore;
use fest_registration::{Config, build_router, build_state, metrics};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fest_registration=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting registration server...");

    let config = Config::from_env();
    tracing::info!(
        mode = %config.admission.mode,
        overall = config.capacity.overall,
        mail = ?config.mail.transport,
        "Configuration loaded"
    );

    if config.server.metrics_enabled {
        let addr: SocketAddr = format!("{}:{}", config.server.metrics_host, config.server.metrics_port)
            .parse()
            .context("invalid metrics address")?;
        metrics::install_prometheus_exporter(addr)?;
    }

    let store = PostgresRegistrationStore::connect(&config.postgres.url, &config.pool_settings())
        .await
        .context("failed to connect to PostgreSQL")?;
    store.migrate().await.context("failed to run migrations")?;
    tracing::info!("✓ Registration store ready");

    let state = build_state(&config, Arc::new(store))?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Registration server listening");
    tracing::info!("Press Ctrl+C to shutdown");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .into_future(),
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down gracefully...");
    let _ = shutdown_tx.send(());

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!(
            timeout_secs = config.server.shutdown_timeout,
            "In-flight requests did not finish before the shutdown timeout"
        ),
    }

    Ok(())
}
