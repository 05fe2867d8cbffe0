//! Product catalog server.
//!
//! Run from repo root: `cargo run -p catalog-server`. Configuration comes from the environment
//! (a `.env` file is honoured); see `product_catalog::Config`.

use product_catalog::{app_router, AppState, Config, API_PREFIX};
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("product_catalog=info,catalog_server=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(env = ?config.app_env, schema = %config.db_schema, "configuration loaded");

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    let addr = format!("{}:{}", config.bind_addr, config.port);
    let app = app_router(AppState::new(pool, config));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("catalog listening on http://{}{}", listener.local_addr()?, API_PREFIX);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
