//! Entry point: load config, wire the gateway, serve, and close the pool on shutdown.

use pgdemo::config::Config;
use pgdemo::{create_app, shutdown_signal, AppError, AppState, Gateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(AppError::from)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        host = %config.database.host,
        port = config.database.port,
        database = %config.database.name,
        ssl = config.database.ssl,
        max_connections = config.database.max_connections,
        "configured database pool"
    );
    let gateway = Gateway::from_config(&config.database);
    let app = create_app(AppState::new(gateway.clone()));

    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    tracing::info!(addr = %config.server_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Server has drained; release the pool before exiting.
    gateway.shutdown().await;
    tracing::info!("shutdown complete");
    Ok(())
}
