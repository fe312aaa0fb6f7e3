mod config;
mod error;
mod service;

use config::ServerConfig;
use kvttl_core::{Store, StoreConfig};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvttl_server=info,kvttl_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let store: service::SharedStore = Store::with_config(
        StoreConfig::default().with_sweep_interval(config.sweep_interval),
    );

    let listener = TcpListener::bind(config.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("kvttl HTTP server listening on {}", local_addr);
    tracing::info!("   Sweep interval: {:?}", config.sweep_interval);

    axum::serve(listener, service::router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("kvttl HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
