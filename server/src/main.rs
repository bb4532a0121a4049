use tracing::info;
use tracing_subscriber::EnvFilter;

use ops_dashboard_server::backend::{self, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    info!("Setting up backend");
    let state = backend::initialize_backend(&config)?;
    let app = backend::create_router(state, &config.cors_origin)?;

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
