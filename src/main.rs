use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use burhani_guards_api::auth::TokenAuthority;
use burhani_guards_api::database::Database;
use burhani_guards_api::{app, config, AppState};

#[derive(Parser)]
#[command(name = "burhani-guards-api")]
#[command(about = "Burhani Guards API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Bind address (overrides API_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Bind port (overrides API_PORT / PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the config singleton is first read
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Burhani Guards API in {:?} mode", config.environment);

    let database = Database::connect_lazy(&config.database).context("failed to configure database pool")?;
    let tokens = TokenAuthority::with_system_clock(&config.auth).context("failed to initialise token authority")?;

    let bind_addr = format!("{}:{}", config.api.host, config.api.port);
    let config = Arc::new(config);
    let state = AppState::new(config.clone(), Arc::new(tokens), Arc::new(database.clone()));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!(
        "Burhani Guards API listening on http://{}{}",
        bind_addr,
        config.api.base_path
    );

    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    tracing::info!("Application shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
