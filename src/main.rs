use std::net::SocketAddr;
use std::process::ExitCode;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use activity_board::config::AppConfig;
use activity_board::database;
use activity_board::web::{app::build_router, state::AppState};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(database_url = %config.database_url, "connecting to database");
    let pool = match database::connect(&config.database_url).await {
        Ok(p) => p,
        Err(e) => {
            error!("Cannot open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let app = build_router(AppState::new(pool, &config));

    let listener = match bind(&config).await {
        Ok(l) => l,
        Err(e) => {
            error!("Cannot bind: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match listener.local_addr() {
        Ok(addr) => info!("listening on http://{}/login", addr),
        Err(e) => warn!("cannot read bound address: {}", e),
    }

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Binds the configured port, falling back to the next one when it is taken.
async fn bind(config: &AppConfig) -> Result<TcpListener, Box<dyn std::error::Error>> {
    let addr: SocketAddr = config.socket_addr(config.port)?;
    match TcpListener::bind(addr).await {
        Ok(l) => Ok(l),
        Err(e) => {
            let fallback_port = config.port.checked_add(1).ok_or("no fallback port")?;
            let fallback = config.socket_addr(fallback_port)?;
            warn!("Could not bind {}: {}. Trying fallback {}", addr, e, fallback);
            Ok(TcpListener::bind(fallback).await?)
        }
    }
}
