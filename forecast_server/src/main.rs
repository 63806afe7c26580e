//! Serve the latest training artifacts.
//!
//! Reads `HOST`, `PORT` and `FORECAST_ARTIFACT_DIR` (also from `.env`).

use forecast_pipeline::config::DEFAULT_ARTIFACT_DIR;
use forecast_pipeline::ArtifactStore;
use forecast_server::build_router;
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forecast_server=info,tower_http=info".into()),
        )
        .init();

    let artifact_dir =
        env::var("FORECAST_ARTIFACT_DIR").unwrap_or_else(|_| DEFAULT_ARTIFACT_DIR.to_string());
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!("Invalid HOST:PORT configuration {}:{}: {}", host, port, err);
            return ExitCode::FAILURE;
        }
    };

    let app = build_router(ArtifactStore::new(&artifact_dir));

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind {}: {}", addr, err);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "forecast_server v{} listening on {} (artifacts in {})",
        env!("CARGO_PKG_VERSION"),
        addr,
        artifact_dir
    );

    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
