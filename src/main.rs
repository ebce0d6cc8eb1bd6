use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use flowerboard::config::ServerConfig;
use flowerboard::message::ErrorCode;
use flowerboard::{routes, state};

const DEFAULT_LOG_FILTER: &str = "flowerboard=info,tower_http=info";

#[tokio::main]
async fn main() {
    // A missing .env is fine; real env vars still apply.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .init();

    if let Err(e) = dotenv {
        debug!(error = %e, ".env not loaded");
    }

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(code = e.error_code(), error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr();
    let app = routes::app(state::AppState::new(config));

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%addr, "flowerboard listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
