//! Feature development server
//!
//! Serves the `/template-features` REST surface from memory so the client
//! can be exercised without a real backend. Records are lost on restart.
//!
//! # Configuration
//!
//! Environment variables:
//! - `FEATURE_SERVER_PORT`: Port to listen on (default: 8080)
//! - `FEATURE_SERVER_API_KEY`: Bearer key required on feature routes
//!   (default: none, all requests accepted)
//!
//! # Endpoints
//!
//! - `GET /health`: Health check endpoint (no auth required)
//! - `GET|POST /template-features`
//! - `GET /template-features/search?q=&limit=`
//! - `GET|PUT|DELETE /template-features/{id}`

use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feature_sync::server::{router, ServerState};

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    /// Port to listen on
    port: u16,
    /// Required bearer key, if any
    api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("FEATURE_SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let api_key = std::env::var("FEATURE_SERVER_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());

        Self { port, api_key }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feature_server=info,feature_sync=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let mut state = ServerState::new();
    match config.api_key {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            state = state.with_api_key(key);
        }
        None => tracing::warn!("No API key configured - feature routes are open"),
    }

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
