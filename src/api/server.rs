//! Stockledger API Server implementation
//!
//! HTTP REST API server using Axum for the inventory dashboard.
//! Provides endpoints for validate, ingest, upload and per-party stock listing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::ledger::{AccountsFile, InMemoryLedger};

/// Largest workbook accepted by the upload endpoint
pub const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

/// API Server configuration
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Accounts file (YAML) that uploads are booked against
    pub accounts: Option<PathBuf>,
    /// Reject sheets with more rows than this before ingesting them
    pub max_rows: Option<usize>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            accounts: None,
            max_rows: None,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub ledger: Arc<InMemoryLedger>,
    pub max_rows: Option<usize>,
}

impl AppState {
    pub fn new(ledger: InMemoryLedger, max_rows: Option<usize>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            ledger: Arc::new(ledger),
            max_rows,
        }
    }
}

/// Build the router with all endpoints and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/validate", post(handlers::validate))
        .route("/api/v1/ingest", post(handlers::ingest))
        .route("/api/v1/upload", post(handlers::upload))
        .route(
            "/api/v1/parties/:party_id/stocks",
            get(handlers::party_stocks),
        )
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "stockledger_server=info,stockledger=info,tower_http=info".into()
            }),
        )
        .init();

    let ledger = match &config.accounts {
        Some(path) => {
            let accounts = AccountsFile::load(path)?;
            info!(
                "Loaded {} accounts from {}",
                accounts.accounts.len(),
                path.display()
            );
            InMemoryLedger::with_accounts(accounts.accounts)
        }
        None => {
            info!("No accounts file configured; uploads will store nothing");
            InMemoryLedger::new()
        }
    };

    let state = Arc::new(AppState::new(ledger, config.max_rows));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("📦 Stockledger API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/validate, /api/v1/ingest, /api/v1/upload, /api/v1/parties/:party_id/stocks");
    info!("   Health: /health, Version: /version");
    if let Some(max_rows) = config.max_rows {
        info!("   Row limit: {}", max_rows);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Stockledger API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}
