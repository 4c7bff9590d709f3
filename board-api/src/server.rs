//! Server setup and lifecycle for the board API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;

use config::AppConfig;

use crate::error::{Result, ServerError};
use crate::routes::create_router;
use crate::state::AppState;

/// The board API server.
pub struct BoardApiServer {
    state: Arc<AppState>,
}

impl BoardApiServer {
    /// Creates a new server instance with the given configuration.
    pub fn new(config: AppConfig) -> Result<Self> {
        let state = Arc::new(AppState::new(config)?);
        Ok(Self { state })
    }

    /// Creates a server instance from an existing `AppState`.
    pub fn with_state(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Runs the HTTP server.
    ///
    /// Blocks until the server is shut down (Ctrl+C or SIGTERM).
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = format!(
            "{}:{}",
            self.state.config.server.host, self.state.config.server.port
        )
        .parse()
        .map_err(|e| ServerError::Configuration(format!("Invalid address: {e}")))?;

        let router = create_router(self.state.clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind to {addr}: {e}")))?;

        tracing::info!(%addr, backend = %self.state.config.storage.backend, "board API starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {e}")))?;

        tracing::info!("board API stopped");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

/// Signal handler for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        () = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        },
    }
}

/// Entry point for running the server from configuration.
pub async fn run_server(config: AppConfig) -> Result<()> {
    let server = BoardApiServer::new(config)?;
    server.run().await
}

/// Entry point for containerized deployments: configuration from the
/// environment (plus an optional `CF_CONFIG_FILE` TOML file), tracing to
/// stdout.
pub async fn run_from_env() -> Result<()> {
    let file = std::env::var("CF_CONFIG_FILE").ok();
    let config = config::load(file.as_deref().map(std::path::Path::new))
        .map_err(|e| ServerError::Configuration(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.observability.log_filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    run_server(config).await
}
