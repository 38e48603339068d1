//! Worker server

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use super::router::{AppState, create_router};
use crate::config::Config;
use crate::oauth::OAuthClient;
use crate::operation::OperationRegistry;
use crate::{Error, Result};

/// OAuth exchange worker server
pub struct Worker {
    /// Configuration
    config: Config,
    /// Operation table
    registry: Arc<OperationRegistry>,
}

impl Worker {
    /// Create a new worker from loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let oauth = OAuthClient::from_config(&config.http, Arc::new(config.oauth.clone()))?;
        let registry = Arc::new(OperationRegistry::with_defaults(Arc::new(oauth)));
        Ok(Self { config, registry })
    }

    /// Operation table served by this worker
    #[must_use]
    pub fn registry(&self) -> Arc<OperationRegistry> {
        Arc::clone(&self.registry)
    }

    /// Run the worker until Ctrl+C or SIGTERM
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let state = Arc::new(AppState {
            registry: Arc::clone(&self.registry),
            request_timeout: self.config.server.request_timeout,
        });
        let app = create_router(state, self.config.server.max_body_size);

        let listener = TcpListener::bind(addr).await?;

        info!(host = %self.config.server.host, port = %self.config.server.port, "Listening");
        for signature in self.registry.signatures() {
            info!(operation = %signature, "Operation registered");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
