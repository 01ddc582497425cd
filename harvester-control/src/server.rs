//! The control-surface HTTP server.

use std::time::Duration;

use axum::Router;
use harvester_common::Signal;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;

use crate::state::ControlState;

#[derive(Debug, thiserror::Error)]
pub enum ControlServerError {
    #[error("failed to bind control server to {address}: {source}")]
    BindError {
        address: String,
        source: std::io::Error,
    },

    #[error("control server error: {0}")]
    ServerError(String),
}

pub struct ControlServer {
    listener: TcpListener,
    router: Router,
}

impl ControlServer {
    /// # Errors
    /// Returns an error if binding to `listen_address` fails.
    pub async fn new(
        listen_address: &str,
        state: ControlState,
    ) -> Result<Self, ControlServerError> {
        let listener =
            TcpListener::bind(listen_address)
                .await
                .map_err(|e| ControlServerError::BindError {
                    address: listen_address.to_string(),
                    source: e,
                })?;

        tracing::info!(address = listen_address, "Control server bound successfully");

        let router = crate::routes::router(state).layer(TimeoutLayer::new(Duration::from_secs(30)));

        Ok(Self { listener, router })
    }

    /// # Errors
    /// Returns an error if the server encounters a runtime error.
    pub async fn serve(
        self,
        mut shutdown: tokio::sync::broadcast::Receiver<Signal>,
    ) -> Result<(), ControlServerError> {
        tracing::info!("Control server starting");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Control server received shutdown signal");
            })
            .await
            .map_err(|e| ControlServerError::ServerError(e.to_string()))?;

        tracing::info!("Control server stopped");
        Ok(())
    }
}
