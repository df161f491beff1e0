//! HTTP prediction service
//!
//! Exposes `POST /predict`, `GET /health` and `POST /reload` over a shared
//! [`ModelSlot`](crate::predict::ModelSlot).

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ApiError;
pub use state::AppState;

use crate::core::{OncoError, Result};
use crate::predict::ModelSlot;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Artifact served and re-read on `/reload`
    pub model_path: PathBuf,
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("ONCOFOREST_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("ONCOFOREST_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            model_path: std::env::var("ONCOFOREST_MODEL")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cancer_detection.bin")),
            request_timeout: Duration::from_secs(2),
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                OncoError::InvalidParameter(format!(
                    "Invalid listen address {}:{}: {}",
                    self.host, self.port, e
                ))
            })
    }
}

/// Load the model and serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = config.addr()?;

    let slot = ModelSlot::load(&config.model_path);
    if slot.is_loaded() {
        info!("Model loaded successfully from {}", config.model_path.display());
    } else {
        warn!("Serving without a model; /predict will fail until /reload succeeds");
    }

    let state = Arc::new(AppState::new(config.clone(), slot));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Prediction service listening on http://{} (timeout {:?})",
        addr, config.request_timeout
    );

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received, stopping server gracefully");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
