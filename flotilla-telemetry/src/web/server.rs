use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use axum::Router;
use tower_http::services::ServeDir;

use super::fleet_page::{self, AppState};
use crate::config::CONFIG;

use anyhow::{Context, Result};

pub struct WebServer {
    state: AppState,
    running: Arc<AtomicBool>,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        // For development, first try the flotilla-telemetry/static directory
        let static_dir = if cfg!(debug_assertions) {
            let workspace_root = std::env::current_dir()?;

            let telemetry_static = workspace_root.join("flotilla-telemetry").join("static");
            if telemetry_static.exists() {
                telemetry_static
            } else {
                // Fallback to executable directory
                std::env::current_exe()?
                    .parent()
                    .context("Failed to get executable directory")?
                    .join("static")
            }
        } else {
            // Production: use executable adjacent path
            std::env::current_exe()?
                .parent()
                .context("Failed to get executable directory")?
                .join("static")
        };

        tracing::debug!("Static directory path: {:?}", static_dir);
        if !static_dir.exists() {
            tracing::warn!("Static directory does not exist at {:?}", static_dir);
        }

        let app = Router::new()
            .merge(fleet_page::routes(self.state.clone()))
            .nest_service("/static", ServeDir::new(&static_dir));

        self.running.store(true, Ordering::SeqCst);

        let host = CONFIG.web.host.clone();
        let port = CONFIG.web.port;
        tracing::info!("Starting web server on http://{}:{}", host, port);

        let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
            .await
            .context(format!("Failed to bind to port {}", port))?;

        axum::serve(listener, app)
            .await
            .context("Failed to serve")?;

        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
