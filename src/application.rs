use crate::config::Settings;
use crate::pipeline::{DirectorySink, GatewaySession};
use crate::proxy::{self, BackendClient, ProxyError};
use crate::{Error, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument};

/// Main application struct that coordinates all components
pub struct Application {
    settings: Settings,
    client: Arc<BackendClient>,
}

impl Application {
    #[instrument(skip(settings))]
    pub fn new(settings: Settings) -> Result<Self> {
        let client = BackendClient::from_settings(&settings.backend).map_err(|e| match e {
            ProxyError::InvalidRequest(message) => Error::invalid_config(message),
            other => Error::Proxy(other),
        })?;

        info!(
            backend = %client.base_url(),
            timeout_ms = settings.backend.request_timeout_ms,
            "Backend client ready"
        );

        Ok(Self {
            settings,
            client: Arc::new(client),
        })
    }

    /// The inbound gateway with its middleware stack
    pub fn router(&self) -> Router {
        proxy::gateway(self.client.clone(), self.settings.backend.max_request_bytes)
    }

    /// A pipeline session for one console user
    pub fn session(&self, credential: Option<crate::domain::types::Credential>) -> GatewaySession {
        GatewaySession::new(self.client.clone(), credential)
    }

    /// Sink writing exports into the configured download directory
    pub fn download_sink(&self) -> DirectorySink {
        DirectorySink::new(self.settings.exports.download_dir.clone())
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let address = self.settings.bind_address();
        let listener = TcpListener::bind(&address).await?;
        info!(address = %address, "Sales console gateway listening");

        axum::serve(listener, self.router()).await?;
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }
}
