use crate::config::Settings;
use crate::forwarder::{Forwarder, HttpTransport, UpstreamConfig};
use crate::proxy::headers::paths;
use crate::proxy::RelayService;
use crate::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// Main application struct that coordinates all components
#[derive(Debug)]
pub struct Application {
    settings: Settings,
    service: RelayService,
}

impl Application {
    #[instrument(skip_all)]
    pub fn new(settings: Settings) -> Result<Self> {
        let upstream = UpstreamConfig::from_settings(&settings.upstream);
        if upstream.is_complete() {
            info!(
                deployment = %upstream.deployment_name,
                api_version = %upstream.api_version,
                "Upstream configured"
            );
        } else {
            warn!("Azure OpenAI endpoint or API key is missing; chat routes will fail until configured");
        }

        let transport = HttpTransport::new()?;
        let forwarder = Forwarder::new(Arc::new(transport), settings.upstream.timeout());

        Ok(Self {
            settings,
            service: RelayService::new(upstream, forwarder),
        })
    }

    pub fn router(&self) -> Router {
        self.service.clone().into_router()
    }

    #[instrument(skip(self))]
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.settings.listen_address()).await?;
        let port = listener.local_addr()?.port();

        info!("Server running on http://localhost:{port}");
        info!(
            "Health check available at http://localhost:{port}{}",
            paths::HEALTH
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn upstream(&self) -> &UpstreamConfig {
        self.service.upstream()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;

    #[tokio::test]
    async fn test_application_starts_without_upstream() {
        let settings = Settings::from_vars(Map::new()).unwrap();
        let app = Application::new(settings).unwrap();

        assert!(!app.upstream().is_complete());
        assert_eq!(app.settings().server.port, 5000);
    }

    #[tokio::test]
    async fn test_application_builds_upstream_from_settings() {
        let vars = [
            ("AZURE_OPENAI_ENDPOINT", "https://milo.openai.azure.com"),
            ("AZURE_OPENAI_API_KEY", "secret"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let app = Application::new(Settings::from_vars(vars).unwrap()).unwrap();
        assert!(app.upstream().is_complete());
        let _router = app.router();
    }
}
