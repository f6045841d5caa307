use std::future::Future;
use std::net::SocketAddr;

use tally_protocol::HealthStatus;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::service::QueryService;

/// tally query server.
pub struct TallyServer {
    config: ServerConfig,
    service: QueryService,
}

impl TallyServer {
    /// Build the server, constructing the configured store. Fails only on
    /// misconfiguration; nothing is contacted yet.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let service = QueryService::from_config(&config)?;
        Ok(Self { config, service })
    }

    /// Use an already-built service (tests, embedding).
    pub fn with_service(config: ServerConfig, service: QueryService) -> Self {
        Self { config, service }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &QueryService {
        &self.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.service.clone())
    }

    /// Serve until the process is killed.
    pub async fn serve(self) -> ServerResult<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = listener.local_addr()?;
        info!(
            %addr,
            bucket = %self.config.corpus.bucket,
            prefix = %self.config.corpus.prefix,
            "tally server listening"
        );
        let service = self.service.clone();
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                service.set_health(HealthStatus::NotServing);
                info!("tally server shutting down");
            })
            .await
            .map_err(ServerError::Io)
    }
}
