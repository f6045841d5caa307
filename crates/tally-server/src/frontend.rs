use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tally_protocol::{
    endpoints, ErrorBody, ErrorKind, HealthResponse, HttpQueryClient, MatchCountRequest,
    MatchCountResponse, ProtocolError, QueryClient,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::FrontendConfig;
use crate::error::{ServerError, ServerResult};

/// Shared state of the frontend proxy.
#[derive(Clone)]
pub struct FrontendState {
    client: Arc<dyn QueryClient>,
}

impl FrontendState {
    pub fn new(client: Arc<dyn QueryClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct FrontendQuery {
    q: Option<String>,
}

/// A backend failure as the proxy reports it to its own caller.
///
/// Application errors keep the backend's kind and status; a backend that
/// could not be reached becomes `upstream` (504 on timeout, 502 otherwise).
struct ProxyError(ProtocolError);

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            ProtocolError::Remote {
                kind,
                status,
                message,
            } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                ErrorBody::new(kind, message),
            ),
            ProtocolError::Timeout(limit) => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorBody::new(
                    ErrorKind::Upstream,
                    format!("backend timed out after {limit:?}"),
                ),
            ),
            other => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new(ErrorKind::Upstream, other.to_string()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new(ErrorKind::BadRequest, message)),
    )
        .into_response()
}

async fn forward(state: &FrontendState, query: &str) -> Response {
    match state.client.match_count(query).await {
        Ok(count) => {
            info!(query, count = count.get(), "proxied match count");
            Json(MatchCountResponse::from(count)).into_response()
        }
        Err(e) => {
            error!(query, error = %e, "backend match count failed");
            ProxyError(e).into_response()
        }
    }
}

/// `GET /?q=<query>`
async fn query_handler(
    State(state): State<FrontendState>,
    Query(params): Query<FrontendQuery>,
) -> Response {
    match params.q {
        Some(q) => forward(&state, &q).await,
        None => bad_request("missing query parameter `q`"),
    }
}

/// `POST /v1/match-count`
async fn match_count_handler(
    State(state): State<FrontendState>,
    payload: Result<Json<MatchCountRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(request)) => forward(&state, &request.query).await,
        Err(e) => bad_request(e.body_text()),
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

async fn liveness_handler() -> &'static str {
    "OK"
}

/// Build the frontend router.
pub fn build_frontend_router(state: FrontendState) -> Router {
    Router::new()
        .route("/", get(query_handler))
        .route(endpoints::MATCH_COUNT, post(match_count_handler))
        .route(endpoints::HEALTH, get(health_handler))
        .route("/_genki", get(liveness_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP frontend that forwards queries to a query server.
pub struct FrontendServer {
    config: FrontendConfig,
    state: FrontendState,
}

impl FrontendServer {
    pub fn new(config: FrontendConfig) -> ServerResult<Self> {
        let client = HttpQueryClient::new(&config.backend_url, config.request_timeout())?;
        Ok(Self {
            state: FrontendState::new(Arc::new(client)),
            config,
        })
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    pub fn router(&self) -> Router {
        build_frontend_router(self.state.clone())
    }

    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            addr = %listener.local_addr()?,
            backend = %self.config.backend_url,
            "tally frontend listening"
        );
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Io)
    }
}
