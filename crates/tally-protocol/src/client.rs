use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tally_types::MatchCount;
use tracing::debug;

use crate::endpoint::{endpoints, HealthResponse};
use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{ErrorBody, MatchCountRequest, MatchCountResponse};

/// Something that can answer match-count queries.
///
/// The load driver and the frontend proxy are written against this trait so
/// tests can substitute a scripted client for the network.
#[async_trait]
pub trait QueryClient: Send + Sync {
    async fn match_count(&self, query: &str) -> ProtocolResult<MatchCount>;
}

#[async_trait]
impl<C: QueryClient + ?Sized> QueryClient for Arc<C> {
    async fn match_count(&self, query: &str) -> ProtocolResult<MatchCount> {
        (**self).match_count(query).await
    }
}

/// JSON-over-HTTP client for a tally query server.
#[derive(Clone, Debug)]
pub struct HttpQueryClient {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpQueryClient {
    pub fn new(base_url: &str, timeout: Duration) -> ProtocolResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| ProtocolError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ProtocolError::InvalidUrl(format!(
                "{base_url}: cannot be used as a base URL"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProtocolError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> ProtocolResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ProtocolError::InvalidUrl(format!("{}{path}: {e}", self.base)))
    }

    fn send_error(&self, err: reqwest::Error) -> ProtocolError {
        if err.is_timeout() {
            ProtocolError::Timeout(self.timeout)
        } else {
            ProtocolError::Transport(err.to_string())
        }
    }

    /// Turn a non-2xx response into a `Remote` error when it carries an
    /// error body, or `UnexpectedStatus` when it does not.
    async fn failure(&self, response: reqwest::Response) -> ProtocolError {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return self.send_error(e),
        };
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { kind, error }) => ProtocolError::Remote {
                kind,
                status,
                message: error,
            },
            Err(_) => ProtocolError::UnexpectedStatus { status, body },
        }
    }

    pub async fn health(&self) -> ProtocolResult<HealthResponse> {
        let response = self
            .client
            .get(self.url(endpoints::HEALTH)?)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(self.failure(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| ProtocolError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl QueryClient for HttpQueryClient {
    async fn match_count(&self, query: &str) -> ProtocolResult<MatchCount> {
        let response = self
            .client
            .post(self.url(endpoints::MATCH_COUNT)?)
            .json(&MatchCountRequest::new(query))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        if !response.status().is_success() {
            return Err(self.failure(response).await);
        }
        let body: MatchCountResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ProtocolError::Timeout(self.timeout)
            } else {
                ProtocolError::Malformed(e.to_string())
            }
        })?;
        let count = MatchCount::from_wire(body.match_count)
            .map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        debug!(query, count = count.get(), "match count received");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::HealthStatus;
    use crate::message::ErrorKind;

    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    async fn fake_match_count(Json(req): Json<MatchCountRequest>) -> Response {
        match req.query.as_str() {
            "love" => Json(MatchCountResponse { match_count: 3040 }).into_response(),
            "(" => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(ErrorKind::Pattern, "unclosed group")),
            )
                .into_response(),
            "negative" => Json(MatchCountResponse { match_count: -1 }).into_response(),
            "garbage" => "not json".into_response(),
            "slow" => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(MatchCountResponse { match_count: 0 }).into_response()
            }
            _ => (StatusCode::SERVICE_UNAVAILABLE, "overloaded").into_response(),
        }
    }

    async fn serve() -> String {
        let app = Router::new()
            .route(endpoints::MATCH_COUNT, post(fake_match_count))
            .route(
                endpoints::HEALTH,
                get(|| async { Json(HealthResponse::default()) }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client(base: &str) -> HttpQueryClient {
        HttpQueryClient::new(base, Duration::from_millis(500)).unwrap()
    }

    #[test]
    fn rejects_invalid_base() {
        let err = HttpQueryClient::new("localhost 8080", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn match_count_success() {
        let base = serve().await;
        assert_eq!(client(&base).match_count("love").await.unwrap(), MatchCount::new(3040));
    }

    #[tokio::test]
    async fn error_body_becomes_remote_error() {
        let base = serve().await;
        let err = client(&base).match_count("(").await.unwrap_err();
        assert!(err.is_remote());
        assert_eq!(err.remote_kind(), Some(ErrorKind::Pattern));
        assert!(matches!(err, ProtocolError::Remote { status: 400, .. }));
    }

    #[tokio::test]
    async fn bare_status_is_unexpected() {
        let base = serve().await;
        let err = client(&base).match_count("other").await.unwrap_err();
        assert!(
            matches!(err, ProtocolError::UnexpectedStatus { status: 503, ref body } if body == "overloaded")
        );
    }

    #[tokio::test]
    async fn malformed_bodies_rejected() {
        let base = serve().await;
        let c = client(&base);
        assert!(matches!(c.match_count("garbage").await, Err(ProtocolError::Malformed(_))));
        assert!(matches!(c.match_count("negative").await, Err(ProtocolError::Malformed(_))));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let base = serve().await;
        let err = client(&base).match_count("slow").await.unwrap_err();
        assert!(matches!(err, ProtocolError::Timeout(_)), "got {err}");
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = client(&format!("http://{addr}")).match_count("love").await.unwrap_err();
        assert!(matches!(err, ProtocolError::Transport(_)));
        assert!(!err.is_remote());
    }

    #[tokio::test]
    async fn health_probe() {
        let base = serve().await;
        let health = client(&base).health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Serving);
    }

    #[tokio::test]
    async fn arc_client_delegates() {
        let base = serve().await;
        let shared: Arc<dyn QueryClient> = Arc::new(client(&base));
        assert_eq!(shared.match_count("love").await.unwrap(), MatchCount::new(3040));
    }
}
