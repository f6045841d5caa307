use axum::routing::{get, post};
use axum::Router;
use tally_protocol::endpoints;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::service::QueryService;

/// Build the query server router.
pub fn build_router(service: QueryService) -> Router {
    Router::new()
        .route(endpoints::MATCH_COUNT, post(handler::match_count_handler))
        .route(endpoints::HEALTH, get(handler::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tally_fanout::FanOutRetriever;
    use tally_protocol::HealthStatus;
    use tally_store::InMemoryCorpusStore;
    use tower::util::ServiceExt;

    fn service() -> QueryService {
        let store = InMemoryCorpusStore::new();
        store.insert("dataflow-samples", "shakespeare/hamlet.txt", "To be, or not to be\nlove\n");
        store.insert("dataflow-samples", "shakespeare/romeo.txt", "love\nLOVE\n");
        QueryService::new(
            FanOutRetriever::new(Arc::new(store), "dataflow-samples"),
            "shakespeare/",
        )
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(endpoints::MATCH_COUNT)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn match_count_endpoint() {
        let response = build_router(service())
            .oneshot(post_json(r#"{"query":"love"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"match_count": 3}));
    }

    #[tokio::test]
    async fn bad_pattern_is_400() {
        let response = build_router(service())
            .oneshot(post_json(r#"{"query":"(["}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "pattern");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let response = build_router(service())
            .oneshot(post_json(r#"{"q":"love"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "bad_request");
    }

    #[tokio::test]
    async fn listing_failure_is_502() {
        let service = QueryService::new(
            FanOutRetriever::new(Arc::new(InMemoryCorpusStore::new()), "missing"),
            "shakespeare/",
        );
        let response = build_router(service)
            .oneshot(post_json(r#"{"query":"love"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["kind"], "listing");
    }

    #[tokio::test]
    async fn fetch_failure_is_502() {
        let store = crate::testing::BrokenKeyStore::with_broken_second("dataflow-samples");
        let service = QueryService::new(
            FanOutRetriever::new(Arc::new(store), "dataflow-samples"),
            "shakespeare/",
        );
        let response = build_router(service)
            .oneshot(post_json(r#"{"query":"love"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["kind"], "retrieval");
    }

    #[tokio::test]
    async fn health_endpoint() {
        let service = service();
        let app = build_router(service.clone());
        let response = app
            .clone()
            .oneshot(Request::builder().uri(endpoints::HEALTH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "SERVING");

        service.set_health(HealthStatus::NotServing);
        let response = app
            .oneshot(Request::builder().uri(endpoints::HEALTH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(json_body(response).await["status"], "NOT_SERVING");
    }
}
