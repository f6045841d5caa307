use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;
use tally_protocol::{HealthResponse, MatchCountRequest, MatchCountResponse};
use tracing::error;

use crate::error::{ServiceError, ServiceResult};
use crate::service::QueryService;

/// `POST /v1/match-count`
pub async fn match_count_handler(
    State(service): State<QueryService>,
    payload: Result<Json<MatchCountRequest>, JsonRejection>,
) -> ServiceResult<Json<MatchCountResponse>> {
    let Json(request) = payload.map_err(|e| ServiceError::BadRequest(e.body_text()))?;
    match service.get_match_count(&request.query).await {
        Ok(count) => Ok(Json(count.into())),
        Err(e) => {
            error!(query = %request.query, kind = %e.kind(), error = %e, "match count failed");
            Err(e)
        }
    }
}

/// `GET /v1/health`
pub async fn health_handler(State(service): State<QueryService>) -> Json<HealthResponse> {
    Json(service.health())
}
