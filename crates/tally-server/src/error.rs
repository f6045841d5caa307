use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tally_fanout::RetrievalError;
use tally_matcher::PatternError;
use tally_protocol::{ErrorBody, ErrorKind};
use tally_store::StoreError;
use thiserror::Error;

/// Failure of a single match-count request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("listing failed: {0}")]
    Listing(#[source] StoreError),

    #[error(transparent)]
    Retrieval(RetrievalError),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl From<RetrievalError> for ServiceError {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::Listing(source) => Self::Listing(source),
            other => Self::Retrieval(other),
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Pattern(_) => ErrorKind::Pattern,
            Self::Listing(_) => ErrorKind::Listing,
            Self::Retrieval(_) => ErrorKind::Retrieval,
            Self::BadRequest(_) => ErrorKind::BadRequest,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pattern(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Listing(_) | Self::Retrieval(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.kind(), self.to_string());
        (self.status(), Json(body)).into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("protocol error: {0}")]
    Protocol(#[from] tally_protocol::ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
