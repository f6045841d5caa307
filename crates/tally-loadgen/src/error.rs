use std::path::PathBuf;

use tally_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("query {query:?} failed: {source}")]
    Query {
        query: String,
        #[source]
        source: ProtocolError,
    },

    #[error("{missing} of {workers} workers ended without reporting")]
    WorkersLost { missing: usize, workers: usize },

    #[error("concurrency limiter closed")]
    LimiterClosed,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type LoadResult<T> = Result<T, LoadError>;
