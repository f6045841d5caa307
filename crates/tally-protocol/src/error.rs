use std::time::Duration;

use thiserror::Error;

use crate::message::ErrorKind;

/// Failures seen by a protocol client.
///
/// `Remote` is an application error the server reported in an error body;
/// every other variant means the exchange itself did not complete.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("remote {kind} error (status {status}): {message}")]
    Remote {
        kind: ErrorKind,
        status: u16,
        message: String,
    },
}

impl ProtocolError {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The application error kind, if the server reported one.
    pub fn remote_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Remote { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
