use std::fmt;

use serde::{Deserialize, Serialize};
use tally_types::MatchCount;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCountRequest {
    pub query: String,
}

impl MatchCountRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into() }
    }
}

/// Successful reply. The count travels as a signed 64-bit integer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCountResponse {
    pub match_count: i64,
}

impl From<MatchCount> for MatchCountResponse {
    fn from(count: MatchCount) -> Self {
        Self {
            match_count: count.to_wire(),
        }
    }
}

/// Class of failure carried in an [`ErrorBody`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The query did not compile as a pattern.
    Pattern,
    /// The corpus listing failed.
    Listing,
    /// At least one document could not be fetched.
    Retrieval,
    /// The request itself was malformed.
    BadRequest,
    /// A proxy could not reach the query server.
    Upstream,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Listing => "listing",
            Self::Retrieval => "retrieval",
            Self::BadRequest => "bad_request",
            Self::Upstream => "upstream",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub error: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
        }
    }
}
