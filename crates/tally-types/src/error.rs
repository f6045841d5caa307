use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("match count cannot be negative: {0}")]
    NegativeCount(i64),

    #[error("query table must contain at least one case")]
    EmptyQueryTable,
}
