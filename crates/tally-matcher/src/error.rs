use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    Invalid { pattern: String, reason: String },

    #[error("pattern {pattern:?} compiles to a program larger than the configured limit")]
    TooLarge { pattern: String },
}

pub type PatternResult<T> = Result<T, PatternError>;
