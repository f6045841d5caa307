use std::time::Duration;

use tally_store::StoreError;
use tally_types::ObjectKey;
use thiserror::Error;

/// Why a single object could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    #[error("fetch task ended without reporting a result")]
    Aborted,
}

#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Listing the corpus failed; nothing was fetched.
    #[error("listing failed: {0}")]
    Listing(#[source] StoreError),

    /// At least one fetch failed. `key` is the first failure observed.
    #[error("failed to fetch {key} ({failed} of {requested} fetches failed): {source}")]
    Fetch {
        key: ObjectKey,
        #[source]
        source: FetchError,
        failed: usize,
        requested: usize,
    },
}

pub type RetrievalResult<T> = Result<T, RetrievalError>;
