use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tally_store::CorpusStore;
use tally_types::{Corpus, Document, ObjectKey};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{FetchError, RetrievalError, RetrievalResult};
use crate::outcome::{FetchFailure, RetrievalOutcome};

/// Fetches every object of a corpus concurrently.
///
/// One task is spawned per key, all at once, with no limit on how many run
/// together. The corpus size therefore bounds the number of in-flight
/// fetches.
///
/// Each task reports exactly one message over a channel; the retriever
/// collects until every task has reported (or died), so a failure never
/// cancels its siblings and no fetched document is thrown away.
#[derive(Clone)]
pub struct FanOutRetriever {
    store: Arc<dyn CorpusStore>,
    bucket: Arc<str>,
    fetch_timeout: Option<Duration>,
}

impl FanOutRetriever {
    pub fn new(store: Arc<dyn CorpusStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: Arc::from(bucket.into()),
            fetch_timeout: None,
        }
    }

    /// Bound each individual fetch. A fetch that exceeds it fails with
    /// [`FetchError::Timeout`]; the others are unaffected.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    /// Keys under `prefix`, listed fresh from the store.
    pub async fn list(&self, prefix: &str) -> RetrievalResult<Vec<ObjectKey>> {
        self.store
            .list(&self.bucket, prefix)
            .await
            .map_err(RetrievalError::Listing)
    }

    /// List `prefix` and retrieve everything under it.
    ///
    /// A listing failure is returned as an error before any fetch starts.
    pub async fn retrieve_prefix(&self, prefix: &str) -> RetrievalResult<RetrievalOutcome> {
        let keys = self.list(prefix).await?;
        Ok(self.retrieve(keys).await)
    }

    /// Fetch every distinct key in `keys`, each exactly once.
    pub async fn retrieve<I>(&self, keys: I) -> RetrievalOutcome
    where
        I: IntoIterator<Item = ObjectKey>,
    {
        let mut pending: BTreeSet<ObjectKey> = keys.into_iter().collect();
        let requested = pending.len();
        if requested == 0 {
            return RetrievalOutcome::default();
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(ObjectKey, Result<Bytes, FetchError>)>();
        for key in pending.iter().cloned() {
            let tx = tx.clone();
            let store = Arc::clone(&self.store);
            let bucket = Arc::clone(&self.bucket);
            let timeout = self.fetch_timeout;
            tokio::spawn(async move {
                let result = fetch_one(store.as_ref(), &bucket, &key, timeout).await;
                // The receiver is gone only if the caller dropped the retrieval.
                let _ = tx.send((key, result));
            });
        }
        drop(tx);

        let mut corpus = Corpus::new();
        let mut failures = Vec::new();
        while let Some((key, result)) = rx.recv().await {
            pending.remove(&key);
            match result {
                Ok(content) => {
                    debug!(key = %key, bytes = content.len(), "fetched object");
                    corpus.insert(Document::new(key, content));
                }
                Err(error) => {
                    warn!(key = %key, error = %error, "fetch failed");
                    failures.push(FetchFailure { key, error });
                }
            }
        }

        // Tasks that panicked dropped their sender without reporting.
        for key in pending {
            warn!(key = %key, "fetch task aborted");
            failures.push(FetchFailure {
                key,
                error: FetchError::Aborted,
            });
        }

        debug!(
            bucket = %self.bucket,
            requested,
            fetched = corpus.len(),
            failed = failures.len(),
            "retrieval finished"
        );
        RetrievalOutcome { corpus, failures }
    }
}

async fn fetch_one(
    store: &dyn CorpusStore,
    bucket: &str,
    key: &ObjectKey,
    timeout: Option<Duration>,
) -> Result<Bytes, FetchError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, store.fetch(bucket, key))
            .await
            .map_err(|_| FetchError::Timeout(limit))?
            .map_err(FetchError::from),
        None => store.fetch(bucket, key).await.map_err(FetchError::from),
    }
}

impl std::fmt::Debug for FanOutRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanOutRetriever")
            .field("backend", &self.store.backend())
            .field("bucket", &self.bucket)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}
