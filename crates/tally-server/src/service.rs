use std::sync::{Arc, RwLock};

use tally_fanout::FanOutRetriever;
use tally_matcher::LineMatcher;
use tally_protocol::{HealthResponse, HealthStatus};
use tally_types::MatchCount;
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::{ServerResult, ServiceResult};

/// Answers match-count queries against a freshly retrieved corpus.
///
/// Nothing is cached between calls: every query lists the prefix and
/// fetches every document again. The only state is the health flag.
#[derive(Clone)]
pub struct QueryService {
    retriever: FanOutRetriever,
    prefix: Arc<str>,
    health: Arc<RwLock<HealthStatus>>,
}

impl QueryService {
    pub fn new(retriever: FanOutRetriever, prefix: impl Into<String>) -> Self {
        Self {
            retriever,
            prefix: Arc::from(prefix.into()),
            health: Arc::new(RwLock::new(HealthStatus::Serving)),
        }
    }

    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let store = config.store.build()?;
        let mut retriever = FanOutRetriever::new(store, config.corpus.bucket.clone());
        if let Some(timeout) = config.fetch_timeout() {
            retriever = retriever.with_fetch_timeout(timeout);
        }
        Ok(Self::new(retriever, config.corpus.prefix.clone()))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Count lines matching `query` across every document under the prefix.
    ///
    /// The pattern is compiled first, so a bad query never touches the store.
    /// Any failed fetch fails the whole call: a count over a partial corpus
    /// would be silently wrong.
    pub async fn get_match_count(&self, query: &str) -> ServiceResult<MatchCount> {
        let matcher = LineMatcher::new(query)?;
        let outcome = self.retriever.retrieve_prefix(&self.prefix).await?;
        let documents = outcome.corpus.len();
        let corpus = outcome.into_result()?;
        let count = matcher.count(&corpus);
        debug!(query, documents, count = count.get(), "match count computed");
        Ok(count)
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse::new(*self.health.read().expect("lock poisoned"))
    }

    pub fn set_health(&self, status: HealthStatus) {
        let mut current = self.health.write().expect("lock poisoned");
        let previous = *current;
        if previous != status {
            info!(from = ?previous, to = ?status, "health status changed");
            *current = status;
        }
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("bucket", &self.retriever.bucket())
            .field("prefix", &self.prefix)
            .finish()
    }
}
