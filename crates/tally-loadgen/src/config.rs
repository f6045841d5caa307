use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_types::QueryTable;
use tokio::sync::Semaphore;

use crate::error::ConfigError;

/// Knobs of a load run. Passed explicitly; nothing is read from the
/// environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadgenConfig {
    /// Base URL of the frontend (or a query server) to drive.
    pub target_url: String,
    /// Queries dispatched per round.
    pub workers: usize,
    /// Maximum queries in flight at once.
    pub concurrency: usize,
    /// Number of rounds; `0` runs until stopped.
    pub rounds: u64,
    pub interval_ms: u64,
    pub request_timeout_ms: u64,
    /// Replaces the built-in Shakespeare table when set.
    pub queries: Option<QueryTable>,
}

impl Default for LoadgenConfig {
    fn default() -> Self {
        Self {
            target_url: "http://localhost:8080".into(),
            workers: 20,
            concurrency: 1,
            rounds: 0,
            interval_ms: 1000,
            request_timeout_ms: 30_000,
            queries: None,
        }
    }
}

impl LoadgenConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid {
                field: "workers",
                reason: "must be at least 1".into(),
            });
        }
        if self.concurrency == 0 || self.concurrency > Semaphore::MAX_PERMITS {
            return Err(ConfigError::Invalid {
                field: "concurrency",
                reason: format!("must be between 1 and {}", Semaphore::MAX_PERMITS),
            });
        }
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "interval_ms",
                reason: "must be positive".into(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_ms",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn query_table(&self) -> QueryTable {
        self.queries.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::{MatchCount, QueryCase};

    #[test]
    fn defaults() {
        let c = LoadgenConfig::default();
        assert_eq!(c.target_url, "http://localhost:8080");
        assert_eq!(c.workers, 20);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.rounds, 0);
        assert_eq!(c.interval(), Duration::from_secs(1));
        assert_eq!(c.query_table(), QueryTable::shakespeare());
        c.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zeroes() {
        for (field, config) in [
            ("workers", LoadgenConfig { workers: 0, ..Default::default() }),
            ("concurrency", LoadgenConfig { concurrency: 0, ..Default::default() }),
            ("concurrency", LoadgenConfig { concurrency: Semaphore::MAX_PERMITS + 1, ..Default::default() }),
            ("interval_ms", LoadgenConfig { interval_ms: 0, ..Default::default() }),
        ] {
            match config.validate() {
                Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{field}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn parses_custom_queries() {
        let c = LoadgenConfig::from_toml_str(
            r#"
            workers = 5
            concurrency = 2
            rounds = 3

            [[queries]]
            pattern = "love"
            expected = 3

            [[queries]]
            pattern = "to be, or not to be"
            expected = 1
            "#,
        )
        .unwrap();
        assert_eq!(c.workers, 5);
        assert_eq!(c.interval_ms, 1000);
        let table = c.query_table();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cases()[0], QueryCase::new("love", 3));
        assert_eq!(table.cases()[1].expected, MatchCount::new(1));
    }

    #[test]
    fn empty_query_table_rejected() {
        let err = LoadgenConfig::from_toml_str("queries = []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loadgen.toml");
        std::fs::write(&path, "target_url = \"http://frontend:8080\"\nrounds = 10\n").unwrap();
        let c = LoadgenConfig::load(&path).unwrap();
        assert_eq!(c.target_url, "http://frontend:8080");
        assert_eq!(c.rounds, 10);

        let err = LoadgenConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
