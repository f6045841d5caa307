use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tally_store::{CorpusStore, DirCorpusStore, GcsConfig, GcsCorpusStore};

use crate::error::{ServerError, ServerResult};

/// Where the corpus lives inside the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSource {
    pub bucket: String,
    pub prefix: String,
}

impl Default for CorpusSource {
    fn default() -> Self {
        Self {
            bucket: "dataflow-samples".into(),
            prefix: "shakespeare/".into(),
        }
    }
}

/// Which object store backs the corpus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreBackend {
    Gcs(GcsConfig),
    Dir { root: PathBuf },
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Gcs(GcsConfig::default())
    }
}

impl StoreBackend {
    pub fn build(&self) -> ServerResult<Arc<dyn CorpusStore>> {
        Ok(match self {
            Self::Gcs(config) => Arc::new(GcsCorpusStore::new(config)?),
            Self::Dir { root } => Arc::new(DirCorpusStore::new(root.clone())),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub corpus: CorpusSource,
    pub store: StoreBackend,
    /// Upper bound on a single document fetch; `None` leaves it to the store.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 5050)),
            corpus: CorpusSource::default(),
            store: StoreBackend::default(),
            fetch_timeout_ms: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub bind_addr: SocketAddr,
    /// Base URL of the query server.
    pub backend_url: String,
    pub request_timeout_ms: u64,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            backend_url: "http://localhost:5050".into(),
            request_timeout_ms: 30_000,
        }
    }
}

impl FrontendConfig {
    pub fn from_toml_str(s: &str) -> ServerResult<Self> {
        toml::from_str(s).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
