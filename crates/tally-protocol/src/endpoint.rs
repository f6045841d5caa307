use serde::{Deserialize, Serialize};

/// HTTP endpoint paths for the query protocol.
pub mod endpoints {
    pub const MATCH_COUNT: &str = "/v1/match-count";
    pub const HEALTH: &str = "/v1/health";
}

/// Tri-state serving status reported by the health probe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    #[default]
    Unknown,
    Serving,
    NotServing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
}

impl HealthResponse {
    pub fn new(status: HealthStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self::new(HealthStatus::Serving)
    }
}
