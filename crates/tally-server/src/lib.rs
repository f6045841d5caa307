//! HTTP surfaces for tally.
//!
//! The query server answers `POST /v1/match-count` by listing the configured
//! prefix, fetching every document concurrently, and counting matching lines.
//! The frontend is a thin proxy that forwards `GET /?q=` to a query server
//! through a [`tally_protocol::QueryClient`].

pub mod config;
pub mod error;
pub mod frontend;
pub mod handler;
pub mod router;
pub mod server;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::{CorpusSource, FrontendConfig, ServerConfig, StoreBackend};
pub use error::{ServerError, ServerResult, ServiceError, ServiceResult};
pub use frontend::{build_frontend_router, FrontendServer, FrontendState};
pub use server::TallyServer;
pub use service::QueryService;
