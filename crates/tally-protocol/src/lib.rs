//! Wire protocol for tally.
//!
//! The query server speaks JSON over HTTP. This crate owns the body shapes,
//! the endpoint paths, the error kinds carried in failure responses, and the
//! [`QueryClient`] seam that both the frontend proxy and the load driver use
//! to reach a query server.

pub mod client;
pub mod endpoint;
pub mod error;
pub mod message;

pub use client::{HttpQueryClient, QueryClient};
pub use endpoint::{endpoints, HealthResponse, HealthStatus};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{ErrorBody, ErrorKind, MatchCountRequest, MatchCountResponse};
