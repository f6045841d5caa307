//! Load generation for tally.
//!
//! A [`LoadDriver`] dispatches batches of match-count queries at a fixed
//! concurrency limit, checks every answer against the query table's
//! expectation, and repeats on a fixed-interval timer.

pub mod config;
pub mod driver;
pub mod error;

pub use config::LoadgenConfig;
pub use driver::{BatchReport, LoadDriver, RoundsSummary};
pub use error::{ConfigError, LoadError, LoadResult};
