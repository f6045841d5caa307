//! Fan-out retrieval for tally.
//!
//! Given a set of object keys, [`FanOutRetriever`] fetches all of them at
//! once through a [`tally_store::CorpusStore`] and gathers the results into a
//! [`tally_types::Corpus`]. A failed fetch never discards the documents that
//! did arrive: the [`RetrievalOutcome`] carries both.

pub mod error;
pub mod outcome;
pub mod retriever;

pub use error::{FetchError, RetrievalError, RetrievalResult};
pub use outcome::{FetchFailure, RetrievalOutcome};
pub use retriever::FanOutRetriever;
