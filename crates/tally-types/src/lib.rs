//! Foundation types for tally.
//!
//! Every other tally crate depends on `tally-types`. The types here carry no
//! I/O and no concurrency; they describe what flows between the corpus store,
//! the retrieval engine, the matcher, and the load driver.
//!
//! # Key Types
//!
//! - [`ObjectKey`]: Opaque name of one document in an object store
//! - [`Document`]: Immutable content fetched for one key
//! - [`Corpus`]: The documents assembled for a single query
//! - [`MatchCount`]: Number of lines matching a pattern
//! - [`QueryCase`] / [`QueryTable`]: Expected results used by the load driver

pub mod count;
pub mod document;
pub mod error;
pub mod key;
pub mod query;

pub use count::MatchCount;
pub use document::{Corpus, Document};
pub use error::TypeError;
pub use key::ObjectKey;
pub use query::{QueryCase, QueryTable};
