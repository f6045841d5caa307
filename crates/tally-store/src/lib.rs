//! Corpus store gateway for tally.
//!
//! A corpus lives in an object store as a set of text objects under a common
//! prefix. This crate hides which store that is behind the [`CorpusStore`]
//! trait, which offers exactly two read-only operations: list the keys under
//! a prefix, and fetch one object's full content.
//!
//! # Backends
//!
//! - [`GcsCorpusStore`] -- Google Cloud Storage JSON API, anonymous access
//! - [`DirCorpusStore`] -- a local directory tree acting as the bucket
//! - [`InMemoryCorpusStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Stores never write, cache, or retry.
//! 2. Listing is recomputed on every call.
//! 3. Each call is independent and safe to issue concurrently.
//! 4. All backend errors are propagated as [`StoreError`], never swallowed.

pub mod dir;
pub mod error;
pub mod gcs;
pub mod memory;
pub mod traits;

pub use dir::DirCorpusStore;
pub use error::{StoreError, StoreResult};
pub use gcs::{GcsConfig, GcsCorpusStore};
pub use memory::InMemoryCorpusStore;
pub use traits::CorpusStore;
