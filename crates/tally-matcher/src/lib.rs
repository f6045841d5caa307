//! Match counting for tally.
//!
//! A pattern is compiled once into a [`LineMatcher`] and then run over every
//! line of every document in a [`tally_types::Corpus`]. Matching is
//! case-insensitive and unanchored; the count is a plain sum, so document
//! order never affects it.

pub mod error;
pub mod matcher;

pub use error::{PatternError, PatternResult};
pub use matcher::{count, LineMatcher};
