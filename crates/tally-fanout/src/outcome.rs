use tally_types::{Corpus, ObjectKey};

use crate::error::{FetchError, RetrievalError};

/// One key that could not be fetched.
#[derive(Debug)]
pub struct FetchFailure {
    pub key: ObjectKey,
    pub error: FetchError,
}

/// Everything a retrieval produced: the documents that arrived and the keys
/// that did not.
///
/// `failures` is in completion order, so the first entry is the first error
/// observed. Which slot fails first is not deterministic; only whether any
/// failed is.
#[derive(Debug, Default)]
pub struct RetrievalOutcome {
    pub corpus: Corpus,
    pub failures: Vec<FetchFailure>,
}

impl RetrievalOutcome {
    /// Number of distinct keys that were requested.
    pub fn requested(&self) -> usize {
        self.corpus.len() + self.failures.len()
    }

    /// `true` when every requested key was fetched.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn first_failure(&self) -> Option<&FetchFailure> {
        self.failures.first()
    }

    /// The corpus if complete, otherwise an error naming the first failure.
    ///
    /// Callers that want the partial corpus alongside the error should read
    /// the fields directly instead.
    pub fn into_result(self) -> Result<Corpus, RetrievalError> {
        let requested = self.requested();
        let failed = self.failures.len();
        match self.failures.into_iter().next() {
            None => Ok(self.corpus),
            Some(first) => Err(RetrievalError::Fetch {
                key: first.key,
                source: first.error,
                failed,
                requested,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_store::StoreError;
    use tally_types::Document;

    fn failure(key: &str) -> FetchFailure {
        FetchFailure {
            key: ObjectKey::from(key),
            error: FetchError::Store(StoreError::NotFound {
                bucket: "b".into(),
                key: ObjectKey::from(key),
            }),
        }
    }

    #[test]
    fn empty_outcome_is_complete() {
        let outcome = RetrievalOutcome::default();
        assert!(outcome.is_complete());
        assert_eq!(outcome.requested(), 0);
        assert!(outcome.into_result().unwrap().is_empty());
    }

    #[test]
    fn into_result_reports_first_failure() {
        let corpus: Corpus = vec![Document::new(ObjectKey::from("a"), "x")].into_iter().collect();
        let outcome = RetrievalOutcome {
            corpus,
            failures: vec![failure("c"), failure("b")],
        };
        assert!(!outcome.is_complete());
        assert_eq!(outcome.requested(), 3);
        assert_eq!(outcome.first_failure().unwrap().key, ObjectKey::from("c"));

        match outcome.into_result().unwrap_err() {
            RetrievalError::Fetch { key, failed, requested, .. } => {
                assert_eq!(key, ObjectKey::from("c"));
                assert_eq!(failed, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn fetch_error_message_names_key() {
        let outcome = RetrievalOutcome {
            corpus: Corpus::new(),
            failures: vec![failure("shakespeare/lear.txt")],
        };
        let message = outcome.into_result().unwrap_err().to_string();
        assert!(message.contains("shakespeare/lear.txt"));
        assert!(message.contains("1 of 1"));
    }
}
