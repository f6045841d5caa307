use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tally_types::ObjectKey;

use crate::error::StoreResult;

/// Read-only gateway onto an object store holding a text corpus.
///
/// Implementations must satisfy these invariants:
/// - `list` returns each key at most once and never returns an empty key.
/// - `fetch` returns the full object content or an error; never a prefix.
/// - Calls share no state that would make concurrent use unsafe.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Keys of all objects in `bucket` whose names start with `prefix`.
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectKey>>;

    /// Full content of one object.
    async fn fetch(&self, bucket: &str, key: &ObjectKey) -> StoreResult<Bytes>;

    /// Short backend name for log lines.
    fn backend(&self) -> &'static str;
}

#[async_trait]
impl<S: CorpusStore + ?Sized> CorpusStore for Arc<S> {
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectKey>> {
        (**self).list(bucket, prefix).await
    }

    async fn fetch(&self, bucket: &str, key: &ObjectKey) -> StoreResult<Bytes> {
        (**self).fetch(bucket, key).await
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
