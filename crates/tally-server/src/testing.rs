use async_trait::async_trait;
use bytes::Bytes;
use tally_store::{CorpusStore, InMemoryCorpusStore, StoreError, StoreResult};
use tally_types::ObjectKey;

/// Lists everything its inner store holds but refuses to fetch one key.
pub(crate) struct BrokenKeyStore {
    pub inner: InMemoryCorpusStore,
    pub broken: ObjectKey,
}

impl BrokenKeyStore {
    /// `a.txt` and `b.txt` under `shakespeare/`; fetching `b.txt` fails.
    pub fn with_broken_second(bucket: &str) -> Self {
        let inner = InMemoryCorpusStore::new();
        inner.insert(bucket, "shakespeare/a.txt", "love\n");
        inner.insert(bucket, "shakespeare/b.txt", "love\nlove\n");
        Self {
            inner,
            broken: ObjectKey::new("shakespeare/b.txt"),
        }
    }
}

#[async_trait]
impl CorpusStore for BrokenKeyStore {
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectKey>> {
        self.inner.list(bucket, prefix).await
    }

    async fn fetch(&self, bucket: &str, key: &ObjectKey) -> StoreResult<Bytes> {
        if *key == self.broken {
            return Err(StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.clone(),
            });
        }
        self.inner.fetch(bucket, key).await
    }

    fn backend(&self) -> &'static str {
        "broken-key"
    }
}
