use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tally_types::ObjectKey;

use crate::error::{StoreError, StoreResult};
use crate::traits::CorpusStore;

type Bucket = BTreeMap<ObjectKey, Bytes>;

/// In-memory, map-based corpus store.
///
/// Intended for tests and embedding. Buckets come into existence on first
/// insert; listing an unknown bucket is a listing error, like a real store.
pub struct InMemoryCorpusStore {
    buckets: RwLock<BTreeMap<String, Bucket>>,
}

impl InMemoryCorpusStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or replace an object.
    pub fn insert(&self, bucket: &str, key: impl Into<ObjectKey>, content: impl Into<Bytes>) {
        self.buckets
            .write()
            .expect("lock poisoned")
            .entry(bucket.to_owned())
            .or_default()
            .insert(key.into(), content.into());
    }

    /// Remove an object. Returns `true` if it existed.
    pub fn remove(&self, bucket: &str, key: &ObjectKey) -> bool {
        self.buckets
            .write()
            .expect("lock poisoned")
            .get_mut(bucket)
            .is_some_and(|b| b.remove(key).is_some())
    }

    /// Number of objects across all buckets.
    pub fn len(&self) -> usize {
        self.buckets
            .read()
            .expect("lock poisoned")
            .values()
            .map(BTreeMap::len)
            .sum()
    }

    /// Returns `true` if no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all buckets and objects.
    pub fn clear(&self) {
        self.buckets.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryCorpusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CorpusStore for InMemoryCorpusStore {
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectKey>> {
        let buckets = self.buckets.read().expect("lock poisoned");
        let objects = buckets.get(bucket).ok_or_else(|| StoreError::Listing {
            bucket: bucket.to_owned(),
            prefix: prefix.to_owned(),
            reason: "bucket does not exist".into(),
        })?;
        Ok(objects
            .keys()
            .filter(|k| !k.as_str().is_empty() && k.as_str().starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn fetch(&self, bucket: &str, key: &ObjectKey) -> StoreResult<Bytes> {
        let buckets = self.buckets.read().expect("lock poisoned");
        buckets
            .get(bucket)
            .and_then(|b| b.get(key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.clone(),
            })
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

impl std::fmt::Debug for InMemoryCorpusStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCorpusStore")
            .field("object_count", &self.len())
            .finish()
    }
}
