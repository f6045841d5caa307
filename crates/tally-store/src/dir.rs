use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tally_types::ObjectKey;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::CorpusStore;

/// Corpus store backed by a local directory tree.
///
/// A bucket is a subdirectory of `root` (the empty bucket is `root` itself).
/// Object keys are file paths relative to the bucket, `/`-separated on every
/// platform.
#[derive(Clone, Debug)]
pub struct DirCorpusStore {
    root: PathBuf,
}

impl DirCorpusStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        if bucket.is_empty() {
            self.root.clone()
        } else {
            self.root.join(bucket)
        }
    }

    /// Map a key onto a path inside the bucket, refusing anything that
    /// could escape it.
    fn object_path(&self, bucket: &str, key: &ObjectKey) -> StoreResult<PathBuf> {
        let relative = Path::new(key.as_str());
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.as_str().is_empty() || escapes {
            return Err(StoreError::InvalidKey {
                key: key.clone(),
                reason: "must be a relative path without `..`".into(),
            });
        }
        Ok(self.bucket_dir(bucket).join(relative))
    }
}

fn walk_keys(dir: &Path, prefix: &str) -> Result<Vec<ObjectKey>, String> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| e.to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| e.to_string())?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !name.is_empty() && name.starts_with(prefix) {
            keys.push(ObjectKey::new(name));
        }
    }
    keys.sort();
    Ok(keys)
}

#[async_trait]
impl CorpusStore for DirCorpusStore {
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectKey>> {
        let dir = self.bucket_dir(bucket);
        let walk_prefix = prefix.to_owned();
        let listing_error = |reason: String| StoreError::Listing {
            bucket: bucket.to_owned(),
            prefix: prefix.to_owned(),
            reason,
        };

        if !dir.is_dir() {
            return Err(listing_error(format!("{} is not a directory", dir.display())));
        }

        let walk_dir = dir.clone();
        let keys = tokio::task::spawn_blocking(move || walk_keys(&walk_dir, &walk_prefix))
            .await
            .map_err(|e| listing_error(e.to_string()))?
            .map_err(listing_error)?;

        debug!(dir = %dir.display(), prefix, count = keys.len(), "listed directory corpus");
        Ok(keys)
    }

    async fn fetch(&self, bucket: &str, key: &ObjectKey) -> StoreResult<Bytes> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.clone(),
            }),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    fn backend(&self) -> &'static str {
        "dir"
    }
}
