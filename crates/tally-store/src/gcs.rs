use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tally_types::ObjectKey;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::CorpusStore;

/// Connection settings for [`GcsCorpusStore`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsConfig {
    /// Base URL of the JSON API.
    pub endpoint: String,
    /// Timeout applied to each individual HTTP request.
    pub request_timeout_ms: u64,
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self {
            endpoint: GcsCorpusStore::DEFAULT_ENDPOINT.into(),
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Deserialize)]
struct ListPage {
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ListItem {
    #[serde(default)]
    name: String,
}

/// Corpus store reading public objects from Google Cloud Storage.
///
/// Requests are anonymous. Listing follows `nextPageToken` until the last
/// page; downloads use `alt=media`.
#[derive(Clone, Debug)]
pub struct GcsCorpusStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl GcsCorpusStore {
    pub const DEFAULT_ENDPOINT: &'static str = "https://storage.googleapis.com";

    pub fn new(config: &GcsConfig) -> StoreResult<Self> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| StoreError::Config(format!("invalid endpoint {}: {e}", config.endpoint)))?;
        if endpoint.cannot_be_a_base() {
            return Err(StoreError::Config(format!(
                "endpoint {} cannot be used as a base URL",
                config.endpoint
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    fn objects_url(&self, bucket: &str, key: Option<&ObjectKey>) -> StoreResult<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Config(format!("endpoint {} has no path", self.endpoint)))?;
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "b", bucket, "o"]);
            if let Some(key) = key {
                // A single segment: `/` inside the name is percent-encoded.
                segments.push(key.as_str());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CorpusStore for GcsCorpusStore {
    async fn list(&self, bucket: &str, prefix: &str) -> StoreResult<Vec<ObjectKey>> {
        let listing_error = |reason: String| StoreError::Listing {
            bucket: bucket.to_owned(),
            prefix: prefix.to_owned(),
            reason,
        };
        let url = self.objects_url(bucket, None)?;

        let mut keys = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self.client.get(url.clone()).query(&[("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }
            let response = request
                .send()
                .await
                .map_err(|e| listing_error(e.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(listing_error(format!("HTTP {status}")));
            }
            let page: ListPage = response
                .json()
                .await
                .map_err(|e| listing_error(format!("malformed listing: {e}")))?;

            keys.extend(
                page.items
                    .into_iter()
                    .filter(|item| !item.name.is_empty())
                    .map(|item| ObjectKey::new(item.name)),
            );

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(bucket, prefix, count = keys.len(), "listed gcs objects");
        Ok(keys)
    }

    async fn fetch(&self, bucket: &str, key: &ObjectKey) -> StoreResult<Bytes> {
        let url = self.objects_url(bucket, Some(key))?;
        let response = self
            .client
            .get(url)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("fetching {bucket}/{key}: {e}")))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.clone(),
            }),
            status if !status.is_success() => Err(StoreError::Transport(format!(
                "fetching {bucket}/{key}: HTTP {status}"
            ))),
            _ => response
                .bytes()
                .await
                .map_err(|e| StoreError::Transport(format!("reading {bucket}/{key}: {e}"))),
        }
    }

    fn backend(&self) -> &'static str {
        "gcs"
    }
}
