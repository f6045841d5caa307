use std::borrow::Cow;
use std::collections::btree_map::{self, BTreeMap};

use bytes::Bytes;

use crate::key::ObjectKey;

/// Immutable content fetched for one [`ObjectKey`].
///
/// Content is kept as raw bytes; nothing here assumes UTF-8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    key: ObjectKey,
    content: Bytes,
}

impl Document {
    pub fn new(key: ObjectKey, content: impl Into<Bytes>) -> Self {
        Self {
            key,
            content: content.into(),
        }
    }

    pub fn key(&self) -> &ObjectKey {
        &self.key
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Lines of the document, split on `\n`.
    ///
    /// Every piece is a line, so content ending in a newline yields a final
    /// empty line and empty content yields exactly one empty line.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.content.split(|b| *b == b'\n')
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// The documents assembled for one query, keyed by object key.
///
/// Iteration order is by key, but nothing computed from a corpus may depend
/// on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: BTreeMap<ObjectKey, Document>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document, returning the previous document for that key.
    pub fn insert(&mut self, document: Document) -> Option<Document> {
        self.documents.insert(document.key.clone(), document)
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&Document> {
        self.documents.get(key)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.documents.contains_key(key)
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.documents.keys()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Total content bytes across all documents.
    pub fn total_bytes(&self) -> u64 {
        self.documents.values().map(|d| d.len() as u64).sum()
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for document in iter {
            corpus.insert(document);
        }
        corpus
    }
}

impl Extend<Document> for Corpus {
    fn extend<I: IntoIterator<Item = Document>>(&mut self, iter: I) {
        for document in iter {
            self.insert(document);
        }
    }
}

impl IntoIterator for Corpus {
    type Item = Document;
    type IntoIter = btree_map::IntoValues<ObjectKey, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_values()
    }
}
