use std::{borrow::Borrow, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result, Stage};

/// Opaque document identifier
/// Stable across every pipeline stage, ordered and hashable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(Box<str>);

impl DocId {
    pub fn new(id: impl Into<Box<str>>) -> Self {
        DocId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        DocId(value.into())
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        DocId(value.into_boxed_str())
    }
}

impl Borrow<str> for DocId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document
/// An immutable input record. The raw text is kept as bytes so that
/// undecodable input can be ingested and rejected at tokenization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: DocId,
    raw: Box<[u8]>,
    date: Option<NaiveDate>,
    label: Option<Box<str>>,
}

impl Document {
    /// Create a document from text
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Self {
        Document {
            id: id.into(),
            raw: text.into().into_bytes().into_boxed_slice(),
            date: None,
            label: None,
        }
    }

    /// Create a document from raw bytes, validity is checked by the tokenizer
    pub fn from_bytes(id: impl Into<DocId>, raw: impl Into<Vec<u8>>) -> Self {
        Document {
            id: id.into(),
            raw: raw.into().into_boxed_slice(),
            date: None,
            label: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_label(mut self, label: impl Into<Box<str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[inline]
    pub fn id(&self) -> &DocId {
        &self.id
    }

    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[inline]
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Decode the raw bytes as UTF-8 text
    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.raw).map_err(|source| PipelineError::InvalidDocument {
            stage: Stage::Tokenize,
            doc_id: self.id.clone(),
            source,
        })
    }
}

/// Predicate deciding whether a document enters the pipeline at all.
/// Runs before tokenization.
pub trait DocumentFilter: Send + Sync {
    fn keep(&self, doc: &Document) -> bool;
}

/// Excludes retweets.
///
/// A document is a retweet when its raw text starts with `prefix`
/// (byte-exact and case-sensitive, no leading whitespace skipped).
/// Only the ASCII marker is matched; full-width or localized variants pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetweetFilter {
    pub prefix: String,
}

impl Default for RetweetFilter {
    fn default() -> Self {
        RetweetFilter { prefix: "RT".to_string() }
    }
}

impl RetweetFilter {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        RetweetFilter { prefix: prefix.into() }
    }

    #[inline]
    pub fn is_retweet(&self, doc: &Document) -> bool {
        doc.raw().starts_with(self.prefix.as_bytes())
    }
}

impl DocumentFilter for RetweetFilter {
    fn keep(&self, doc: &Document) -> bool {
        !self.is_retweet(doc)
    }
}

impl<F> DocumentFilter for F
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn keep(&self, doc: &Document) -> bool {
        self(doc)
    }
}
