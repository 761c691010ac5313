use serde::{Deserialize, Serialize};

use crate::document::DocId;

/// Kind of token recognized by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    Hashtag,
    Mention,
    Url,
}

/// Token
/// A surface form tagged with its document and ordinal position.
/// Position is for traceability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub doc_id: &'a DocId,
    pub position: usize,
    pub text: String,
    pub kind: TokenKind,
}

/// Token after cleaning
/// The surface form is never empty nor whitespace-only.
/// Only the cleaner constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedToken<'a> {
    doc_id: &'a DocId,
    position: usize,
    text: String,
    kind: TokenKind,
}

impl<'a> CleanedToken<'a> {
    /// `text` must already be trimmed and non-empty
    pub(crate) fn new_unchecked(token: Token<'a>, text: String) -> Self {
        debug_assert!(!text.trim().is_empty());
        CleanedToken {
            doc_id: token.doc_id,
            position: token.position,
            text,
            kind: token.kind,
        }
    }

    #[inline]
    pub fn doc_id(&self) -> &'a DocId {
        self.doc_id
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.kind
    }
}

/// Cleaned tokens can be fed back into the cleaner
impl<'a> From<CleanedToken<'a>> for Token<'a> {
    fn from(value: CleanedToken<'a>) -> Self {
        Token {
            doc_id: value.doc_id,
            position: value.position,
            text: value.text,
            kind: value.kind,
        }
    }
}

/// Cleaned token whose surface form was replaced by its root form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lemma<'a> {
    pub doc_id: &'a DocId,
    pub position: usize,
    pub surface: String,
    pub lemma: String,
}
