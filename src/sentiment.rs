//! Lexicon-based sentiment scoring over a document-term matrix.
//!
//! Two kinds of lexicon are supported through one trait: numeric lexicons
//! that give a term a signed score, and categorical lexicons that put a
//! term into one or more classes such as `positive` or `anger`.

use std::collections::{BTreeMap, HashMap};

use ahash::RandomState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{document::DocId, vectorizer::dtm::DocumentTermMatrix};

/// Term-level sentiment source
pub trait SentimentLexicon: Send + Sync {
    /// Signed score of `term`, `None` when the term is not in the lexicon
    fn score(&self, term: &str) -> Option<f64>;

    /// Categories of `term`
    fn categories(&self, term: &str) -> &[Box<str>] {
        let _ = term;
        &[]
    }
}

/// In-memory lexicon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapLexicon {
    scores: HashMap<Box<str>, f64, RandomState>,
    categories: HashMap<Box<str>, Vec<Box<str>>, RandomState>,
}

impl MapLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, term: &str, score: f64) -> Self {
        self.scores.insert(term.into(), score);
        self
    }

    pub fn with_category(mut self, term: &str, category: &str) -> Self {
        let list = self.categories.entry(term.into()).or_default();
        if !list.iter().any(|c| &**c == category) {
            list.push(category.into());
        }
        self
    }

    /// Number of terms with a score or a category
    pub fn len(&self) -> usize {
        self.categories
            .keys()
            .filter(|t| !self.scores.contains_key(*t))
            .count()
            + self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty() && self.categories.is_empty()
    }
}

impl SentimentLexicon for MapLexicon {
    fn score(&self, term: &str) -> Option<f64> {
        self.scores.get(term).copied()
    }

    fn categories(&self, term: &str) -> &[Box<str>] {
        self.categories.get(term).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Sentiment of one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSentiment {
    /// count-weighted sum of term scores
    pub score: f64,
    /// tokens that had a score or a category
    pub matched: u64,
    /// token count per category
    pub categories: BTreeMap<Box<str>, u64>,
}

impl DocumentSentiment {
    /// Tokens in `category`
    pub fn category(&self, category: &str) -> u64 {
        self.categories.get(category).copied().unwrap_or(0)
    }

    /// `positive - negative` category counts
    pub fn net(&self, positive: &str, negative: &str) -> i64 {
        self.category(positive) as i64 - self.category(negative) as i64
    }
}

/// Score every row of `dtm`, in row order
pub fn score_documents<L>(dtm: &DocumentTermMatrix, lexicon: &L) -> IndexMap<DocId, DocumentSentiment>
where
    L: SentimentLexicon + ?Sized,
{
    // resolve each column once
    let columns: Vec<(Option<f64>, &[Box<str>])> = dtm
        .vocabulary()
        .iter()
        .map(|term| (lexicon.score(term), lexicon.categories(term)))
        .collect();

    let scored: IndexMap<DocId, DocumentSentiment> = dtm
        .rows()
        .map(|(id, row)| {
            let mut sentiment = DocumentSentiment::default();
            for (idx, count) in row.iter() {
                let (score, categories) = columns[idx as usize];
                if score.is_none() && categories.is_empty() {
                    continue;
                }
                sentiment.matched += count;
                if let Some(score) = score {
                    sentiment.score += score * count as f64;
                }
                for category in categories {
                    *sentiment.categories.entry(category.clone()).or_insert(0) += count;
                }
            }
            (id.clone(), sentiment)
        })
        .collect();

    let matched = scored.values().filter(|s| s.matched > 0).count();
    info!(documents = scored.len(), matched, "sentiment scored");
    scored
}
