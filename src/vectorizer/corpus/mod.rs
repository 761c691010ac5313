use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

/// Document frequencies of a corpus
/// Keeps, per term, the number of documents containing it.
/// Base data for the vocabulary, coverage and IDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    term_counts: HashMap<Box<str>, u64, RandomState>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            term_counts: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add one document's distinct terms
    /// Each term must appear at most once in `terms`.
    pub fn add_set<I, T>(&mut self, terms: I)
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref();
            match self.term_counts.get_mut(term) {
                Some(count) => *count += 1,
                None => {
                    self.term_counts.insert(term.into(), 1);
                }
            }
        }
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// All terms, unordered
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.term_counts.keys().map(|t| &**t)
    }
}
