use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Vocabulary
/// Distinct terms of a corpus in lexicographic byte order of their UTF-8
/// encoding. Index `i` is column `i` of every matrix built over it, so the
/// column order is reproducible across runs and implementations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<Box<str>>,
}

impl Vocabulary {
    /// Build from any terms; duplicates are collapsed and the result sorted
    pub fn from_terms<I, T>(terms: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut sorted: Vec<Box<str>> = terms.into_iter().map(|t| t.as_ref().into()).collect();
        sorted.sort_unstable();
        sorted.dedup();
        Vocabulary {
            terms: sorted.into_iter().collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column index of `term`
    #[inline]
    pub fn index_of(&self, term: &str) -> Option<u32> {
        self.terms.get_index_of(term).map(|i| i as u32)
    }

    /// Term at column `index`
    #[inline]
    pub fn term(&self, index: u32) -> Option<&str> {
        self.terms.get_index(index as usize).map(|t| &**t)
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Terms in column order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| &**t)
    }

    /// Keep the columns whose index is in `keep` (ascending), order preserved
    pub(crate) fn select(&self, keep: &[u32]) -> Self {
        Vocabulary {
            terms: keep
                .iter()
                .filter_map(|&i| self.terms.get_index(i as usize).cloned())
                .collect(),
        }
    }
}
