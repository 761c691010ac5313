use std::collections::HashSet;

use ahash::RandomState;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    analysis::AnalyzedDocument,
    document::DocId,
    error::{PipelineError, Result, Stage},
    utils::sort::radix_sort_u32_soa,
    vectorizer::{corpus::Corpus, vocabulary::Vocabulary},
};

/// Sparse row of a document-term matrix
/// Term indices are strictly ascending; every stored count is > 0.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SparseRow {
    indices: Vec<u32>,
    counts: Vec<u64>,
}

impl SparseRow {
    /// Build from unordered, distinct `(index, count)` pairs; zero counts are dropped
    pub(crate) fn from_pairs(pairs: impl IntoIterator<Item = (u32, u64)>) -> Self {
        let (mut indices, mut counts): (Vec<u32>, Vec<u64>) =
            pairs.into_iter().filter(|&(_, c)| c > 0).unzip();
        radix_sort_u32_soa(&mut indices, &mut counts);
        SparseRow { indices, counts }
    }

    /// Count at column `index`, 0 when absent
    #[inline]
    pub fn get(&self, index: u32) -> u64 {
        self.indices
            .binary_search(&index)
            .map_or(0, |pos| self.counts[pos])
    }

    /// Non-zero `(index, count)` pairs in column order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.indices.iter().copied().zip(self.counts.iter().copied())
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Number of stored entries
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Sum of counts in this row
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Document-term matrix
///
/// Rows are documents in ingestion order, columns are the vocabulary in
/// lexicographic order. Zero cells are never stored. Documents that yielded
/// no token are not rows; their ids are kept in `excluded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTermMatrix {
    pub(crate) vocabulary: Vocabulary,
    pub(crate) rows: IndexMap<DocId, SparseRow>,
    /// documents containing each column
    pub(crate) doc_freq: Vec<u64>,
    pub(crate) excluded: Vec<DocId>,
}

impl DocumentTermMatrix {
    /// Build the vocabulary and the sparse matrix from per-document lemma counts
    ///
    /// # Errors
    /// * `DuplicateDocument` - two inputs share an id
    /// * `EmptyCorpus` - no document has a single term
    pub fn from_documents<I>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = AnalyzedDocument>,
    {
        let mut corpus = Corpus::new();
        let mut kept: IndexMap<DocId, _> = IndexMap::new();
        let mut excluded = Vec::new();
        let mut seen: HashSet<DocId, RandomState> = HashSet::default();

        for doc in documents {
            if !seen.insert(doc.id.clone()) {
                return Err(PipelineError::DuplicateDocument {
                    stage: Stage::Vectorize,
                    doc_id: doc.id,
                });
            }
            if doc.terms.is_empty() {
                debug!(doc_id = %doc.id, "document has no surviving tokens");
                excluded.push(doc.id);
                continue;
            }
            corpus.add_set(doc.terms.term_set_iter());
            kept.insert(doc.id, doc.terms);
        }

        if kept.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                stage: Stage::Vectorize,
                documents: seen.len(),
            });
        }
        if !excluded.is_empty() {
            warn!(excluded = excluded.len(), "documents without tokens excluded from the matrix");
        }

        let vocabulary = Vocabulary::from_terms(corpus.terms());
        let doc_freq = vocabulary.iter().map(|t| corpus.get_term_count(t)).collect();
        let rows = kept
            .into_iter()
            .map(|(id, terms)| {
                let row = SparseRow::from_pairs(terms.iter().filter_map(|(term, count)| {
                    vocabulary.index_of(term).map(|idx| (idx, count))
                }));
                (id, row)
            })
            .collect();

        let dtm = DocumentTermMatrix {
            vocabulary,
            rows,
            doc_freq,
            excluded,
        };
        info!(
            documents = dtm.n_docs(),
            terms = dtm.n_terms(),
            nnz = dtm.nnz(),
            "document-term matrix built"
        );
        Ok(dtm)
    }

    /// Assemble from already-indexed rows, recomputing document frequencies
    pub(crate) fn from_parts(
        vocabulary: Vocabulary,
        rows: IndexMap<DocId, SparseRow>,
        excluded: Vec<DocId>,
    ) -> Self {
        let mut doc_freq = vec![0u64; vocabulary.len()];
        for row in rows.values() {
            for &idx in row.indices() {
                doc_freq[idx as usize] += 1;
            }
        }
        DocumentTermMatrix {
            vocabulary,
            rows,
            doc_freq,
            excluded,
        }
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Number of rows
    #[inline]
    pub fn n_docs(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    #[inline]
    pub fn n_terms(&self) -> usize {
        self.vocabulary.len()
    }

    /// Documents dropped because no token survived cleaning
    #[inline]
    pub fn excluded(&self) -> &[DocId] {
        &self.excluded
    }

    /// Row of a document
    #[inline]
    pub fn row(&self, doc_id: &str) -> Option<&SparseRow> {
        self.rows.get(doc_id)
    }

    /// Rows in ingestion order
    pub fn rows(&self) -> impl Iterator<Item = (&DocId, &SparseRow)> {
        self.rows.iter()
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = &DocId> {
        self.rows.keys()
    }

    /// Count of `term` in `doc_id`, 0 when either is unknown
    pub fn count(&self, doc_id: &str, term: &str) -> u64 {
        match (self.rows.get(doc_id), self.vocabulary.index_of(term)) {
            (Some(row), Some(idx)) => row.get(idx),
            _ => 0,
        }
    }

    /// Every stored `(document, column, count)`, row-major
    pub fn entries(&self) -> impl Iterator<Item = (&DocId, u32, u64)> {
        self.rows
            .iter()
            .flat_map(|(id, row)| row.iter().map(move |(idx, count)| (id, idx, count)))
    }

    /// Number of stored cells
    pub fn nnz(&self) -> usize {
        self.rows.values().map(SparseRow::nnz).sum()
    }

    /// Number of documents containing column `index`
    #[inline]
    pub fn document_frequency(&self, index: u32) -> u64 {
        self.doc_freq.get(index as usize).copied().unwrap_or(0)
    }

    /// Fraction of documents containing column `index`
    pub fn coverage(&self, index: u32) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.document_frequency(index) as f64 / self.rows.len() as f64
    }

    /// Fraction of zero cells, in `[0, 1]`
    pub fn sparsity(&self) -> f64 {
        let cells = self.n_docs() * self.n_terms();
        if cells == 0 {
            return 0.0;
        }
        1.0 - self.nnz() as f64 / cells as f64
    }

    /// Column totals, most frequent first, ties in dictionary order
    pub fn term_totals(&self) -> Vec<(&str, u64)> {
        let mut totals = vec![0u64; self.n_terms()];
        for (_, idx, count) in self.entries() {
            totals[idx as usize] += count;
        }
        let mut list: Vec<(&str, u64)> = self.vocabulary.iter().zip(totals).collect();
        // vocabulary is already in dictionary order, a stable sort keeps it for ties
        list.sort_by(|a, b| b.1.cmp(&a.1));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::term::TermFrequency;

    fn doc(id: &str, terms: &[&str]) -> AnalyzedDocument {
        AnalyzedDocument {
            id: DocId::from(id),
            terms: TermFrequency::from(terms),
        }
    }

    #[test]
    fn builds_sparse_rows_over_sorted_vocabulary() {
        let dtm = DocumentTermMatrix::from_documents(vec![
            doc("d1", &["tax", "cut", "tax"]),
            doc("d2", &["vote"]),
            doc("d3", &[]),
        ])
        .unwrap();

        assert_eq!(dtm.vocabulary().iter().collect::<Vec<_>>(), vec!["cut", "tax", "vote"]);
        assert_eq!(dtm.n_docs(), 2);
        assert_eq!(dtm.excluded(), &[DocId::from("d3")]);
        assert_eq!(dtm.count("d1", "tax"), 2);
        assert_eq!(dtm.count("d1", "vote"), 0);
        assert_eq!(dtm.count("d3", "tax"), 0);
        assert_eq!(dtm.row("d1").unwrap().indices(), &[0, 1]);
        assert_eq!(dtm.nnz(), 3);
        assert_eq!(dtm.document_frequency(1), 1);
        assert!((dtm.sparsity() - 0.5).abs() < 1e-12);
        assert_eq!(dtm.term_totals(), vec![("tax", 2), ("cut", 1), ("vote", 1)]);
    }

    #[test]
    fn no_explicit_zeros() {
        let dtm = DocumentTermMatrix::from_documents(vec![
            doc("a", &["x", "y"]),
            doc("b", &["y", "z", "z"]),
        ])
        .unwrap();
        assert!(dtm.entries().all(|(_, _, count)| count > 0));
        let ids: Vec<&str> = dtm.doc_ids().map(DocId::as_str).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn empty_corpus_fails() {
        let err = DocumentTermMatrix::from_documents(vec![doc("a", &[]), doc("b", &[])]).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyCorpus { documents: 2, .. }));
    }

    #[test]
    fn duplicate_ids_fail() {
        let err = DocumentTermMatrix::from_documents(vec![doc("a", &["x"]), doc("a", &["y"])]).unwrap_err();
        assert_eq!(err.doc_id().map(DocId::as_str), Some("a"));
    }

    #[test]
    fn from_parts_recomputes_document_frequency() {
        let dtm = DocumentTermMatrix::from_documents(vec![
            doc("a", &["x", "y"]),
            doc("b", &["y"]),
        ])
        .unwrap();
        let rebuilt = DocumentTermMatrix::from_parts(
            dtm.vocabulary.clone(),
            dtm.rows.clone(),
            dtm.excluded.clone(),
        );
        assert_eq!(rebuilt, dtm);
    }
}
