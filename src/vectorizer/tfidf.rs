use std::{collections::BTreeMap, hash::Hash};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    document::DocId,
    error::{PipelineError, Result, Stage},
    vectorizer::{dtm::DocumentTermMatrix, hits::{TermHits, WeightedTerm}, vocabulary::Vocabulary},
};

/// TF-IDF calculation engine
///
/// Plug a different weighting into `TfIdfMatrix::compute`.
pub trait TfIdfEngine {
    /// Term frequency of a term occurring `count` times among `group_total` terms
    fn tf(count: u64, group_total: u64) -> f64;

    /// Inverse document frequency over `n_groups` groups, `doc_freq` of which
    /// contain the term. `doc_freq` is never 0 for a stored entry.
    #[inline]
    fn idf(n_groups: u64, doc_freq: u64) -> f64 {
        (n_groups as f64 / doc_freq as f64).ln()
    }
}

/// Default engine
/// `tf = count / total`, `idf = ln(N / n)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTfIdfEngine;

impl TfIdfEngine for DefaultTfIdfEngine {
    #[inline]
    fn tf(count: u64, group_total: u64) -> f64 {
        count as f64 / group_total as f64
    }
}

/// Raw count engine
/// `tf = count`, `idf = ln(N / n)`
#[derive(Debug, Clone, Copy, Default)]
pub struct RawCountEngine;

impl TfIdfEngine for RawCountEngine {
    #[inline]
    fn tf(count: u64, _group_total: u64) -> f64 {
        count as f64
    }
}

/// Runtime choice of term-frequency variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TfVariant {
    /// count divided by the group's term total
    #[default]
    Normalized,
    /// plain count
    Raw,
}

/// One non-zero cell of a tf-idf matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfIdfEntry {
    /// column in the vocabulary
    pub term: u32,
    /// raw count of the term in the group
    pub n: u64,
    pub tf: f64,
    pub idf: f64,
    pub tf_idf: f64,
}

/// TF-IDF weights per group
///
/// A group is whatever plays the role of "document" for IDF: the documents
/// themselves, their labels, or any other key. Only terms that occur in a
/// group have an entry; a term occurring in every group has an entry with
/// weight `0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfMatrix<G: Hash + Eq> {
    vocabulary: Vocabulary,
    groups: IndexMap<G, Vec<TfIdfEntry>>,
}

impl TfIdfMatrix<DocId> {
    /// One group per document
    pub fn by_document(dtm: &DocumentTermMatrix, variant: TfVariant) -> Result<Self> {
        Self::compute_with(dtm, variant, |id| Some(id.clone()))
    }
}

impl<G> TfIdfMatrix<G>
where
    G: Hash + Eq + Clone,
{
    /// Compute with a variant chosen at runtime
    pub fn compute_with<F>(dtm: &DocumentTermMatrix, variant: TfVariant, group_of: F) -> Result<Self>
    where
        F: FnMut(&DocId) -> Option<G>,
    {
        match variant {
            TfVariant::Normalized => Self::compute::<DefaultTfIdfEngine, F>(dtm, group_of),
            TfVariant::Raw => Self::compute::<RawCountEngine, F>(dtm, group_of),
        }
    }

    /// Compute tf-idf over the groups produced by `group_of`
    ///
    /// Rows mapped to `None` are skipped. Groups are kept in first-seen
    /// order; groups without any term are dropped and do not count in `N`.
    ///
    /// # Errors
    /// * `EmptyCorpus` - no group has a single term
    pub fn compute<E, F>(dtm: &DocumentTermMatrix, mut group_of: F) -> Result<Self>
    where
        E: TfIdfEngine,
        F: FnMut(&DocId) -> Option<G>,
    {
        let mut bags: IndexMap<G, BTreeMap<u32, u64>> = IndexMap::new();
        let mut skipped = 0usize;
        for (id, row) in dtm.rows() {
            let Some(group) = group_of(id) else {
                skipped += 1;
                continue;
            };
            let bag = bags.entry(group).or_default();
            for (idx, count) in row.iter() {
                *bag.entry(idx).or_insert(0) += count;
            }
        }
        if skipped > 0 {
            debug!(skipped, "rows without a group skipped");
        }
        bags.retain(|_, bag| !bag.is_empty());
        if bags.is_empty() {
            return Err(PipelineError::EmptyCorpus {
                stage: Stage::Weighting,
                documents: dtm.n_docs(),
            });
        }

        let mut group_freq = vec![0u64; dtm.n_terms()];
        for bag in bags.values() {
            for &idx in bag.keys() {
                group_freq[idx as usize] += 1;
            }
        }
        let n_groups = bags.len() as u64;

        let groups: IndexMap<G, Vec<TfIdfEntry>> = bags
            .into_iter()
            .map(|(group, bag)| {
                let total: u64 = bag.values().sum();
                let entries = bag
                    .into_iter()
                    .map(|(term, n)| {
                        let tf = E::tf(n, total);
                        let idf = E::idf(n_groups, group_freq[term as usize]);
                        TfIdfEntry { term, n, tf, idf, tf_idf: tf * idf }
                    })
                    .collect();
                (group, entries)
            })
            .collect();

        info!(groups = groups.len(), terms = dtm.n_terms(), "tf-idf computed");
        Ok(TfIdfMatrix {
            vocabulary: dtm.vocabulary().clone(),
            groups,
        })
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[inline]
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Groups in first-seen order
    pub fn groups(&self) -> impl Iterator<Item = &G> {
        self.groups.keys()
    }

    /// Entries of a group, in column order
    pub fn entries(&self, group: &G) -> Option<&[TfIdfEntry]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    /// Entry of `term` in `group`
    pub fn entry(&self, group: &G, term: &str) -> Option<&TfIdfEntry> {
        let idx = self.vocabulary.index_of(term)?;
        let entries = self.groups.get(group)?;
        entries
            .binary_search_by_key(&idx, |e| e.term)
            .ok()
            .map(|pos| &entries[pos])
    }

    /// Weight of `term` in `group`, 0 when the term does not occur there
    pub fn weight(&self, group: &G, term: &str) -> f64 {
        self.entry(group, term).map_or(0.0, |e| e.tf_idf)
    }

    /// Top `n` terms of a group by weight, descending, ties by term ascending
    pub fn top_terms(&self, group: &G, n: usize) -> TermHits<'_> {
        let list = self
            .groups
            .get(group)
            .map(|entries| self.weighted(entries))
            .unwrap_or_default();
        let mut hits = TermHits::new(list);
        hits.sort_by_weight().truncate(n);
        hits
    }

    /// `top_terms` for every group, in group order
    pub fn top_terms_by_group(&self, n: usize) -> IndexMap<&G, TermHits<'_>> {
        self.groups
            .iter()
            .map(|(group, entries)| {
                let mut hits = TermHits::new(self.weighted(entries));
                hits.sort_by_weight().truncate(n);
                (group, hits)
            })
            .collect()
    }

    fn weighted<'a>(&'a self, entries: &'a [TfIdfEntry]) -> Vec<WeightedTerm<'a>> {
        entries
            .iter()
            .filter_map(|e| {
                self.vocabulary.term(e.term).map(|term| WeightedTerm {
                    term,
                    n: e.n,
                    tf: e.tf,
                    idf: e.idf,
                    tf_idf: e.tf_idf,
                })
            })
            .collect()
    }
}
