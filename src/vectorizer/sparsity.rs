use indexmap::IndexMap;
use tracing::info;

use crate::{
    error::{PipelineError, Result, Stage},
    vectorizer::dtm::{DocumentTermMatrix, SparseRow},
};

impl DocumentTermMatrix {
    /// Remove sparse terms
    ///
    /// A term is kept iff the fraction of documents *missing* it is at most
    /// `sparse`, i.e. its coverage is at least `1 - sparse`. `sparse = 1`
    /// keeps every term. Rows and surviving counts are untouched; kept columns
    /// are re-indexed contiguously in their original order.
    ///
    /// # Arguments
    /// * `sparse` - maximal allowed sparsity of a kept term, in `(0, 1]`
    ///
    /// # Errors
    /// * `InvalidConfig` - `sparse` outside `(0, 1]`
    /// * `EmptyVocabulary` - no term survives
    pub fn remove_sparse_terms(&self, sparse: f64) -> Result<DocumentTermMatrix> {
        if !(sparse > 0.0 && sparse <= 1.0) {
            return Err(PipelineError::InvalidConfig {
                stage: Stage::Sparsity,
                message: format!("sparse must be in (0, 1], got {sparse}"),
            });
        }

        let n_docs = self.n_docs() as u64;
        let keep: Vec<u32> = (0..self.n_terms() as u32)
            .filter(|&idx| {
                let missing = n_docs - self.document_frequency(idx);
                missing as f64 / n_docs as f64 <= sparse
            })
            .collect();

        if keep.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                stage: Stage::Sparsity,
                sparse,
                terms: self.n_terms(),
            });
        }

        // old column -> new column
        let mut remap = vec![u32::MAX; self.n_terms()];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            remap[old_idx as usize] = new_idx as u32;
        }

        let rows: IndexMap<_, _> = self
            .rows
            .iter()
            .map(|(id, row)| {
                let kept = row.iter().filter_map(|(idx, count)| {
                    let new_idx = remap[idx as usize];
                    (new_idx != u32::MAX).then_some((new_idx, count))
                });
                (id.clone(), SparseRow::from_pairs(kept))
            })
            .collect();

        info!(
            sparse,
            before = self.n_terms(),
            after = keep.len(),
            "sparse terms removed"
        );

        Ok(DocumentTermMatrix::from_parts(
            self.vocabulary.select(&keep),
            rows,
            self.excluded.clone(),
        ))
    }
}
