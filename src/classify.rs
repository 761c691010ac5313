//! Hand-off of a document-term matrix to a supervised classifier.
//!
//! The crate does not train anything itself. It lays the features out as a
//! CSR matrix with labels aligned to rows, and maps the feature importances
//! a trained model reports back onto vocabulary terms.

use tracing::info;

use crate::{
    document::DocId,
    error::{PipelineError, Result, Stage},
    vectorizer::{csr::CsrMatrix, dtm::DocumentTermMatrix, vocabulary::Vocabulary},
};

/// Features and labels ready for training
///
/// Row `i` of `features` is row `i` of the source matrix, `labels[i]` its label
/// and `doc_ids[i]` its document. Columns follow the vocabulary.
#[derive(Debug, Clone)]
pub struct TrainingSet<L> {
    pub features: CsrMatrix<f64>,
    pub labels: Vec<L>,
    pub doc_ids: Vec<DocId>,
    pub vocabulary: Vocabulary,
}

impl<L> TrainingSet<L> {
    /// Build from `dtm`, asking `label_of` for the label of every row
    ///
    /// # Errors
    /// * `MissingLabel` - `label_of` returned `None` for a row
    pub fn from_dtm<F>(dtm: &DocumentTermMatrix, mut label_of: F) -> Result<Self>
    where
        F: FnMut(&DocId) -> Option<L>,
    {
        let mut labels = Vec::with_capacity(dtm.n_docs());
        let mut doc_ids = Vec::with_capacity(dtm.n_docs());
        for id in dtm.doc_ids() {
            let label = label_of(id).ok_or_else(|| PipelineError::MissingLabel {
                stage: Stage::Classify,
                doc_id: id.clone(),
            })?;
            labels.push(label);
            doc_ids.push(id.clone());
        }
        let features = dtm.to_csr::<f64>()?;
        info!(rows = features.n_rows, cols = features.n_cols, "training set prepared");
        Ok(TrainingSet {
            features,
            labels,
            doc_ids,
            vocabulary: dtm.vocabulary().clone(),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Train `classifier` on this set
    pub fn train<C>(&self, classifier: &mut C) -> std::result::Result<TrainedModel<C::Model>, C::Error>
    where
        C: Classifier<L>,
    {
        classifier.train(&self.features, &self.labels)
    }
}

/// A trained model together with one importance per feature column
#[derive(Debug, Clone)]
pub struct TrainedModel<M> {
    pub model: M,
    pub importance: Vec<f64>,
}

/// Supervised classifier collaborator
pub trait Classifier<L> {
    type Model;
    type Error: std::error::Error;

    /// Fit on `features` with one label per row
    fn train(
        &mut self,
        features: &CsrMatrix<f64>,
        labels: &[L],
    ) -> std::result::Result<TrainedModel<Self::Model>, Self::Error>;
}

/// Pair importances with vocabulary terms, most important first
///
/// Ties keep vocabulary order. NaN importances are dropped.
///
/// # Errors
/// * `FeatureMismatch` - `importance` is not one value per vocabulary term
pub fn rank_features<'v>(vocabulary: &'v Vocabulary, importance: &[f64]) -> Result<Vec<(&'v str, f64)>> {
    if importance.len() != vocabulary.len() {
        return Err(PipelineError::FeatureMismatch {
            stage: Stage::Classify,
            expected: vocabulary.len(),
            got: importance.len(),
        });
    }
    let mut ranked: Vec<(&str, f64)> = vocabulary
        .iter()
        .zip(importance.iter().copied())
        .filter(|(_, imp)| !imp.is_nan())
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranked)
}
