//! End-to-end feature pipeline.
//!
//! ```text
//! &[Document] -> ingest -> pre-filter -> tokenize/clean/lemmatize -> DTM -> sparsity
//! ```
//!
//! Per-document analysis may run on the rayon pool. Results are merged back in
//! ingestion order, so the output never depends on scheduling.

use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::{
    analysis::{
        analyze_document,
        cleaner::{Cleaner, CleanerConfig},
        lemmatizer::Lemmatizer,
        tokenizer::{Tokenizer, TokenizerConfig},
        AnalyzedDocument,
    },
    document::{DocId, Document, DocumentFilter, RetweetFilter},
    error::{PipelineError, Result, Stage},
    vectorizer::{
        dtm::DocumentTermMatrix,
        tfidf::{TfIdfMatrix, TfVariant},
    },
};

/// Pipeline configuration
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use dtm_vectorizer::PipelineConfig;
///
/// let config = PipelineConfig::from_json(r#"{ "parallel": true, "sparse": 0.95 }"#).unwrap();
/// assert!(config.parallel);
/// assert!(config.retweet_filter.is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Drop retweets before tokenization; `None` keeps them
    pub retweet_filter: Option<RetweetFilter>,
    pub tokenizer: TokenizerConfig,
    pub cleaner: CleanerConfig,
    /// Analyze documents on the rayon pool
    pub parallel: bool,
    /// Sparsity threshold applied after the matrix is built
    pub sparse: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            retweet_filter: Some(RetweetFilter::default()),
            tokenizer: TokenizerConfig::default(),
            cleaner: CleanerConfig::default(),
            parallel: false,
            sparse: None,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(sparse) = self.sparse {
            if !(sparse > 0.0 && sparse <= 1.0) {
                return Err(PipelineError::InvalidConfig {
                    stage: Stage::Config,
                    message: format!("sparse must be in (0, 1], got {sparse}"),
                });
            }
        }
        if let Some(filter) = &self.retweet_filter {
            if filter.prefix.is_empty() {
                return Err(PipelineError::InvalidConfig {
                    stage: Stage::Config,
                    message: "retweet prefix must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn with_retweet_filter(mut self, filter: Option<RetweetFilter>) -> Self {
        self.retweet_filter = filter;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerConfig) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_cleaner(mut self, cleaner: CleanerConfig) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_sparse(mut self, sparse: Option<f64>) -> Self {
        self.sparse = sparse;
        self
    }
}

/// Counts of what happened to the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineReport {
    /// documents given to `run`
    pub input: usize,
    /// documents dropped by the pre-filters
    pub pre_filtered: usize,
    /// documents left without a single token
    pub excluded_empty: usize,
    /// columns of the final matrix
    pub vocabulary: usize,
    /// stored cells of the final matrix
    pub nnz: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dtm: DocumentTermMatrix,
    pub report: PipelineReport,
}

impl PipelineOutput {
    /// tf-idf with groups chosen from the source documents
    ///
    /// `documents` should be the slice given to `run`. Rows whose document is
    /// not found, or for which `key` returns `None`, are skipped.
    pub fn tf_idf_by<G, F>(&self, documents: &[Document], variant: TfVariant, mut key: F) -> Result<TfIdfMatrix<G>>
    where
        G: std::hash::Hash + Eq + Clone,
        F: FnMut(&Document) -> Option<G>,
    {
        let by_id: HashMap<&str, &Document, RandomState> =
            documents.iter().map(|d| (d.id().as_str(), d)).collect();
        TfIdfMatrix::compute_with(&self.dtm, variant, |id| {
            by_id.get(id.as_str()).and_then(|doc| key(doc))
        })
    }

    /// One group per document
    pub fn tf_idf_by_document(&self, variant: TfVariant) -> Result<TfIdfMatrix<DocId>> {
        TfIdfMatrix::by_document(&self.dtm, variant)
    }

    /// One group per label; unlabelled documents are skipped
    pub fn tf_idf_by_label(&self, documents: &[Document], variant: TfVariant) -> Result<TfIdfMatrix<Box<str>>> {
        self.tf_idf_by(documents, variant, |doc| doc.label().map(Box::from))
    }

    /// One group per calendar date; undated documents are skipped
    pub fn tf_idf_by_date(&self, documents: &[Document], variant: TfVariant) -> Result<TfIdfMatrix<NaiveDate>> {
        self.tf_idf_by(documents, variant, Document::date)
    }
}

/// Document-term feature pipeline
pub struct Pipeline<L> {
    filters: Vec<Box<dyn DocumentFilter>>,
    tokenizer: Tokenizer,
    cleaner: Cleaner,
    lemmatizer: L,
    parallel: bool,
    sparse: Option<f64>,
}

impl<L> Pipeline<L>
where
    L: Lemmatizer,
{
    /// Build a pipeline from a validated configuration
    ///
    /// # Errors
    /// [`PipelineError::InvalidConfig`] when `config` fails [`PipelineConfig::validate`].
    pub fn new(config: PipelineConfig, lemmatizer: L) -> Result<Self> {
        config.validate()?;
        let mut filters: Vec<Box<dyn DocumentFilter>> = Vec::new();
        if let Some(retweets) = config.retweet_filter {
            filters.push(Box::new(retweets));
        }
        Ok(Pipeline {
            filters,
            tokenizer: Tokenizer::new(config.tokenizer),
            cleaner: Cleaner::new(config.cleaner),
            lemmatizer,
            parallel: config.parallel,
            sparse: config.sparse,
        })
    }

    /// Add a pre-filter; a document must pass every filter to be analyzed
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: DocumentFilter + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }

    /// Run every stage over `documents`
    ///
    /// # Errors
    /// The first error in ingestion order; no partial output is returned.
    pub fn run(&self, documents: &[Document]) -> Result<PipelineOutput> {
        let _run = info_span!("pipeline", documents = documents.len(), parallel = self.parallel).entered();

        {
            let _stage = info_span!("stage", stage = %Stage::Ingest).entered();
            let mut seen: HashSet<&DocId, RandomState> = HashSet::default();
            for doc in documents {
                if !seen.insert(doc.id()) {
                    return Err(PipelineError::DuplicateDocument {
                        stage: Stage::Ingest,
                        doc_id: doc.id().clone(),
                    });
                }
            }
        }

        let kept: Vec<&Document> = {
            let _stage = info_span!("stage", stage = %Stage::PreFilter).entered();
            documents
                .iter()
                .filter(|doc| {
                    let keep = self.filters.iter().all(|f| f.keep(doc));
                    if !keep {
                        debug!(doc_id = %doc.id(), "document filtered out");
                    }
                    keep
                })
                .collect()
        };
        let pre_filtered = documents.len() - kept.len();
        info!(kept = kept.len(), pre_filtered, "pre-filter done");

        let analyzed = {
            let _stage = info_span!("stage", stage = "analyze").entered();
            self.analyze(&kept)?
        };

        let mut dtm = DocumentTermMatrix::from_documents(analyzed)?;
        if let Some(sparse) = self.sparse {
            dtm = dtm.remove_sparse_terms(sparse)?;
        }

        let report = PipelineReport {
            input: documents.len(),
            pre_filtered,
            excluded_empty: dtm.excluded().len(),
            vocabulary: dtm.n_terms(),
            nnz: dtm.nnz(),
        };
        info!(?report, "pipeline finished");
        Ok(PipelineOutput { dtm, report })
    }

    /// Tokenize, clean and lemmatize; results come back in input order
    fn analyze(&self, docs: &[&Document]) -> Result<Vec<AnalyzedDocument>> {
        let analyze = |doc: &&Document| analyze_document(doc, &self.tokenizer, &self.cleaner, &self.lemmatizer);
        if self.parallel {
            // collect every result first so the reported error is the first in input order
            let results: Vec<Result<AnalyzedDocument>> = docs.par_iter().map(analyze).collect();
            results.into_iter().collect()
        } else {
            docs.iter().map(analyze).collect()
        }
    }
}
