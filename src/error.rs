//! Error types shared by every pipeline stage.
//!
//! All errors are fatal to a run. Each variant names the stage that raised it
//! and, where one exists, the offending document.

use std::fmt;
use std::str::Utf8Error;

use serde::{Deserialize, Serialize};

use crate::document::DocId;

/// Pipeline stage, used to give errors and log events their context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Ingest,
    PreFilter,
    Tokenize,
    Clean,
    Lemmatize,
    Vectorize,
    Sparsity,
    Weighting,
    Sentiment,
    Classify,
    Config,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::PreFilter => "pre_filter",
            Stage::Tokenize => "tokenize",
            Stage::Clean => "clean",
            Stage::Lemmatize => "lemmatize",
            Stage::Vectorize => "vectorize",
            Stage::Sparsity => "sparsity",
            Stage::Weighting => "weighting",
            Stage::Sentiment => "sentiment",
            Stage::Classify => "classify",
            Stage::Config => "config",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building document-term features.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Raw document bytes are not valid UTF-8 text.
    #[error("[{stage}] document {doc_id} is not valid text: {source}")]
    InvalidDocument {
        stage: Stage,
        doc_id: DocId,
        #[source]
        source: Utf8Error,
    },

    /// Two input documents share an identifier.
    #[error("[{stage}] duplicate document id {doc_id}")]
    DuplicateDocument { stage: Stage, doc_id: DocId },

    /// No document yielded a single token after cleaning.
    #[error("[{stage}] no tokens survived cleaning across {documents} documents")]
    EmptyCorpus { stage: Stage, documents: usize },

    /// The sparsity filter removed every term.
    #[error("[{stage}] sparse threshold {sparse} removed all {terms} terms")]
    EmptyVocabulary { stage: Stage, sparse: f64, terms: usize },

    /// The lemmatizer returned nothing usable for a cleaned token.
    #[error("[{stage}] lemmatizer returned no lemma for {token:?} in document {doc_id}")]
    LemmatizerFailure {
        stage: Stage,
        doc_id: DocId,
        token: String,
    },

    /// A configuration value is out of its accepted range.
    #[error("[{stage}] invalid configuration: {message}")]
    InvalidConfig { stage: Stage, message: String },

    /// A cleaning rule pattern failed to compile.
    #[error("[{stage}] invalid cleaning pattern {pattern:?}: {source}")]
    InvalidPattern {
        stage: Stage,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A document selected for training carries no label.
    #[error("[{stage}] document {doc_id} has no label")]
    MissingLabel { stage: Stage, doc_id: DocId },

    /// Feature importances do not line up with the vocabulary.
    #[error("[{stage}] expected {expected} feature importances, got {got}")]
    FeatureMismatch {
        stage: Stage,
        expected: usize,
        got: usize,
    },

    /// A decoded snapshot breaks a matrix invariant.
    #[error("[{stage}] invalid snapshot: {message}")]
    InvalidSnapshot { stage: Stage, message: String },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_cbor::Error),
}

impl PipelineError {
    /// Stage that raised the error.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::InvalidDocument { stage, .. }
            | PipelineError::DuplicateDocument { stage, .. }
            | PipelineError::EmptyCorpus { stage, .. }
            | PipelineError::EmptyVocabulary { stage, .. }
            | PipelineError::LemmatizerFailure { stage, .. }
            | PipelineError::InvalidConfig { stage, .. }
            | PipelineError::InvalidPattern { stage, .. }
            | PipelineError::MissingLabel { stage, .. }
            | PipelineError::FeatureMismatch { stage, .. }
            | PipelineError::InvalidSnapshot { stage, .. } => *stage,
            PipelineError::ConfigParse(_) => Stage::Config,
            PipelineError::Snapshot(_) => Stage::Vectorize,
        }
    }

    /// Offending document, when the error concerns a single one.
    pub fn doc_id(&self) -> Option<&DocId> {
        match self {
            PipelineError::InvalidDocument { doc_id, .. }
            | PipelineError::DuplicateDocument { doc_id, .. }
            | PipelineError::LemmatizerFailure { doc_id, .. }
            | PipelineError::MissingLabel { doc_id, .. } => Some(doc_id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_stage_and_document() {
        let err = PipelineError::LemmatizerFailure {
            stage: Stage::Lemmatize,
            doc_id: DocId::from("doc7"),
            token: "runs".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("[lemmatize]"));
        assert!(msg.contains("doc7"));
        assert_eq!(err.stage(), Stage::Lemmatize);
        assert_eq!(err.doc_id().map(|d| d.as_str()), Some("doc7"));
    }

    #[test]
    fn corpus_level_errors_have_no_document() {
        let err = PipelineError::EmptyCorpus { stage: Stage::Vectorize, documents: 3 };
        assert!(err.doc_id().is_none());
        assert!(err.to_string().contains("3 documents"));
    }
}
