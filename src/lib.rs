/// This crate turns short political and social-media texts into document-term features.
pub mod analysis;
pub mod classify;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod sentiment;
pub mod utils;
pub mod vectorizer;

/// Pipeline
/// The top-level entry point of this crate.
/// It runs the per-document stages and builds the document-term matrix:
/// - pre-filtering (retweets and caller-supplied predicates)
/// - tokenization (simple or social mode)
/// - cleaning (ordered regex rules, stopwords, letter requirement)
/// - lemmatization through a `Lemmatizer` collaborator
/// - matrix construction and the optional sparsity filter
///
/// `Pipeline<L>` is generic over the lemmatizer `L`.
///
/// Per-document stages run on the rayon pool when `parallel` is set.
/// Results are merged in ingestion order, so the matrix is identical either way.
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput, PipelineReport};

/// Document and pre-filter types
/// A `Document` holds its id, raw bytes, and optional date and label.
/// Raw bytes are decoded only at tokenization, so undecodable input is
/// reported with the offending document id.
pub use document::{DocId, Document, DocumentFilter, RetweetFilter};

/// Error type shared by every stage
/// Every variant carries the `Stage` that raised it.
pub use error::{PipelineError, Result, Stage};

/// Text analysis stages
pub use analysis::{
    cleaner::{CleanRule, Cleaner, CleanerConfig, Stopwords},
    lemmatizer::{DictionaryLemmatizer, IdentityLemmatizer, Lemmatizer},
    tokenizer::{Tokenizer, TokenizerConfig, TokenizerMode},
    AnalyzedDocument,
};

/// Document-Term Matrix
/// Rows are documents in ingestion order, columns the vocabulary in
/// lexicographic byte order. Only non-zero counts are stored.
///
/// # Serialization
/// Supported, through serde. `to_cbor` / `from_cbor` give a compact snapshot.
pub use vectorizer::dtm::{DocumentTermMatrix, SparseRow};

/// Vocabulary
/// Distinct terms in lexicographic byte order; index `i` is column `i`.
pub use vectorizer::vocabulary::Vocabulary;

/// Term Frequency structure
/// Multiset of lemmas within one document.
/// It manages:
/// - The count of occurrences of each term
/// - The total number of terms in the document
pub use vectorizer::term::TermFrequency;

/// Corpus
/// Document frequency of every term across a set of documents.
/// It does not store document text or ids.
pub use vectorizer::corpus::Corpus;

/// TF IDF Calculation Engine Trait
/// By implementing this trait, you can plug different tf / idf formulas into
/// `TfIdfMatrix::compute`. `DefaultTfIdfEngine` normalizes tf by the group's
/// term total, `RawCountEngine` uses plain counts.
pub use vectorizer::tfidf::{DefaultTfIdfEngine, RawCountEngine, TfIdfEngine, TfIdfEntry, TfIdfMatrix, TfVariant};

/// Ranked terms of a tf-idf group
pub use vectorizer::hits::{TermHits, WeightedTerm};

/// Compressed sparse row export of the matrix
pub use vectorizer::csr::CsrMatrix;

/// Lexicon sentiment scoring
pub use sentiment::{score_documents, DocumentSentiment, MapLexicon, SentimentLexicon};

/// Classifier hand-off
pub use classify::{rank_features, Classifier, TrainedModel, TrainingSet};
