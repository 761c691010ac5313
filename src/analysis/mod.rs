//! Text analysis stages run per document: tokenize, clean, lemmatize.
//!
//! ```text
//! Document -> Tokenizer -> Cleaner -> Lemmatizer -> TermFrequency
//! ```
//!
//! Every stage is pure per document, so documents can be analyzed in parallel.

pub mod cleaner;
pub mod lemmatizer;
pub mod token;
pub mod tokenizer;

use crate::{document::{DocId, Document}, error::Result, vectorizer::term::TermFrequency};

use self::{cleaner::Cleaner, lemmatizer::{lemmatize_token, Lemmatizer}, tokenizer::Tokenizer};

/// Lemma counts of one document
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub id: DocId,
    pub terms: TermFrequency,
}

/// Run tokenize, clean and lemmatize over one document
pub fn analyze_document<L>(
    doc: &Document,
    tokenizer: &Tokenizer,
    cleaner: &Cleaner,
    lemmatizer: &L,
) -> Result<AnalyzedDocument>
where
    L: Lemmatizer + ?Sized,
{
    let mut terms = TermFrequency::new();
    for token in cleaner.clean(tokenizer.tokenize(doc)?) {
        let lemma = lemmatize_token(lemmatizer, token)?;
        terms.add_term(&lemma.lemma);
    }
    Ok(AnalyzedDocument {
        id: doc.id().clone(),
        terms,
    })
}
