use std::collections::HashMap;

use ahash::RandomState;

use crate::{analysis::token::{CleanedToken, Lemma}, error::{PipelineError, Result, Stage}};

/// Maps a surface form to its canonical root.
///
/// Implementations must be deterministic and side-effect free. Returning
/// `None` (or a blank string) violates the contract and fails the run.
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, surface: &str) -> Option<String>;
}

impl<F> Lemmatizer for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn lemmatize(&self, surface: &str) -> Option<String> {
        self(surface)
    }
}

/// Returns every surface form unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, surface: &str) -> Option<String> {
        Some(surface.to_string())
    }
}

/// Dictionary-backed lemmatizer
/// Looks the surface form up in a table and falls back to the form itself.
#[derive(Debug, Clone, Default)]
pub struct DictionaryLemmatizer {
    table: HashMap<Box<str>, Box<str>, RandomState>,
}

impl DictionaryLemmatizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, surface: &str, lemma: &str) -> &mut Self {
        self.table.insert(surface.into(), lemma.into());
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<S, L> FromIterator<(S, L)> for DictionaryLemmatizer
where
    S: AsRef<str>,
    L: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (S, L)>>(iter: T) -> Self {
        let mut lemmatizer = DictionaryLemmatizer::new();
        for (surface, lemma) in iter {
            lemmatizer.insert(surface.as_ref(), lemma.as_ref());
        }
        lemmatizer
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn lemmatize(&self, surface: &str) -> Option<String> {
        Some(
            self.table
                .get(surface)
                .map_or_else(|| surface.to_string(), |lemma| lemma.to_string()),
        )
    }
}

/// Lemmatize one cleaned token, checking the collaborator's contract
pub fn lemmatize_token<'a, L>(lemmatizer: &L, token: CleanedToken<'a>) -> Result<Lemma<'a>>
where
    L: Lemmatizer + ?Sized,
{
    match lemmatizer.lemmatize(token.text()) {
        Some(lemma) if !lemma.trim().is_empty() => Ok(Lemma {
            doc_id: token.doc_id(),
            position: token.position(),
            surface: token.text().to_string(),
            lemma,
        }),
        _ => Err(PipelineError::LemmatizerFailure {
            stage: Stage::Lemmatize,
            doc_id: token.doc_id().clone(),
            token: token.text().to_string(),
        }),
    }
}
