//! Property-based tests using proptest.
//!
//! These tests check the invariants every run must hold, whatever the corpus.

use dtm_vectorizer::{
    Cleaner, CleanerConfig, Document, IdentityLemmatizer, Pipeline, PipelineConfig, PipelineError, Stopwords,
    TfIdfMatrix, TfVariant,
};
use proptest::prelude::*;

const WORDS: &[&str] = &[
    "tax", "vote", "bill", "senate", "house", "jobs", "Jobs", "care", "don't", "42", "#tag", "@rep", "$5",
    "budget!", "the", "ärger", "año",
];

// Strategy for a corpus of short tweet-like documents
fn corpus_strategy() -> impl Strategy<Value = Vec<Document>> {
    proptest::collection::vec(proptest::collection::vec(proptest::sample::select(WORDS), 0..10), 1..25).prop_map(
        |docs| {
            docs.into_iter()
                .enumerate()
                .map(|(i, words)| Document::new(format!("doc{i}"), words.join(" ")))
                .collect()
        },
    )
}

// Strategy for raw tokens drawn from a restricted alphabet
fn token_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9#@$.,!' ]{1,16}"
}

fn run(docs: &[Document], config: PipelineConfig) -> Result<dtm_vectorizer::PipelineOutput, PipelineError> {
    Pipeline::new(config, IdentityLemmatizer)?.run(docs)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn runs_are_deterministic(docs in corpus_strategy()) {
        let first = run(&docs, PipelineConfig::default());
        let second = run(&docs, PipelineConfig::default().with_parallel(true));
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.dtm, b.dtm);
                prop_assert_eq!(a.report, b.report);
            }
            (Err(a), Err(b)) => {
                prop_assert_eq!(a.to_string(), b.to_string());
            }
            _ => {
                prop_assert!(false, "sequential and parallel runs disagree");
            }
        }
    }

    #[test]
    fn vocabulary_is_sorted_and_rows_are_strictly_ascending(docs in corpus_strategy()) {
        let Ok(out) = run(&docs, PipelineConfig::default()) else { return Ok(()); };
        let terms: Vec<&str> = out.dtm.vocabulary().iter().collect();
        prop_assert!(terms.windows(2).all(|w| w[0] < w[1]));
        for (_, row) in out.dtm.rows() {
            prop_assert!(row.indices().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(row.counts().iter().all(|&c| c > 0));
        }
        prop_assert_eq!(out.report.excluded_empty + out.dtm.n_docs() + out.report.pre_filtered, docs.len());
    }

    #[test]
    fn sparsity_filter_keeps_exactly_the_covered_terms(docs in corpus_strategy(), sparse in 0.01f64..=1.0) {
        let Ok(out) = run(&docs, PipelineConfig::default()) else { return Ok(()); };
        let dtm = &out.dtm;
        let n = dtm.n_docs() as f64;
        let expected: Vec<&str> = dtm
            .vocabulary()
            .iter()
            .enumerate()
            .filter(|&(i, _)| (n - dtm.document_frequency(i as u32) as f64) / n <= sparse)
            .map(|(_, t)| t)
            .collect();

        match dtm.remove_sparse_terms(sparse) {
            Ok(filtered) => {
                let kept: Vec<&str> = filtered.vocabulary().iter().collect();
                prop_assert_eq!(&kept, &expected);
                prop_assert_eq!(filtered.n_docs(), dtm.n_docs());
                for (id, idx, count) in filtered.entries() {
                    let term = filtered.vocabulary().term(idx).unwrap_or_default();
                    prop_assert_eq!(count, dtm.count(id.as_str(), term));
                }
            }
            Err(PipelineError::EmptyVocabulary { .. }) => {
                prop_assert!(expected.is_empty());
            }
            Err(other) => {
                prop_assert!(false, "unexpected error {}", other);
            }
        }
    }

    #[test]
    fn higher_thresholds_keep_more_terms(docs in corpus_strategy(), a in 0.01f64..=1.0, b in 0.01f64..=1.0) {
        let Ok(out) = run(&docs, PipelineConfig::default()) else { return Ok(()); };
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let kept = |sparse: f64| -> Vec<String> {
            out.dtm
                .remove_sparse_terms(sparse)
                .map(|f| f.vocabulary().iter().map(str::to_string).collect())
                .unwrap_or_default()
        };
        let high_terms = kept(high);
        prop_assert!(kept(low).iter().all(|t| high_terms.contains(t)));
    }

    #[test]
    fn cleaning_is_idempotent(tokens in proptest::collection::vec(token_strategy(), 1..20)) {
        let stopwords: Stopwords = ["the", "don't"].into_iter().collect();
        let cleaner = Cleaner::new(CleanerConfig::default().with_stopwords(stopwords));
        let once: Vec<String> = tokens.iter().filter_map(|t| cleaner.clean_text(t)).collect();
        let twice: Vec<String> = once.iter().filter_map(|t| cleaner.clean_text(t)).collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn tf_idf_entry_iff_count(docs in corpus_strategy()) {
        let Ok(out) = run(&docs, PipelineConfig::default()) else { return Ok(()); };
        let tfidf = TfIdfMatrix::by_document(&out.dtm, TfVariant::Normalized)
            .expect("a non-empty matrix has groups");
        let n_groups = tfidf.n_groups() as u64;
        for id in out.dtm.doc_ids() {
            for (idx, term) in out.dtm.vocabulary().iter().enumerate() {
                let count = out.dtm.count(id.as_str(), term);
                let entry = tfidf.entry(id, term);
                prop_assert_eq!(entry.is_some(), count > 0);
                if let Some(entry) = entry {
                    prop_assert_eq!(entry.n, count);
                    let everywhere = out.dtm.document_frequency(idx as u32) == n_groups;
                    prop_assert_eq!(entry.tf_idf == 0.0, everywhere);
                }
            }
        }
    }
}
