use chrono::NaiveDate;
use dtm_vectorizer::{
    rank_features, score_documents, CleanerConfig, DictionaryLemmatizer, Document, MapLexicon, Pipeline,
    PipelineConfig, Stopwords, TfVariant, TokenizerConfig, TokenizerMode, TrainingSet,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let day = |d| NaiveDate::from_ymd_opt(2021, 3, d).ok_or("bad date");
    let docs = vec![
        Document::new("t1", "Proud to vote for the #InfrastructureBill today. Jobs, jobs, jobs!")
            .with_label("democrat")
            .with_date(day(1)?),
        Document::new("t2", "RT @senator: the budget is a disaster")
            .with_label("republican")
            .with_date(day(1)?),
        Document::new("t3", "This spending bill is a disaster for families and taxpayers")
            .with_label("republican")
            .with_date(day(2)?),
        Document::new("t4", "Great news for workers: the bill passed! https://t.co/xyz")
            .with_label("democrat")
            .with_date(day(2)?),
        Document::new("t5", "Taxes taxes taxes. Stop the spending.")
            .with_label("republican")
            .with_date(day(3)?),
    ];

    let stopwords: Stopwords = ["the", "a", "is", "to", "for", "and", "this", "of"].into_iter().collect();
    let config = PipelineConfig::default()
        .with_tokenizer(TokenizerConfig { mode: TokenizerMode::Social, lowercase: true })
        .with_cleaner(CleanerConfig::default().with_stopwords(stopwords));
    let lemmatizer: DictionaryLemmatizer =
        [("taxes", "tax"), ("taxpayers", "taxpayer"), ("jobs", "job"), ("workers", "worker")]
            .into_iter()
            .collect();

    let out = Pipeline::new(config, lemmatizer)?.run(&docs)?;
    println!("{:#?}", out.report);
    println!("sparsity: {:.3}", out.dtm.sparsity());
    println!("most frequent: {:?}", &out.dtm.term_totals()[..5.min(out.dtm.n_terms())]);

    let by_label = out.tf_idf_by_label(&docs, TfVariant::Normalized)?;
    for (label, hits) in by_label.top_terms_by_group(3) {
        println!("{label}: {hits:#?}");
    }

    let lexicon = MapLexicon::new()
        .with_score("disaster", -2.0)
        .with_score("great", 3.0)
        .with_score("proud", 2.0)
        .with_category("great", "positive")
        .with_category("proud", "positive")
        .with_category("disaster", "negative");
    for (id, sentiment) in score_documents(&out.dtm, &lexicon) {
        println!("{id}: score {:+.1}, net {}", sentiment.score, sentiment.net("positive", "negative"));
    }

    let labels: std::collections::HashMap<_, _> =
        docs.iter().map(|d| (d.id().clone(), d.label().map(str::to_string))).collect();
    let set = TrainingSet::from_dtm(&out.dtm, |id| labels.get(id).cloned().flatten())?;
    // stand-in for a trained model: importance is document frequency
    let importance: Vec<f64> = (0..set.vocabulary.len() as u32)
        .map(|i| out.dtm.document_frequency(i) as f64)
        .collect();
    println!("features: {:?}", &rank_features(&set.vocabulary, &importance)?[..3.min(importance.len())]);

    let snapshot = out.dtm.to_cbor()?;
    println!("snapshot: {} bytes", snapshot.len());
    Ok(())
}
