use std::{borrow::Cow, collections::HashSet, sync::LazyLock};

use ahash::RandomState;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{analysis::token::{CleanedToken, Token}, error::{PipelineError, Result, Stage}};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

/// Built-in rule set, applied in this order
const DEFAULT_RULES: &[(&str, &str)] = &[
    // urls
    (r"https?://\S+|www\.\S+", ""),
    // digits
    (r"\d+", ""),
    // hashtags
    (r"#\w+", ""),
    // mentions
    (r"@\w+", ""),
    // punctuation
    (r"\p{P}+", ""),
    // currency symbols
    (r"\p{Sc}+", ""),
];

static DEFAULT_RULE_SET: LazyLock<Vec<CleanRule>> = LazyLock::new(|| {
    DEFAULT_RULES
        .iter()
        .map(|(pattern, replacement)| CleanRule::new(pattern, replacement).expect("built-in rule compiles"))
        .collect()
});

/// One `pattern -> replacement` rewrite applied to every token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RuleSpec", into = "RuleSpec")]
pub struct CleanRule {
    pattern: Regex,
    replacement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RuleSpec {
    pattern: String,
    #[serde(default)]
    replacement: String,
}

impl CleanRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| PipelineError::InvalidPattern {
            stage: Stage::Config,
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(CleanRule {
            pattern: regex,
            replacement: replacement.to_string(),
        })
    }

    /// Rule deleting every match of `pattern`
    pub fn remove(pattern: &str) -> Result<Self> {
        Self::new(pattern, "")
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    #[inline]
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

impl TryFrom<RuleSpec> for CleanRule {
    type Error = PipelineError;

    fn try_from(spec: RuleSpec) -> Result<Self> {
        CleanRule::new(&spec.pattern, &spec.replacement)
    }
}

impl From<CleanRule> for RuleSpec {
    fn from(rule: CleanRule) -> Self {
        RuleSpec {
            pattern: rule.pattern.as_str().to_string(),
            replacement: rule.replacement,
        }
    }
}

/// Stop-word set
///
/// Every word is stored twice: as given, and with its apostrophes stripped,
/// so `don't` also rejects `dont` once punctuation has been removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Stopwords {
    words: Vec<Box<str>>,
    lookup: HashSet<Box<str>, RandomState>,
}

impl Stopwords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str) -> &mut Self {
        self.words.push(word.into());
        self.lookup.insert(word.into());
        let stripped: String = word.chars().filter(|c| !matches!(c, '\'' | '’')).collect();
        if stripped != word {
            self.lookup.insert(stripped.into_boxed_str());
        }
        self
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.lookup.contains(token)
    }

    /// Number of words as supplied
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Stopwords {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut stopwords = Stopwords::new();
        for word in iter {
            stopwords.insert(word.as_ref());
        }
        stopwords
    }
}

impl From<Vec<String>> for Stopwords {
    fn from(words: Vec<String>) -> Self {
        words.iter().collect()
    }
}

impl From<Stopwords> for Vec<String> {
    fn from(stopwords: Stopwords) -> Self {
        stopwords.words.into_iter().map(String::from).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    pub stopwords: Stopwords,
    /// Applied in order; each rule sees the previous rule's output
    pub rules: Vec<CleanRule>,
    /// Drop tokens that contain no letter
    pub min_alpha_required: bool,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        CleanerConfig {
            stopwords: Stopwords::new(),
            rules: DEFAULT_RULE_SET.clone(),
            min_alpha_required: true,
        }
    }
}

impl CleanerConfig {
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_rules(mut self, rules: Vec<CleanRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_min_alpha_required(mut self, required: bool) -> Self {
        self.min_alpha_required = required;
        self
    }
}

/// Cleaner
/// Rewrites and filters tokens. Order is preserved; the output may be shorter.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    pub fn new(config: CleanerConfig) -> Self {
        Cleaner { config }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Clean a token sequence lazily
    pub fn clean<'a, I>(&self, tokens: I) -> Cleaned<'_, I::IntoIter>
    where
        I: IntoIterator<Item = Token<'a>>,
    {
        Cleaned {
            cleaner: self,
            inner: tokens.into_iter(),
        }
    }

    /// Clean a single surface form
    ///
    /// # Returns
    /// * `None` - when the token is dropped
    pub fn clean_text(&self, surface: &str) -> Option<String> {
        let mut text = surface.to_string();
        for rule in &self.config.rules {
            if let Cow::Owned(rewritten) = rule.apply(&text) {
                text = rewritten;
            }
        }
        let text = WHITESPACE.replace_all(text.trim(), " ").into_owned();
        if text.is_empty() {
            return None;
        }
        if self.config.stopwords.contains(&text) {
            return None;
        }
        if self.config.min_alpha_required && !text.chars().any(char::is_alphabetic) {
            return None;
        }
        Some(text)
    }
}

/// Lazy cleaned-token sequence
#[derive(Debug, Clone)]
pub struct Cleaned<'c, I> {
    cleaner: &'c Cleaner,
    inner: I,
}

impl<'c, 'a, I> Iterator for Cleaned<'c, I>
where
    I: Iterator<Item = Token<'a>>,
{
    type Item = CleanedToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let token = self.inner.next()?;
            if let Some(text) = self.cleaner.clean_text(&token.text) {
                return Some(CleanedToken::new_unchecked(token, text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::tokenizer::Tokenizer, document::Document};

    fn clean_all(cleaner: &Cleaner, tokenizer: &Tokenizer, text: &str) -> Vec<String> {
        let doc = Document::new("d", text);
        let tokens = tokenizer.tokenize(&doc).unwrap();
        cleaner.clean(tokens).map(|t| t.text().to_string()).collect()
    }

    #[test]
    fn default_rules_strip_social_noise() {
        let cleaner = Cleaner::default();
        let out = clean_all(&cleaner, &Tokenizer::social(), "@foo bad BAD http://x.co #tag 2024 $$ good");
        assert_eq!(out, vec!["bad", "bad", "good"]);
    }

    #[test]
    fn stopwords_match_apostrophe_stripped_forms() {
        let stopwords: Stopwords = ["don't", "the"].into_iter().collect();
        let cleaner = Cleaner::new(CleanerConfig::default().with_stopwords(stopwords));
        // punctuation removal turns don't into dont
        let out = clean_all(&cleaner, &Tokenizer::simple(), "Don't stop the music");
        assert_eq!(out, vec!["stop", "music"]);
    }

    #[test]
    fn stopwords_are_case_sensitive() {
        let stopwords: Stopwords = ["the"].into_iter().collect();
        let cleaner = Cleaner::new(CleanerConfig::default().with_stopwords(stopwords));
        let out = clean_all(&cleaner, &Tokenizer::simple().with_lowercase(false), "The the");
        assert_eq!(out, vec!["The"]);
    }

    #[test]
    fn min_alpha_is_configurable() {
        let rules = vec![CleanRule::remove(r"\p{P}+").unwrap()];
        let strict = Cleaner::new(CleanerConfig::default().with_rules(rules.clone()));
        let lenient = Cleaner::new(
            CleanerConfig::default().with_rules(rules).with_min_alpha_required(false),
        );
        assert_eq!(strict.clean_text("1984"), None);
        assert_eq!(lenient.clean_text("1984"), Some("1984".to_string()));
    }

    #[test]
    fn rule_order_is_significant() {
        // punctuation first turns the hashtag into a plain word
        let punct_first = Cleaner::new(CleanerConfig::default().with_rules(vec![
            CleanRule::remove(r"\p{P}+").unwrap(),
            CleanRule::remove(r"#\w+").unwrap(),
        ]));
        let hashtag_first = Cleaner::new(CleanerConfig::default().with_rules(vec![
            CleanRule::remove(r"#\w+").unwrap(),
            CleanRule::remove(r"\p{P}+").unwrap(),
        ]));
        assert_eq!(punct_first.clean_text("#budget"), Some("budget".to_string()));
        assert_eq!(hashtag_first.clean_text("#budget"), None);
    }

    #[test]
    fn whitespace_is_squished_and_trimmed() {
        let cleaner = Cleaner::new(CleanerConfig::default().with_rules(vec![
            CleanRule::new("_", " ").unwrap(),
        ]));
        assert_eq!(cleaner.clean_text("__tax___cut_"), Some("tax cut".to_string()));
        assert_eq!(cleaner.clean_text("___"), None);
    }

    #[test]
    fn cleaning_is_idempotent_on_output() {
        let stopwords: Stopwords = ["and"].into_iter().collect();
        let cleaner = Cleaner::new(CleanerConfig::default().with_stopwords(stopwords));
        let doc = Document::new("d", "Tax-cuts and $5bn for #health @gov, http://a.b/c ok!!");
        let first: Vec<_> = cleaner.clean(Tokenizer::social().tokenize(&doc).unwrap()).collect();
        let second: Vec<_> = cleaner.clean(first.clone().into_iter().map(Token::from)).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|t| !t.text().trim().is_empty()));
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = r#"{
            "stopwords": ["a", "isn't"],
            "rules": [{"pattern": "\\d+"}, {"pattern": "x", "replacement": "y"}],
            "min_alpha_required": false
        }"#;
        let config: CleanerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].pattern(), r"\d+");
        assert!(config.stopwords.contains("isnt"));
        assert!(!config.min_alpha_required);

        let back = serde_json::to_string(&config).unwrap();
        let again: CleanerConfig = serde_json::from_str(&back).unwrap();
        assert_eq!(again.stopwords.len(), 2);
    }

    #[test]
    fn bad_pattern_is_rejected() {
        let json = r#"{"rules": [{"pattern": "(unclosed"}]}"#;
        assert!(serde_json::from_str::<CleanerConfig>(json).is_err());
    }
}
