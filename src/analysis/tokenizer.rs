use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{analysis::token::{Token, TokenKind}, document::{DocId, Document}, error::Result};

/// Word characters, with in-word apostrophes kept (`don't`, `parliament’s`)
const WORD: &str = r"[\p{L}\p{N}_]+(?:['’][\p{L}\p{N}_]+)*";

static SIMPLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(WORD).expect("word pattern compiles"));
static SOCIAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"https?://\S+|www\.\S+|@\w+|#\w+|{WORD}")).expect("social pattern compiles")
});

/// Tokenization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// Split on whitespace and punctuation
    #[default]
    Simple,
    /// Like `Simple`, but URLs, `@mentions` and `#hashtags` stay atomic
    Social,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub mode: TokenizerMode,
    /// Lower-case every token except URLs
    pub lowercase: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        TokenizerConfig {
            mode: TokenizerMode::Simple,
            lowercase: true,
        }
    }
}

/// Tokenizer
/// Splits a document's text into a lazy sequence of tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Tokenizer { config }
    }

    pub fn simple() -> Self {
        Self::new(TokenizerConfig::default())
    }

    pub fn social() -> Self {
        Self::new(TokenizerConfig {
            mode: TokenizerMode::Social,
            ..TokenizerConfig::default()
        })
    }

    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.config.lowercase = lowercase;
        self
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize a document
    ///
    /// The returned iterator is lazy and finite. Clone it, call `rewind`,
    /// or call `tokenize` again to restart from the first token.
    ///
    /// # Errors
    /// `InvalidDocument` when the raw bytes are not valid UTF-8.
    pub fn tokenize<'a>(&self, doc: &'a Document) -> Result<Tokens<'a>> {
        let text = doc.text()?;
        Ok(self.tokenize_str(doc.id(), text))
    }

    /// Tokenize already-decoded text on behalf of `doc_id`
    pub fn tokenize_str<'a>(&self, doc_id: &'a DocId, text: &'a str) -> Tokens<'a> {
        let regex: &'static Regex = match self.config.mode {
            TokenizerMode::Simple => &SIMPLE_REGEX,
            TokenizerMode::Social => &SOCIAL_REGEX,
        };
        Tokens {
            doc_id,
            text,
            regex,
            lowercase: self.config.lowercase,
            offset: 0,
            position: 0,
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::simple()
    }
}

/// Lazy token sequence over one document
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    doc_id: &'a DocId,
    text: &'a str,
    regex: &'static Regex,
    lowercase: bool,
    offset: usize,
    position: usize,
}

impl<'a> Tokens<'a> {
    /// Restart from the beginning of the document
    pub fn rewind(&mut self) {
        self.offset = 0;
        self.position = 0;
    }

    fn kind_of(surface: &str) -> TokenKind {
        if surface.starts_with('@') {
            TokenKind::Mention
        } else if surface.starts_with('#') {
            TokenKind::Hashtag
        } else if surface.contains("://") || surface.starts_with("www.") {
            TokenKind::Url
        } else {
            TokenKind::Word
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        // every alternative matches at least one char, so offset always advances
        let m = self.regex.find_at(self.text, self.offset)?;
        self.offset = m.end();
        let surface = m.as_str();
        let kind = Self::kind_of(surface);
        let text = if self.lowercase && kind != TokenKind::Url {
            surface.to_lowercase()
        } else {
            surface.to_string()
        };
        let token = Token {
            doc_id: self.doc_id,
            position: self.position,
            text,
            kind,
        };
        self.position += 1;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(tokenizer: &Tokenizer, text: &str) -> Vec<String> {
        let doc = Document::new("d", text);
        tokenizer.tokenize(&doc).unwrap().map(|t| t.text).collect()
    }

    #[test]
    fn simple_splits_on_punctuation() {
        let tokenizer = Tokenizer::simple();
        assert_eq!(
            surfaces(&tokenizer, "Hello, World! Don't stop-now."),
            vec!["hello", "world", "don't", "stop", "now"]
        );
    }

    #[test]
    fn simple_breaks_up_social_markers() {
        let tokenizer = Tokenizer::simple();
        assert_eq!(
            surfaces(&tokenizer, "@foo #tag http://x.co"),
            vec!["foo", "tag", "http", "x", "co"]
        );
    }

    #[test]
    fn social_keeps_markers_atomic() {
        let tokenizer = Tokenizer::social();
        let doc = Document::new("d", "RT @Foo bad BAD http://X.co/A #Tag");
        let tokens: Vec<_> = tokenizer.tokenize(&doc).unwrap().collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["rt", "@foo", "bad", "bad", "http://X.co/A", "#tag"]);
        assert_eq!(tokens[1].kind, TokenKind::Mention);
        assert_eq!(tokens[4].kind, TokenKind::Url);
        assert_eq!(tokens[5].kind, TokenKind::Hashtag);
        assert!(tokens.iter().enumerate().all(|(i, t)| t.position == i));
    }

    #[test]
    fn social_keeps_bare_www_urls_atomic() {
        let tokenizer = Tokenizer::social();
        let doc = Document::new("d", "Read more at www.Example.com/Bill today");
        let tokens: Vec<_> = tokenizer.tokenize(&doc).unwrap().collect();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["read", "more", "at", "www.Example.com/Bill", "today"]);
        assert_eq!(tokens[3].kind, TokenKind::Url);
        // only a literal "www." prefix starts a url
        assert_eq!(surfaces(&tokenizer, "awww.cute"), vec!["awww", "cute"]);
    }

    #[test]
    fn lowercase_can_be_disabled() {
        let tokenizer = Tokenizer::simple().with_lowercase(false);
        assert_eq!(surfaces(&tokenizer, "Senate BILL"), vec!["Senate", "BILL"]);
    }

    #[test]
    fn tokens_are_restartable() {
        let tokenizer = Tokenizer::simple();
        let doc = Document::new("d", "one two three");
        let mut tokens = tokenizer.tokenize(&doc).unwrap();
        let snapshot = tokens.clone();
        assert_eq!(tokens.next().map(|t| t.text), Some("one".to_string()));
        assert_eq!(tokens.by_ref().count(), 2);
        assert_eq!(snapshot.count(), 3);
        tokens.rewind();
        assert_eq!(tokens.next().map(|t| t.position), Some(0));
    }

    #[test]
    fn undecodable_text_fails() {
        let doc = Document::from_bytes("bin", vec![0xc3, 0x28]);
        let err = Tokenizer::simple().tokenize(&doc).unwrap_err();
        assert_eq!(err.doc_id().map(DocId::as_str), Some("bin"));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(surfaces(&Tokenizer::social(), "  ...  ").is_empty());
    }
}
