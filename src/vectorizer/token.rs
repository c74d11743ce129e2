use std::{collections::HashSet, fmt::Debug, path::Path};

use ahash::RandomState;

use crate::{document::Document, error::ConfigError};

/// bundled english stopword list
const DEFAULT_STOPWORDS: &str = include_str!("../../resources/english_stopwords.txt");

/// shortest token kept, in chars
pub const MIN_TOKEN_LEN: usize = 3;
/// longest token kept, in chars
pub const MAX_TOKEN_LEN: usize = 64;

/// characters stripped from the end of a token
const TRAILING_PUNCTUATION: &[char] = &[
    '’', '\'', '”', '"', ',', ';', '-', '!', '?', ':', ')', ']', '}', '*',
];

pub type StopwordSet = HashSet<Box<str>, RandomState>;

/// Tokenizer
/// Turns article text into normalized tokens.
///
/// Tokens are lower-cased and canonicalized (possessives, quotes, trailing
/// punctuation and `-based` suffixes removed), then dropped when shorter than
/// [`MIN_TOKEN_LEN`], listed as stopwords, or implausible as words
/// (numbers, handles, entities, links).
///
/// # Examples
/// ```
/// use feature_scorer::vectorizer::token::Tokenizer;
/// let tokenizer = Tokenizer::with_default_stopwords();
/// let tokens = tokenizer.tokenize("Apple's new iPhone launches in Tokyo.");
/// assert_eq!(tokens, vec!["apple", "new", "iphone", "launches", "tokyo"]);
/// ```
#[derive(Clone)]
pub struct Tokenizer {
    stopwords: StopwordSet,
}

impl Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("stopwords", &self.stopwords.len())
            .finish()
    }
}

/// Implementation for building a Tokenizer
impl Tokenizer {
    /// Create a tokenizer from an explicit stopword list
    ///
    /// # Arguments
    /// * `stopwords` - words to drop, matched after lower-casing
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stopwords = stopwords
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase().into_boxed_str())
            .filter(|word| !word.is_empty())
            .collect();
        Self { stopwords }
    }

    /// Create a tokenizer using the bundled english stopwords
    pub fn with_default_stopwords() -> Self {
        Self::from_stopword_text(DEFAULT_STOPWORDS)
    }

    /// Parse a stopword file body, one word per line, `#` starts a comment line
    pub fn from_stopword_text(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load a stopword file from disk
    ///
    /// # Arguments
    /// * `path` - stopword file path
    ///
    /// # Returns
    /// * `Result<Tokenizer, ConfigError>` - the tokenizer, or the read failure
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_stopword_text(&text))
    }
}

/// Implementation for tokenizing text
impl Tokenizer {
    #[inline]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn stopword_count(&self) -> usize {
        self.stopwords.len()
    }

    /// Split text into sentences
    /// A sentence ends at `.`, `!` or `?` followed by whitespace.
    pub fn sentences<'a>(&self, text: &'a str) -> Sentences<'a> {
        Sentences { rest: text }
    }

    /// Tokenize a piece of text
    ///
    /// # Arguments
    /// * `text` - raw text
    ///
    /// # Returns
    /// * `Vec<String>` - kept tokens in reading order
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        self.tokenize_into(text, None, &mut tokens);
        tokens
    }

    /// Tokenize every text field of a document
    /// Order: title, description, body paragraphs, author.
    ///
    /// # Arguments
    /// * `document` - source document
    /// * `extra_stopwords` - additional words to drop for this call
    pub fn document_tokens<D>(&self, document: &D, extra_stopwords: Option<&StopwordSet>) -> Vec<String>
    where
        D: Document + ?Sized,
    {
        let mut tokens = Vec::new();
        self.tokenize_into(document.title(), extra_stopwords, &mut tokens);
        self.tokenize_into(document.description(), extra_stopwords, &mut tokens);
        for paragraph in document.paragraphs() {
            self.tokenize_into(paragraph, extra_stopwords, &mut tokens);
        }
        self.tokenize_into(document.author(), extra_stopwords, &mut tokens);
        tokens
    }

    fn tokenize_into(&self, text: &str, extra_stopwords: Option<&StopwordSet>, out: &mut Vec<String>) {
        for sentence in self.sentences(text) {
            for raw in sentence.split_whitespace() {
                let Some(token) = canonicalize(raw) else {
                    continue;
                };
                if self.is_stopword(&token)
                    || extra_stopwords.is_some_and(|extra| extra.contains(token.as_str()))
                {
                    continue;
                }
                out.push(token);
            }
        }
    }
}

/// Sentence iterator returned by [`Tokenizer::sentences`]
#[derive(Debug, Clone)]
pub struct Sentences<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Sentences<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let text = self.rest.trim_start();
        if text.is_empty() {
            self.rest = text;
            return None;
        }
        let mut chars = text.char_indices().peekable();
        while let Some((idx, c)) = chars.next() {
            if matches!(c, '.' | '!' | '?') {
                if let Some(&(next_idx, next)) = chars.peek() {
                    if next.is_whitespace() {
                        self.rest = &text[next_idx..];
                        return Some(&text[..idx + c.len_utf8()]);
                    }
                }
            }
        }
        self.rest = "";
        Some(text)
    }
}

/// Canonicalize a raw whitespace-separated fragment
/// Returns `None` when nothing plausible is left.
pub fn canonicalize(raw: &str) -> Option<String> {
    let lower = raw.to_lowercase();
    // 先頭の記号は落とすが # @ & は判定用に残す
    let mut token = lower.trim_start_matches(|c: char| !(c.is_alphanumeric() || matches!(c, '#' | '@' | '&')));
    loop {
        let before = token.len();
        token = token.trim_end_matches(TRAILING_PUNCTUATION);
        for possessive in ["'s", "’s"] {
            if let Some(stripped) = token.strip_suffix(possessive) {
                token = stripped;
            }
        }
        if token.len() == before {
            break;
        }
    }
    if let Some(stripped) = token.strip_suffix('.') {
        token = stripped;
    }
    if let Some(stripped) = token.strip_suffix("-based") {
        token = stripped;
    }
    if let Some(idx) = token.find(['\'', '’']) {
        token = &token[..idx];
    }
    is_plausible(token).then(|| token.to_string())
}

/// Length and character-class checks for a canonical token
pub fn is_plausible(token: &str) -> bool {
    let len = token.chars().count();
    if !(MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&len) {
        return false;
    }
    if token.starts_with(['#', '@', '&']) || token.starts_with("t.co/") {
        return false;
    }
    if token.contains('…') || token.contains("...") || token.contains("://") {
        return false;
    }
    // numbers like 2015, 3.5 or 10-year
    if !token.chars().any(char::is_alphabetic) {
        return false;
    }
    let digits = token.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && token[digits..].starts_with('-') {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParsedDocument;
    use rstest::rstest;

    #[rstest]
    #[case("Apple's", Some("apple"))]
    #[case("“Google", Some("google"))]
    #[case("cloud-based", Some("cloud"))]
    #[case("Tesla,", Some("tesla"))]
    #[case("markets.", Some("markets"))]
    #[case("don't", Some("don"))]
    #[case("U.S.", Some("u.s"))]
    #[case("2015", None)]
    #[case("3.5", None)]
    #[case("10-year", None)]
    #[case("#breaking", None)]
    #[case("@nytimes", None)]
    #[case("&amp;", None)]
    #[case("t.co/abc", None)]
    #[case("wait…", None)]
    #[case("ok", None)]
    fn canonicalize_cases(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(canonicalize(raw).as_deref(), expected);
    }

    #[test]
    fn canonicalize_rejects_overlong_tokens() {
        let long = "a".repeat(MAX_TOKEN_LEN + 1);
        assert_eq!(canonicalize(&long), None);
        let ok = "a".repeat(MAX_TOKEN_LEN);
        assert_eq!(canonicalize(&ok), Some(ok));
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let tokenizer = Tokenizer::new(Vec::<&str>::new());
        let sentences: Vec<&str> = tokenizer
            .sentences("First one. Second one! Third? v1.2 stays together")
            .collect();
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third?", "v1.2 stays together"]);
    }

    #[test]
    fn sentences_of_empty_text() {
        let tokenizer = Tokenizer::new(Vec::<&str>::new());
        assert_eq!(tokenizer.sentences("").count(), 0);
        assert_eq!(tokenizer.sentences("   \n ").count(), 0);
    }

    #[test]
    fn tokenize_drops_stopwords_and_short_tokens() {
        let tokenizer = Tokenizer::with_default_stopwords();
        let tokens = tokenizer.tokenize("The CEO of Acme said it is a big day for robots.");
        assert_eq!(tokens, vec!["ceo", "acme", "big", "day", "robots"]);
    }

    #[test]
    fn tokenize_empty_input() {
        let tokenizer = Tokenizer::with_default_stopwords();
        assert!(tokenizer.tokenize("").is_empty());
    }

    #[test]
    fn stopword_file_skips_comments_and_blanks() {
        let tokenizer = Tokenizer::from_stopword_text("# header\n\nFoo\n  bar  \n");
        assert_eq!(tokenizer.stopword_count(), 2);
        assert!(tokenizer.is_stopword("foo"));
        assert!(tokenizer.is_stopword("bar"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Tokenizer::load(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn document_tokens_cover_every_field() {
        let tokenizer = Tokenizer::with_default_stopwords();
        let doc = ParsedDocument::new("1", "Robots rising")
            .with_description("Factory automation")
            .with_paragraph("Welding arms. Painting arms.")
            .with_author("Jane Doe");
        let tokens = tokenizer.document_tokens(&doc, None);
        assert_eq!(
            tokens,
            vec!["robots", "rising", "factory", "automation", "welding", "arms", "painting", "arms", "jane", "doe"]
        );

        let extra: StopwordSet = ["arms".into()].into_iter().collect();
        let tokens = tokenizer.document_tokens(&doc, Some(&extra));
        assert!(!tokens.iter().any(|t| t == "arms"));
    }
}
