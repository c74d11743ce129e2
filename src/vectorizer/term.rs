use std::{
    fmt::Debug,
    sync::{Arc, OnceLock},
};

use ahash::RandomState;
use indexmap::{IndexMap, IndexSet};

use crate::{
    document::Document,
    error::ScoringError,
    vectorizer::{
        tfidf::TfIdfVector,
        token::{StopwordSet, Tokenizer},
        universe::UniverseVector,
    },
};

/// Per-term counters of a FrequencyVector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TermCounts {
    /// total occurrences over every document
    pub frequency: u64,
    /// number of distinct documents containing the term
    pub document_occurrence: u64,
}

/// FrequencyVector struct
/// Word-frequency bag over one or more documents.
/// Alongside the total count of each term it tracks how many distinct
/// documents contained it, which is what the universe uses for IDF.
///
/// Immutable after construction. Iteration follows first-seen order, so
/// every value derived from it is reproducible bit for bit.
///
/// # Examples
/// ```
/// use feature_scorer::vectorizer::{term::FrequencyVector, token::Tokenizer};
/// let tokenizer = Tokenizer::with_default_stopwords();
/// let vector = FrequencyVector::from_texts(["robots robots robots", "robots welding"], &tokenizer);
///
/// assert_eq!(vector.document_count(), 2);
/// assert_eq!(vector.term_frequency("robots"), 4);
/// assert_eq!(vector.document_occurrence("robots"), 2);
/// ```
#[derive(Clone)]
pub struct FrequencyVector {
    document_count: u64,
    terms: IndexMap<Box<str>, TermCounts, RandomState>,
    /// TF-IDF memo for the universe it was last derived against
    tfidf_memo: OnceLock<(u64, Arc<TfIdfVector>)>,
}

/// Implementation for building a FrequencyVector
impl FrequencyVector {
    /// Create an empty vector
    pub fn new() -> Self {
        Self {
            document_count: 0,
            terms: IndexMap::with_hasher(RandomState::new()),
            tfidf_memo: OnceLock::new(),
        }
    }

    /// Build from a single document
    ///
    /// # Arguments
    /// * `document` - source document
    /// * `tokenizer` - tokenizer holding the stopword set
    pub fn from_document<D>(document: &D, tokenizer: &Tokenizer) -> Self
    where
        D: Document + ?Sized,
    {
        let mut vector = Self::new();
        vector.add_tokens(&tokenizer.document_tokens(document, None));
        vector
    }

    /// Build from many documents
    ///
    /// # Arguments
    /// * `documents` - source documents, each counted once in `document_count`
    /// * `tokenizer` - tokenizer holding the stopword set
    /// * `extra_stopwords` - additional words to drop, e.g. the seed words of a sibling feature
    pub fn from_documents<'a, D, I>(documents: I, tokenizer: &Tokenizer, extra_stopwords: Option<&StopwordSet>) -> Self
    where
        D: Document + ?Sized + 'a,
        I: IntoIterator<Item = &'a D>,
    {
        let mut vector = Self::new();
        for document in documents {
            vector.add_tokens(&tokenizer.document_tokens(document, extra_stopwords));
        }
        vector
    }

    /// Build from plain texts, one document per text
    pub fn from_texts<I, S>(texts: I, tokenizer: &Tokenizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vector = Self::new();
        for text in texts {
            vector.add_tokens(&tokenizer.tokenize(text.as_ref()));
        }
        vector
    }

    /// Assemble from stored counters
    /// Used when decoding artifacts.
    ///
    /// # Returns
    /// * `Err(String)` - when a term occurs in more documents than it occurs in total,
    ///   or in more documents than the vector holds
    pub fn from_parts<I, S>(document_count: u64, terms: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = (S, TermCounts)>,
        S: Into<Box<str>>,
    {
        let mut vector = Self::new();
        vector.document_count = document_count;
        for (term, counts) in terms {
            let term: Box<str> = term.into();
            if counts.document_occurrence > counts.frequency {
                return Err(format!(
                    "term {term:?} occurs in {} documents but only {} times",
                    counts.document_occurrence, counts.frequency
                ));
            }
            if counts.document_occurrence > document_count {
                return Err(format!(
                    "term {term:?} occurs in {} documents of {document_count}",
                    counts.document_occurrence
                ));
            }
            if vector.terms.insert(term.clone(), counts).is_some() {
                return Err(format!("term {term:?} is listed twice"));
            }
        }
        Ok(vector)
    }

    /// Assemble from counters known to be consistent
    pub(crate) fn from_counts<I>(document_count: u64, terms: I) -> Self
    where
        I: IntoIterator<Item = (Box<str>, TermCounts)>,
    {
        let mut vector = Self::new();
        vector.document_count = document_count;
        vector.terms.extend(terms);
        vector
    }

    /// Count one document's tokens
    /// 同じ文書内の重複は document_occurrence には 1 回だけ数える
    fn add_tokens<T>(&mut self, tokens: &[T])
    where
        T: AsRef<str>,
    {
        let mut seen: IndexSet<&str, RandomState> = IndexSet::with_hasher(RandomState::new());
        for token in tokens {
            let token = token.as_ref();
            let counts = self.terms.entry(token.into()).or_default();
            counts.frequency += 1;
            if seen.insert(token) {
                counts.document_occurrence += 1;
            }
        }
        self.document_count += 1;
    }
}

impl Default for FrequencyVector {
    fn default() -> Self {
        Self::new()
    }
}

/// Implementation for retrieving information from FrequencyVector
impl FrequencyVector {
    #[inline]
    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    /// Total occurrences of a term, 0 when absent
    #[inline]
    pub fn term_frequency(&self, term: &str) -> u64 {
        self.terms.get(term).map_or(0, |c| c.frequency)
    }

    /// Number of documents containing a term, 0 when absent
    #[inline]
    pub fn document_occurrence(&self, term: &str) -> u64 {
        self.terms.get(term).map_or(0, |c| c.document_occurrence)
    }

    #[inline]
    pub fn counts(&self, term: &str) -> Option<TermCounts> {
        self.terms.get(term).copied()
    }

    /// Number of distinct terms
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate terms with their counters, in first-seen order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, TermCounts)> {
        self.terms.iter().map(|(term, &counts)| (term.as_ref(), counts))
    }

    /// TF-IDF weights of this vector against a universe
    /// The result is memoized for the first universe it is derived against.
    ///
    /// # Arguments
    /// * `universe` - universe supplying document statistics
    ///
    /// # Returns
    /// * `Err(ScoringError::UniverseTooSmall)` - when this vector spans more documents than the universe
    pub fn tf_idf(&self, universe: &UniverseVector) -> Result<Arc<TfIdfVector>, ScoringError> {
        if let Some((universe_id, memo)) = self.tfidf_memo.get() {
            if *universe_id == universe.id() {
                return Ok(Arc::clone(memo));
            }
            // 別の universe は memo せずに毎回計算
            return TfIdfVector::from_frequency(self, universe).map(Arc::new);
        }
        let computed = Arc::new(TfIdfVector::from_frequency(self, universe)?);
        let (universe_id, memo) = self.tfidf_memo.get_or_init(|| (universe.id(), Arc::clone(&computed)));
        if *universe_id == universe.id() {
            Ok(Arc::clone(memo))
        } else {
            Ok(computed)
        }
    }
}

impl Debug for FrequencyVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            writeln!(f, "FrequencyVector ({} documents) [", self.document_count)?;
            for (term, counts) in &self.terms {
                writeln!(f, "    {:?}: {} (docs: {})", term, counts.frequency, counts.document_occurrence)?;
            }
            write!(f, "]")
        } else {
            f.debug_struct("FrequencyVector")
                .field("document_count", &self.document_count)
                .field("terms", &self.terms.len())
                .finish()
        }
    }
}

impl PartialEq for FrequencyVector {
    fn eq(&self, other: &Self) -> bool {
        self.document_count == other.document_count && self.terms == other.terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ParsedDocument;

    fn tokenizer() -> Tokenizer {
        Tokenizer::with_default_stopwords()
    }

    #[test]
    fn repeated_token_counts_once_per_document() {
        let vector = FrequencyVector::from_texts(["drone drone drone drone drone"], &tokenizer());
        assert_eq!(vector.document_count(), 1);
        assert_eq!(vector.term_frequency("drone"), 5);
        assert_eq!(vector.document_occurrence("drone"), 1);
    }

    #[test]
    fn occurrence_never_exceeds_frequency() {
        let vector = FrequencyVector::from_texts(
            ["solar panels solar farms", "wind farms", "solar solar solar"],
            &tokenizer(),
        );
        assert_eq!(vector.document_count(), 3);
        for (_, counts) in vector.iter() {
            assert!(counts.document_occurrence <= counts.frequency);
            assert!(counts.document_occurrence <= vector.document_count());
        }
        assert_eq!(vector.term_frequency("solar"), 5);
        assert_eq!(vector.document_occurrence("solar"), 2);
        assert_eq!(vector.document_occurrence("farms"), 2);
    }

    #[test]
    fn empty_input_gives_empty_vector() {
        let doc = ParsedDocument::default();
        let vector = FrequencyVector::from_document(&doc, &tokenizer());
        assert!(vector.is_empty());
        assert_eq!(vector.document_count(), 1);
        assert_eq!(vector.term_frequency("anything"), 0);
    }

    #[test]
    fn extra_stopwords_are_dropped() {
        let docs = vec![
            ParsedDocument::new("1", "Venture capital funding"),
            ParsedDocument::new("2", "Capital markets rally"),
        ];
        let extra: StopwordSet = ["capital".into()].into_iter().collect();
        let vector = FrequencyVector::from_documents(docs.iter(), &tokenizer(), Some(&extra));
        assert_eq!(vector.document_count(), 2);
        assert_eq!(vector.term_frequency("capital"), 0);
        assert_eq!(vector.term_frequency("venture"), 1);
    }

    #[test]
    fn from_parts_rejects_broken_invariants() {
        let bad = FrequencyVector::from_parts(
            3,
            [("robots", TermCounts { frequency: 1, document_occurrence: 2 })],
        );
        assert!(bad.is_err());

        let too_many_docs = FrequencyVector::from_parts(
            1,
            [("robots", TermCounts { frequency: 4, document_occurrence: 2 })],
        );
        assert!(too_many_docs.is_err());

        let ok = FrequencyVector::from_parts(
            3,
            [("robots", TermCounts { frequency: 4, document_occurrence: 2 })],
        )
        .unwrap();
        assert_eq!(ok.term_frequency("robots"), 4);
    }

    #[test]
    fn iteration_keeps_first_seen_order() {
        let vector = FrequencyVector::from_texts(["zebra apple mango apple"], &tokenizer());
        let terms: Vec<&str> = vector.iter().map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["zebra", "apple", "mango"]);
    }
}
