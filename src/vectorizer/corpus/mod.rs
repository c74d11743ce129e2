use std::{
    collections::HashSet,
    sync::atomic::{AtomicU64, Ordering},
};

use ahash::RandomState;
use dashmap::DashMap;

use crate::{
    document::Document,
    vectorizer::{
        term::{FrequencyVector, TermCounts},
        token::{StopwordSet, Tokenizer},
    },
};

/// FrequencyVectorBuilder
/// Thread-safe accumulator for building universe and seed vectors.
/// `add_*` take `&self`, so rayon workers can feed one builder concurrently.
///
/// `build` sorts terms, so the result does not depend on the order in which
/// workers happened to add documents.
///
/// # Examples
/// ```
/// use rayon::prelude::*;
/// use feature_scorer::vectorizer::{corpus::FrequencyVectorBuilder, token::Tokenizer};
///
/// let tokenizer = Tokenizer::with_default_stopwords();
/// let builder = FrequencyVectorBuilder::new();
/// ["welding robots", "robots rising", "quarterly revenue"]
///     .par_iter()
///     .for_each(|text| builder.add_text(text, &tokenizer));
///
/// let vector = builder.build();
/// assert_eq!(vector.document_count(), 3);
/// assert_eq!(vector.document_occurrence("robots"), 2);
/// ```
#[derive(Debug, Default)]
pub struct FrequencyVectorBuilder {
    document_count: AtomicU64,
    terms: DashMap<Box<str>, TermCounts, RandomState>,
}

impl FrequencyVectorBuilder {
    /// Create a new instance
    pub fn new() -> Self {
        Self {
            document_count: AtomicU64::new(0),
            terms: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Add one document's text fields
    pub fn add_document<D>(&self, document: &D, tokenizer: &Tokenizer, extra_stopwords: Option<&StopwordSet>)
    where
        D: Document + ?Sized,
    {
        self.add_tokens(&tokenizer.document_tokens(document, extra_stopwords));
    }

    /// Add one plain text as a document
    pub fn add_text(&self, text: &str, tokenizer: &Tokenizer) {
        self.add_tokens(&tokenizer.tokenize(text));
    }

    /// Add one document's already canonical tokens
    pub fn add_tokens<T>(&self, tokens: &[T])
    where
        T: AsRef<str>,
    {
        let mut seen: HashSet<&str, RandomState> =
            HashSet::with_capacity_and_hasher(tokens.len(), RandomState::new());
        for token in tokens {
            let token = token.as_ref();
            let first_in_document = seen.insert(token);
            self.terms
                .entry(token.into())
                .and_modify(|counts| {
                    counts.frequency += 1;
                    counts.document_occurrence += u64::from(first_in_document);
                })
                .or_insert(TermCounts {
                    frequency: 1,
                    document_occurrence: 1,
                });
        }
        self.document_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold another builder into self
    pub fn merge(&self, other: FrequencyVectorBuilder) {
        for (term, counts) in other.terms {
            self.terms
                .entry(term)
                .and_modify(|mine| {
                    mine.frequency += counts.frequency;
                    mine.document_occurrence += counts.document_occurrence;
                })
                .or_insert(counts);
        }
        self.document_count
            .fetch_add(other.document_count.into_inner(), Ordering::Relaxed);
    }

    /// Number of documents added so far
    pub fn document_count(&self) -> u64 {
        self.document_count.load(Ordering::Relaxed)
    }

    /// Current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.terms.len()
    }

    /// Freeze into a FrequencyVector with terms in sorted order
    pub fn build(self) -> FrequencyVector {
        let document_count = self.document_count.into_inner();
        let mut terms: Vec<(Box<str>, TermCounts)> = self.terms.into_iter().collect();
        terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        FrequencyVector::from_counts(document_count, terms)
    }
}
