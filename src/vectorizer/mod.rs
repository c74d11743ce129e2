pub mod cache;
pub mod compare;
pub mod corpus;
pub mod serde;
pub mod term;
pub mod tfidf;
pub mod token;
pub mod universe;

use std::{sync::Arc, time::Duration};

use crate::{
    document::Document,
    error::ScoringError,
    vectorizer::{
        cache::{CacheStats, DocumentCache},
        term::FrequencyVector,
        tfidf::TfIdfVector,
        token::Tokenizer,
        universe::{LazyUniverse, UniverseVector},
    },
};

/// Vectorizer
/// Turns documents into TF-IDF vectors against one universe.
///
/// Holds the tokenizer, the lazily loaded universe and the per-document memo.
/// Shared by reference between every feature scoring the same document, so a
/// document is tokenized and weighted once per memo lifetime.
#[derive(Debug)]
pub struct Vectorizer {
    tokenizer: Arc<Tokenizer>,
    universe: LazyUniverse,
    cache: DocumentCache,
}

impl Vectorizer {
    /// Create a new Vectorizer
    ///
    /// # Arguments
    /// * `tokenizer` - tokenizer holding the stopword set
    /// * `universe` - universe supplying IDF statistics
    /// * `cache` - per-document memo
    pub fn new(tokenizer: Arc<Tokenizer>, universe: LazyUniverse, cache: DocumentCache) -> Self {
        Self {
            tokenizer,
            universe,
            cache,
        }
    }

    /// Vectorizer over an in-memory universe with the default memo
    pub fn with_universe(tokenizer: Arc<Tokenizer>, universe: UniverseVector) -> Self {
        Self::new(tokenizer, universe.into(), DocumentCache::default())
    }

    /// Replace the per-document memo
    pub fn with_cache(mut self, capacity: u64, ttl: Duration) -> Self {
        self.cache = DocumentCache::new(capacity, ttl);
        self
    }

    #[inline]
    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Universe, loaded on first call
    #[inline]
    pub fn universe(&self) -> Result<&Arc<UniverseVector>, ScoringError> {
        self.universe.get()
    }

    /// TF-IDF vector of a document, memoized by document text
    pub fn document_vector<D>(&self, document: &D) -> Result<Arc<TfIdfVector>, ScoringError>
    where
        D: Document + ?Sized,
    {
        let universe = self.universe.get()?;
        self.cache.get_or_compute(document, || {
            let frequencies = FrequencyVector::from_document(document, &self.tokenizer);
            TfIdfVector::from_frequency(&frequencies, universe)
        })
    }

    /// TF-IDF vector of a reference vector, memoized on the vector itself
    pub fn reference_vector(&self, vector: &FrequencyVector) -> Result<Arc<TfIdfVector>, ScoringError> {
        vector.tf_idf(self.universe.get()?)
    }

    /// Cosine similarity of two documents
    pub fn similarity<A, B>(&self, a: &A, b: &B) -> Result<f64, ScoringError>
    where
        A: Document + ?Sized,
        B: Document + ?Sized,
    {
        let a = self.document_vector(a)?;
        let b = self.document_vector(b)?;
        a.cosine_similarity(&b)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
