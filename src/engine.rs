use std::sync::Arc;

use tracing::info;

use crate::{
    config::EngineConfig,
    dedup::DuplicateDetector,
    document::Document,
    error::{ConfigError, EngineError, ScoringError},
    feature::{Catalogue, Classification, FeatureId, FeatureRegistry},
    vectorizer::{
        cache::{CacheStats, DocumentCache},
        tfidf::TfIdfVector,
        token::Tokenizer,
        universe::{LazyUniverse, UniverseVector},
        Vectorizer,
    },
};

/// ScoringEngine
/// Everything needed to score documents: tokenizer, universe, per-document
/// memo and the warmed feature registry.
///
/// Construction does all the loading except the universe, which is read on
/// the first scoring call. Afterwards the engine is read-only apart from the
/// memo and can be shared across threads behind an `Arc`.
#[derive(Debug)]
pub struct ScoringEngine {
    config: EngineConfig,
    vectorizer: Vectorizer,
    registry: FeatureRegistry,
}

impl ScoringEngine {
    /// Build an engine from a config
    ///
    /// # Errors
    /// * `ConfigError` - out of range settings, unreadable stopwords or
    ///   catalogue, or a catalogue of which not a single feature could be loaded
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> ScoringEngineBuilder {
        ScoringEngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    /// Score a document against one feature
    pub fn score<D>(&self, document: &D, id: FeatureId) -> Result<f64, ScoringError>
    where
        D: Document + ?Sized,
    {
        let feature = self.registry.get(id).ok_or(ScoringError::UnknownFeature(id))?;
        feature.score(document, &self.vectorizer)
    }

    /// Top features of every category for a document
    ///
    /// A document without any scorable term fails with `ScoringError::ZeroVector`
    /// as a whole. Its heuristic scores are not returned either.
    pub fn classify<D>(&self, document: &D) -> Result<Classification, ScoringError>
    where
        D: Document + Sync + ?Sized,
    {
        self.registry
            .classify(document, &self.vectorizer, self.config.classification.top_per_category)
    }

    pub fn document_vector<D>(&self, document: &D) -> Result<Arc<TfIdfVector>, ScoringError>
    where
        D: Document + ?Sized,
    {
        self.vectorizer.document_vector(document)
    }

    /// Cosine similarity of two documents
    pub fn similarity<A, B>(&self, a: &A, b: &B) -> Result<f64, ScoringError>
    where
        A: Document + ?Sized,
        B: Document + ?Sized,
    {
        self.vectorizer.similarity(a, b)
    }

    /// Duplicate detector using the configured window and threshold
    pub fn duplicates(&self) -> DuplicateDetector<'_> {
        DuplicateDetector::new(&self.vectorizer, self.config.duplicates)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.vectorizer.cache_stats()
    }
}

/// Builder for [`ScoringEngine`]
/// Anything not supplied is loaded from the config.
#[derive(Debug, Default)]
pub struct ScoringEngineBuilder {
    config: EngineConfig,
    tokenizer: Option<Tokenizer>,
    universe: Option<UniverseVector>,
    catalogue: Option<Catalogue>,
    registry: Option<FeatureRegistry>,
}

impl ScoringEngineBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Use an in-memory universe instead of the artifact
    pub fn universe(mut self, universe: UniverseVector) -> Self {
        self.universe = Some(universe);
        self
    }

    /// Warm up this catalogue instead of the configured one
    pub fn catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Use an already built registry, skipping warm-up
    pub fn registry(mut self, registry: FeatureRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<ScoringEngine, EngineError> {
        let config = self.config;
        config.validate()?;
        let tokenizer = match (self.tokenizer, &config.stopwords_path) {
            (Some(tokenizer), _) => tokenizer,
            (None, Some(path)) => Tokenizer::load(path)?,
            (None, None) => Tokenizer::with_default_stopwords(),
        };
        let universe = match self.universe {
            Some(universe) => LazyUniverse::preloaded(universe),
            None => LazyUniverse::from_path(config.universe_path()),
        };
        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                let catalogue = match (self.catalogue, &config.catalogue_path) {
                    (Some(catalogue), _) => catalogue,
                    (None, Some(path)) => Catalogue::load(path)?,
                    (None, None) => Catalogue::builtin(),
                };
                let registry = FeatureRegistry::warm_up(&catalogue, &config.layout());
                if registry.is_empty() && !catalogue.is_empty() {
                    return Err(ConfigError::EmptyRegistry(catalogue.len()).into());
                }
                registry
            }
        };
        let cache = DocumentCache::new(config.document_cache.capacity, config.document_cache.ttl());
        info!(
            features = registry.len(),
            stopwords = tokenizer.stopword_count(),
            universe = %universe.path().display(),
            "scoring engine ready"
        );
        Ok(ScoringEngine {
            vectorizer: Vectorizer::new(Arc::new(tokenizer), universe, cache),
            registry,
            config,
        })
    }
}
