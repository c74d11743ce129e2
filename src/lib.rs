/// This crate scores news articles against a catalogue of features using TF-IDF
/// similarity and hand written heuristics, and detects near-duplicate stories.
pub mod config;
pub mod dedup;
pub mod distribution;
pub mod document;
pub mod engine;
pub mod error;
pub mod feature;
pub mod utils;
pub mod vectorizer;

/// Scoring Engine
/// The top-level struct of this crate. It bundles the tokenizer, the universe
/// vector, the per-document memo and the warmed feature registry.
///
/// Build it from an `EngineConfig` with `ScoringEngine::from_config`, or piece
/// by piece with `ScoringEngine::builder()`.
///
/// Provides:
/// - Scoring one document against one feature
/// - Classification: the top features of every category
/// - Document similarity
/// - Duplicate detection through `duplicates()`
///
/// # Thread Safety
/// Read-only after construction apart from the memo, which is concurrent.
/// Share it behind an `Arc`.
pub use engine::{ScoringEngine, ScoringEngineBuilder};

/// Engine Configuration
/// TOML backed, every field has a default.
/// Relative paths in a config file resolve against the file's directory.
pub use config::EngineConfig;

/// Document input contract
/// `Document` is the read-only view the engine scores: title, description,
/// author and body paragraphs.
/// `DatedDocument` adds the id and publication time used by duplicate detection.
/// `ParsedDocument` is a plain serde-friendly implementation of both.
pub use document::{DatedDocument, Document, ParsedDocument};

/// Features
/// A feature is either vector backed (industry, intent) or a manual heuristic.
///
/// - `VectorFeature`: cosine similarity to a seed vector, projected through the
///   feature's score distribution so scores are comparable across features
/// - `HeuristicFeature`: regex rules over the lower-cased title and first
///   paragraph, vetoed by blacklists
///
/// Scores are always in [0, 1].
pub use feature::{Category, Feature, FeatureId, HeuristicFeature, VectorFeature};

/// Feature Catalogue and Registry
/// The catalogue is the versioned list of known features. The registry is what
/// warm-up could actually load from the artifact tree: entries whose artifacts
/// are missing or corrupt are omitted and logged, never fatal.
pub use feature::{ArtifactLayout, Catalogue, CatalogueEntry, Classification, FeatureRegistry, FeatureScore};

/// Score Distribution
/// 101 percentile knots of historical raw similarities. `quantile_of` maps a
/// raw similarity onto [0, 1] by piecewise linear interpolation.
pub use distribution::{Distribution, DistributionBuilder};

/// Frequency Vector
/// Term counts over a set of documents: how often each term occurs and in how
/// many documents. Used for the universe and for feature seeds.
///
/// `FrequencyVectorBuilder` builds one concurrently from many threads.
///
/// # Serialization
/// Supported. Artifacts are gzip compressed CBOR.
pub use vectorizer::{corpus::FrequencyVectorBuilder, term::FrequencyVector};

/// TF-IDF Vectorizer
/// Turns documents into TF-IDF vectors against one universe and memoizes the
/// result per document text.
///
/// tf-idf(t) = term_frequency(t) * ln(N / (1e-6 + df(t))), clamped at 0
pub use vectorizer::{tfidf::TfIdfVector, token::Tokenizer, universe::UniverseVector, Vectorizer};

/// Duplicate Detection
/// Two documents are duplicates when published less than the window apart and
/// their cosine similarity reaches the threshold.
/// Candidates can be passed in directly or fetched from a `CandidateSupplier`.
pub use dedup::{CandidateSupplier, DuplicateDetector, DuplicateRelation};

/// Error types
pub use error::{ArtifactError, ConfigError, DuplicateError, EngineError, FeatureError, ScoringError};
