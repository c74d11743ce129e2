use std::path::PathBuf;

use thiserror::Error;

use crate::feature::{Category, FeatureId};

/// Artifact I/O and decoding failures
/// Universe artifacts are fatal, feature artifacts only shrink the registry.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("artifact io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_cbor::Error,
    },
    #[error("failed to encode artifact {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_cbor::Error,
    },
    #[error("corrupt artifact {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },
}

impl ArtifactError {
    /// true when the artifact simply does not exist yet
    pub fn is_missing(&self) -> bool {
        matches!(self, ArtifactError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Errors raised while scoring a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    /// cosine similarity is undefined for an all-zero vector
    #[error("cosine similarity of a zero vector is undefined")]
    ZeroVector,
    #[error("universe vector unavailable ({path}): {reason}")]
    UniverseUnavailable { path: PathBuf, reason: String },
    #[error("vector holds {vector_documents} documents but the universe only {universe_documents}")]
    UniverseTooSmall {
        vector_documents: u64,
        universe_documents: u64,
    },
    #[error("distribution has no percentiles")]
    EmptyDistribution,
    #[error("feature {0} is not registered")]
    UnknownFeature(FeatureId),
}

/// Errors raised while constructing a feature
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("feature {id} cannot be a {kind} feature with category {category}")]
    CategoryMismatch {
        id: FeatureId,
        category: Category,
        kind: &'static str,
    },
    #[error("invalid pattern {pattern:?} for feature {id}: {source}")]
    InvalidPattern {
        id: FeatureId,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("rule score {score} for feature {id} is outside [0, 1]")]
    ScoreOutOfRange { id: FeatureId, score: f64 },
    #[error("heuristic feature {0} has no rules")]
    MissingRules(FeatureId),
    #[error("vector feature {0} has an empty score distribution")]
    EmptyDistribution(FeatureId),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Configuration and catalogue errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("feature id {0} appears more than once in the catalogue")]
    DuplicateFeatureId(FeatureId),
    #[error("no valid features could be loaded from {0} catalogue entries")]
    EmptyRegistry(usize),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors raised by duplicate detection
#[derive(Error, Debug)]
pub enum DuplicateError {
    #[error("candidate lookup failed: {0}")]
    Supplier(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

/// Umbrella error for building and driving an engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Duplicate(#[from] DuplicateError),
}
