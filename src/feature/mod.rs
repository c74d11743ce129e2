pub mod catalogue;
pub mod heuristic;
pub mod registry;
pub mod rules;
pub mod vector;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{document::Document, error::ScoringError, vectorizer::Vectorizer};

pub use catalogue::{Catalogue, CatalogueEntry};
pub use heuristic::{HeuristicFeature, HeuristicRules, Rule};
pub use registry::{ArtifactLayout, Classification, FeatureRegistry, FeatureScore};
pub use vector::VectorFeature;

/// Stable feature identifier from the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u32);

impl Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FeatureId {
    fn from(id: u32) -> Self {
        FeatureId(id)
    }
}

/// Feature category, fixed per catalogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Industry,
    /// topical intents such as "tech startups"
    #[serde(alias = "topic")]
    Intent,
    ManualHeuristic,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Industry, Category::Intent, Category::ManualHeuristic];

    /// directory holding this category's artifacts
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Industry => "industry",
            Category::Intent => "intent",
            Category::ManualHeuristic => "manual_heuristic",
        }
    }

    /// true for categories scored by vector similarity
    pub fn is_vector_backed(self) -> bool {
        !matches!(self, Category::ManualHeuristic)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Feature
/// One independently scored relevance dimension.
/// The two kinds share the scoring contract: `score` returns a value in [0, 1].
///
/// - `Vector`: cosine similarity against a seed vector, calibrated through
///   the feature's own score distribution
/// - `Heuristic`: hand written title/body regex rules with a blacklist veto
#[derive(Debug)]
pub enum Feature {
    Vector(VectorFeature),
    Heuristic(HeuristicFeature),
}

impl Feature {
    #[inline]
    pub fn id(&self) -> FeatureId {
        match self {
            Feature::Vector(f) => f.id(),
            Feature::Heuristic(f) => f.id(),
        }
    }

    #[inline]
    pub fn category(&self) -> Category {
        match self {
            Feature::Vector(f) => f.category(),
            Feature::Heuristic(_) => Category::ManualHeuristic,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Feature::Vector(f) => f.title(),
            Feature::Heuristic(f) => f.title(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Feature::Vector(_) => vector::KIND,
            Feature::Heuristic(_) => heuristic::KIND,
        }
    }

    /// Score a document
    ///
    /// # Arguments
    /// * `document` - document to score
    /// * `vectorizer` - tokenizer, universe and document memo for vector features
    ///
    /// # Returns
    /// * `f64` - relevance in [0, 1]
    pub fn score<D>(&self, document: &D, vectorizer: &Vectorizer) -> Result<f64, ScoringError>
    where
        D: Document + ?Sized,
    {
        match self {
            Feature::Vector(f) => f.score(document, vectorizer),
            Feature::Heuristic(f) => Ok(f.score(document)),
        }
    }
}

impl From<VectorFeature> for Feature {
    fn from(feature: VectorFeature) -> Self {
        Feature::Vector(feature)
    }
}

impl From<HeuristicFeature> for Feature {
    fn from(feature: HeuristicFeature) -> Self {
        Feature::Heuristic(feature)
    }
}
