use crate::{
    distribution::Distribution,
    document::Document,
    error::{FeatureError, ScoringError},
    feature::{registry::ArtifactLayout, Category, CatalogueEntry, FeatureId},
    vectorizer::{serde::read_frequency_vector, term::FrequencyVector, Vectorizer},
};

pub(crate) const KIND: &str = "vector";

/// VectorFeature
/// Scores a document by how close it is to a hand curated seed vector,
/// relative to how close historical documents came.
///
/// raw = cos(tfidf(document), tfidf(seed))
/// score = distribution.quantile_of(raw)
#[derive(Debug)]
pub struct VectorFeature {
    id: FeatureId,
    category: Category,
    title: String,
    seed: FrequencyVector,
    distribution: Distribution,
}

impl VectorFeature {
    /// Create a vector feature
    ///
    /// # Errors
    /// * `CategoryMismatch` - `category` is `ManualHeuristic`
    /// * `EmptyDistribution` - `distribution` holds no percentiles
    pub fn new(
        id: FeatureId,
        category: Category,
        title: impl Into<String>,
        seed: FrequencyVector,
        distribution: Distribution,
    ) -> Result<Self, FeatureError> {
        if !category.is_vector_backed() {
            return Err(FeatureError::CategoryMismatch { id, category, kind: KIND });
        }
        if distribution.is_empty() {
            return Err(FeatureError::EmptyDistribution(id));
        }
        Ok(Self {
            id,
            category,
            title: title.into(),
            seed,
            distribution,
        })
    }

    /// Load the seed vector and distribution of a catalogue entry
    pub fn load(entry: &CatalogueEntry, layout: &ArtifactLayout) -> Result<Self, FeatureError> {
        if !entry.category.is_vector_backed() {
            return Err(FeatureError::CategoryMismatch {
                id: entry.id,
                category: entry.category,
                kind: KIND,
            });
        }
        let seed = read_frequency_vector(layout.vector_path(entry.category, entry.id))?;
        let distribution = Distribution::load(layout.distribution_path(entry.category, entry.id))?;
        Self::new(entry.id, entry.category, entry.title.clone(), seed, distribution)
    }

    #[inline]
    pub fn id(&self) -> FeatureId {
        self.id
    }

    #[inline]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn seed(&self) -> &FrequencyVector {
        &self.seed
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    /// Raw cosine similarity before distribution projection
    pub fn raw_similarity<D>(&self, document: &D, vectorizer: &Vectorizer) -> Result<f64, ScoringError>
    where
        D: Document + ?Sized,
    {
        let document = vectorizer.document_vector(document)?;
        let seed = vectorizer.reference_vector(&self.seed)?;
        document.cosine_similarity(&seed)
    }

    /// Score a document in [0, 1]
    pub fn score<D>(&self, document: &D, vectorizer: &Vectorizer) -> Result<f64, ScoringError>
    where
        D: Document + ?Sized,
    {
        let raw = self.raw_similarity(document, vectorizer)?;
        self.distribution.quantile_of(raw)
    }
}
