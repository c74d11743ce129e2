use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::{
    distribution::Distribution,
    document::Document,
    error::{ArtifactError, FeatureError, ScoringError},
    feature::{Catalogue, CatalogueEntry, Category, Feature, FeatureId, HeuristicFeature, VectorFeature},
    utils::top_list::TopList,
    vectorizer::{serde::write_frequency_vector, term::FrequencyVector, Vectorizer},
};

pub const UNIVERSE_FILE: &str = "universe.vector";
pub const VECTOR_FILE: &str = "feature.vector";
pub const DISTRIBUTION_FILE: &str = "feature.distribution";

/// Where artifacts live on disk
///
/// ```text
/// <root>/universe.vector
/// <root>/<category>/<id>/feature.vector
/// <root>/<category>/<id>/feature.distribution
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn universe_path(&self) -> PathBuf {
        self.root.join(UNIVERSE_FILE)
    }

    pub fn feature_dir(&self, category: Category, id: FeatureId) -> PathBuf {
        self.root.join(category.dir_name()).join(id.to_string())
    }

    pub fn vector_path(&self, category: Category, id: FeatureId) -> PathBuf {
        self.feature_dir(category, id).join(VECTOR_FILE)
    }

    pub fn distribution_path(&self, category: Category, id: FeatureId) -> PathBuf {
        self.feature_dir(category, id).join(DISTRIBUTION_FILE)
    }

    /// Write both artifacts of a vector feature
    pub fn write_feature(
        &self,
        category: Category,
        id: FeatureId,
        seed: &FrequencyVector,
        distribution: &Distribution,
    ) -> Result<(), ArtifactError> {
        write_frequency_vector(self.vector_path(category, id), seed)?;
        distribution.save(self.distribution_path(category, id))
    }
}

/// One feature's score for a document
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureScore {
    pub id: FeatureId,
    pub category: Category,
    pub score: f64,
}

/// Top scoring features of a document, best first within each category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    pub scores: Vec<FeatureScore>,
}

impl Classification {
    pub fn get(&self, id: FeatureId) -> Option<f64> {
        self.scores.iter().find(|s| s.id == id).map(|s| s.score)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &FeatureScore> {
        self.scores.iter().filter(move |s| s.category == category)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// FeatureRegistry
/// Every loaded feature, keyed by id in catalogue order.
/// Built once by `warm_up`, read-only afterwards.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    catalogue_version: u32,
    features: IndexMap<FeatureId, Feature>,
    omitted: Vec<FeatureId>,
}

impl FeatureRegistry {
    /// Load every catalogued feature
    /// A feature whose artifacts are missing or broken, or whose rules do not
    /// compile, is left out with a warning. Warm-up itself never fails.
    ///
    /// # Arguments
    /// * `catalogue` - features to load
    /// * `layout` - artifact locations of vector features
    pub fn warm_up(catalogue: &Catalogue, layout: &ArtifactLayout) -> Self {
        let span = info_span!("warm_up", version = catalogue.version(), root = %layout.root().display());
        let _enter = span.enter();
        let started = Instant::now();

        let loaded: Vec<(FeatureId, Result<Feature, FeatureError>)> = catalogue
            .entries()
            .par_iter()
            .map(|entry| (entry.id, load_feature(entry, layout)))
            .collect();

        let mut features = IndexMap::with_capacity(loaded.len());
        let mut omitted = Vec::new();
        for (id, result) in loaded {
            match result {
                Ok(feature) => {
                    features.insert(id, feature);
                }
                Err(FeatureError::Artifact(err)) if err.is_missing() => {
                    warn!(feature = %id, error = %err, "feature artifacts missing, feature omitted");
                    omitted.push(id);
                }
                Err(err) => {
                    warn!(feature = %id, error = %err, "feature failed to load, feature omitted");
                    omitted.push(id);
                }
            }
        }
        info!(
            loaded = features.len(),
            omitted = omitted.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "feature registry warmed up"
        );
        Self {
            catalogue_version: catalogue.version(),
            features,
            omitted,
        }
    }

    /// Registry over already constructed features
    /// Later features replace earlier ones with the same id.
    pub fn from_features<I>(features: I) -> Self
    where
        I: IntoIterator<Item = Feature>,
    {
        Self {
            catalogue_version: 0,
            features: features.into_iter().map(|f| (f.id(), f)).collect(),
            omitted: Vec::new(),
        }
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn all_features(&self) -> Vec<&Feature> {
        self.features.values().collect()
    }

    pub fn features_in(&self, category: Category) -> impl Iterator<Item = &Feature> {
        self.features.values().filter(move |f| f.category() == category)
    }

    /// Catalogue ids that could not be loaded
    pub fn omitted(&self) -> &[FeatureId] {
        &self.omitted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    #[inline]
    pub fn catalogue_version(&self) -> u32 {
        self.catalogue_version
    }

    /// Score a document against every feature
    /// Keeps the `top_per_category` best features of each category.
    ///
    /// # Returns
    /// * `Err(ScoringError)` - the first scoring failure, e.g. an empty document
    pub fn classify<D>(
        &self,
        document: &D,
        vectorizer: &Vectorizer,
        top_per_category: usize,
    ) -> Result<Classification, ScoringError>
    where
        D: Document + Sync + ?Sized,
    {
        let scored: Vec<(FeatureId, Category, f64)> = self
            .features
            .par_values()
            .map(|feature| Ok((feature.id(), feature.category(), feature.score(document, vectorizer)?)))
            .collect::<Result<_, ScoringError>>()?;

        let mut tops: IndexMap<Category, TopList<FeatureId, f64>> = Category::ALL
            .iter()
            .map(|&category| (category, TopList::new(top_per_category)))
            .collect();
        for (id, category, score) in scored {
            if let Some(top) = tops.get_mut(&category) {
                top.add(id, score);
            }
        }
        let scores = tops
            .into_iter()
            .flat_map(|(category, top)| {
                top.into_sorted_vec()
                    .into_iter()
                    .map(move |(id, score)| FeatureScore { id, category, score })
            })
            .collect();
        Ok(Classification { scores })
    }
}

fn load_feature(entry: &CatalogueEntry, layout: &ArtifactLayout) -> Result<Feature, FeatureError> {
    match (&entry.rules, entry.category) {
        (_, category) if category.is_vector_backed() => VectorFeature::load(entry, layout).map(Feature::from),
        (Some(rules), category) => {
            HeuristicFeature::new(entry.id, category, entry.title.clone(), rules).map(Feature::from)
        }
        (None, _) => Err(FeatureError::MissingRules(entry.id)),
    }
}
