use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, OnceLock,
    },
};

use tracing::{error, info};

use crate::{
    error::{ArtifactError, ScoringError},
    vectorizer::{serde::read_frequency_vector, term::FrequencyVector},
};

/// process-unique universe ids, used as TF-IDF memo keys
static NEXT_UNIVERSE_ID: AtomicU64 = AtomicU64::new(1);

/// UniverseVector
/// Corpus-wide reference supplying document statistics for IDF.
/// Only the document count and per-term document occurrence are exposed.
///
/// Every instance gets a fresh id, so vectors memoized against one universe
/// are never confused with another.
#[derive(Debug)]
pub struct UniverseVector {
    id: u64,
    vector: FrequencyVector,
}

impl UniverseVector {
    pub fn new(vector: FrequencyVector) -> Self {
        Self {
            id: NEXT_UNIVERSE_ID.fetch_add(1, Ordering::Relaxed),
            vector,
        }
    }

    /// Load a universe artifact
    ///
    /// # Arguments
    /// * `path` - gzip compressed frequency vector artifact
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        read_frequency_vector(path).map(Self::new)
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of documents the universe was built from
    #[inline]
    pub fn document_count(&self) -> u64 {
        self.vector.document_count()
    }

    /// Number of universe documents containing a term
    #[inline]
    pub fn document_occurrence(&self, term: &str) -> u64 {
        self.vector.document_occurrence(term)
    }

    /// Number of distinct terms
    #[inline]
    pub(crate) fn vocab_size(&self) -> usize {
        self.vector.len()
    }
}

/// Universe loaded on first use
/// A failed load is remembered: every later access reports the same error,
/// the artifact is never read twice.
#[derive(Debug)]
pub struct LazyUniverse {
    path: PathBuf,
    cell: OnceLock<Result<Arc<UniverseVector>, String>>,
}

impl LazyUniverse {
    /// Defer loading the artifact at `path` until first use
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceLock::new(),
        }
    }

    /// Wrap an already built universe
    pub fn preloaded(universe: impl Into<Arc<UniverseVector>>) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(Ok(universe.into()));
        Self {
            path: PathBuf::from("<memory>"),
            cell,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// true once a load succeeded
    pub fn is_loaded(&self) -> bool {
        matches!(self.cell.get(), Some(Ok(_)))
    }

    /// Get the universe, loading it on first call
    ///
    /// # Returns
    /// * `Err(ScoringError::UniverseUnavailable)` - when the artifact could not be loaded
    pub fn get(&self) -> Result<&Arc<UniverseVector>, ScoringError> {
        let slot = self.cell.get_or_init(|| match UniverseVector::load(&self.path) {
            Ok(universe) => {
                info!(
                    path = %self.path.display(),
                    documents = universe.document_count(),
                    vocab = universe.vocab_size(),
                    "universe vector loaded"
                );
                Ok(Arc::new(universe))
            }
            Err(err) => {
                error!(path = %self.path.display(), error = %err, "universe vector failed to load");
                Err(err.to_string())
            }
        });
        slot.as_ref().map_err(|reason| ScoringError::UniverseUnavailable {
            path: self.path.clone(),
            reason: reason.clone(),
        })
    }
}

impl From<UniverseVector> for LazyUniverse {
    fn from(universe: UniverseVector) -> Self {
        Self::preloaded(universe)
    }
}
