use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::{
    config::DuplicateConfig,
    document::DatedDocument,
    error::{DuplicateError, ScoringError},
    utils::top_list::TopList,
    vectorizer::{tfidf::TfIdfVector, Vectorizer},
};

/// One near-duplicate of a subject document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateRelation {
    pub other_doc_id: String,
    pub similarity: f64,
}

/// Source of duplicate candidates, e.g. a search index over recent articles
pub trait CandidateSupplier {
    type Candidate: DatedDocument;
    type Error: std::error::Error + Send + Sync + 'static;

    /// At most `limit` documents matching any keyword, newest first
    fn candidates(&self, keywords: &[String], limit: usize) -> Result<Vec<Self::Candidate>, Self::Error>;
}

/// DuplicateDetector
/// Finds documents telling the same story within a publication window.
///
/// Two documents are duplicates when they were published less than
/// `window_hours` apart and the cosine similarity of their TF-IDF vectors is
/// at least `similarity_threshold`.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector<'a> {
    vectorizer: &'a Vectorizer,
    settings: DuplicateConfig,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(vectorizer: &'a Vectorizer, settings: DuplicateConfig) -> Self {
        Self { vectorizer, settings }
    }

    pub fn settings(&self) -> &DuplicateConfig {
        &self.settings
    }

    /// Duplicate test on an already computed similarity
    ///
    /// # Arguments
    /// * `similarity` - cosine similarity of the two documents
    /// * `published_delta` - difference of their publication times, either sign
    pub fn is_duplicate(&self, similarity: f64, published_delta: chrono::Duration) -> bool {
        published_delta.abs() < self.settings.window() && similarity >= self.settings.similarity_threshold
    }

    /// Duplicates of `document` among `candidates`, most similar first
    /// Candidates sharing the subject's id are skipped, so are candidates
    /// without a single scorable term.
    ///
    /// # Returns
    /// * `Err(ScoringError::ZeroVector)` - when the subject itself has no scorable term
    pub fn find_duplicates<D, C>(&self, document: &D, candidates: &[C]) -> Result<Vec<DuplicateRelation>, ScoringError>
    where
        D: DatedDocument + ?Sized,
        C: DatedDocument,
    {
        let subject = self.vectorizer.document_vector(document)?;
        if subject.is_zero() {
            return Err(ScoringError::ZeroVector);
        }
        let published = document.published_at();
        let mut ranked = TopList::new(candidates.len());
        for candidate in candidates {
            if candidate.id() == document.id() {
                continue;
            }
            let delta = candidate.published_at() - published;
            if delta.abs() >= self.settings.window() {
                continue;
            }
            let vector = self.vectorizer.document_vector(candidate)?;
            if vector.is_zero() {
                debug!(candidate = candidate.id(), "duplicate candidate has no scorable terms, skipped");
                continue;
            }
            let similarity = subject.cosine_similarity(&vector)?;
            if self.is_duplicate(similarity, delta) {
                ranked.add(candidate.id().to_string(), similarity);
            }
        }
        Ok(ranked
            .into_sorted_vec()
            .into_iter()
            .map(|(other_doc_id, similarity)| DuplicateRelation { other_doc_id, similarity })
            .collect())
    }

    /// Ask a supplier for candidates by the subject's top keywords, then
    /// filter them with [`find_duplicates`](Self::find_duplicates)
    pub fn find_with<D, S>(&self, document: &D, supplier: &S) -> Result<Vec<DuplicateRelation>, DuplicateError>
    where
        D: DatedDocument + ?Sized,
        S: CandidateSupplier + ?Sized,
    {
        let keywords = self.vectorizer.document_vector(document)?.top_terms(self.settings.keyword_count);
        if keywords.is_empty() {
            return Err(ScoringError::ZeroVector.into());
        }
        let mut candidates = supplier
            .candidates(&keywords, self.settings.candidate_limit)
            .map_err(|err| DuplicateError::Supplier(Box::new(err)))?;
        candidates.truncate(self.settings.candidate_limit);
        debug!(keywords = ?keywords, candidates = candidates.len(), "duplicate candidates fetched");
        Ok(self.find_duplicates(document, &candidates)?)
    }

    /// Drop every document that duplicates an earlier kept one
    /// Order of the kept documents is preserved. Documents without scorable
    /// terms are kept, they cannot duplicate anything.
    pub fn filter_out_duplicates<D>(&self, documents: Vec<D>) -> Result<Vec<D>, ScoringError>
    where
        D: DatedDocument,
    {
        let mut kept: Vec<(D, Option<Arc<TfIdfVector>>)> = Vec::with_capacity(documents.len());
        for document in documents {
            let vector = self.vectorizer.document_vector(&document)?;
            let vector = (!vector.is_zero()).then_some(vector);
            let mut duplicate = false;
            if let Some(vector) = &vector {
                for (other, other_vector) in &kept {
                    let Some(other_vector) = other_vector else {
                        continue;
                    };
                    let delta = other.published_at() - document.published_at();
                    if self.is_duplicate(vector.cosine_similarity(other_vector)?, delta) {
                        debug!(document = document.id(), duplicate_of = other.id(), "duplicate dropped");
                        duplicate = true;
                        break;
                    }
                }
            }
            if !duplicate {
                kept.push((document, vector));
            }
        }
        Ok(kept.into_iter().map(|(document, _)| document).collect())
    }
}
