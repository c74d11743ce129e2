use crate::{error::ScoringError, vectorizer::tfidf::TfIdfVector};

/// dot積
/// d(a, b) = Σ(a_t * b_t) over t ∈ keys(a) ∩ keys(b)
/// Iterates the smaller vector and probes the larger one.
#[inline]
pub fn dot(a: &TfIdfVector, b: &TfIdfVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.weight(term).map(|other| w * other))
        .sum()
}

/// コサイン類似度
/// cos(θ) = Σ(a_t * b_t) / (||a|| * ||b||)
/// ||a|| = sqrt(Σ(a_t^2)) over every key of a
///
/// Terms present on one side only add nothing to the dot product, so only
/// the intersection is visited. The result is clamped to [0, 1].
///
/// # Returns
/// * `Err(ScoringError::ZeroVector)` - when either side has zero norm
pub fn cosine_similarity(a: &TfIdfVector, b: &TfIdfVector) -> Result<f64, ScoringError> {
    if a.is_zero() || b.is_zero() {
        return Err(ScoringError::ZeroVector);
    }
    let cosine = dot(a, b) / (a.norm() * b.norm());
    Ok(cosine.clamp(0.0, 1.0))
}

impl TfIdfVector {
    /// Cosine similarity against another vector, see [`cosine_similarity`]
    #[inline]
    pub fn cosine_similarity(&self, other: &TfIdfVector) -> Result<f64, ScoringError> {
        cosine_similarity(self, other)
    }
}
