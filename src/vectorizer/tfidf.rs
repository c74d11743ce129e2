use ahash::RandomState;
use indexmap::IndexMap;

use crate::{
    error::ScoringError,
    utils::top_list::TopList,
    vectorizer::{term::FrequencyVector, universe::UniverseVector},
};

/// smoothing constant added to a term's document occurrence
/// Terms the universe never saw get a large but finite weight.
pub const IDF_EPSILON: f64 = 1e-6;

/// Inverse document frequency of a term
///
/// idf(t) = ln(N / (ε + df(t)))
///
/// Clamped at 0: a term found in every universe document carries no weight
/// instead of a tiny negative one.
///
/// # Arguments
/// * `document_count` - universe document count `N`
/// * `document_occurrence` - universe documents containing the term `df(t)`
#[inline]
pub fn idf(document_count: u64, document_occurrence: u64) -> f64 {
    let idf = (document_count as f64 / (IDF_EPSILON + document_occurrence as f64)).ln();
    if idf > 0.0 {
        idf
    } else {
        0.0
    }
}

/// TfIdfVector struct
/// Sparse term → weight mapping of one FrequencyVector against one universe,
/// with its L2 norm computed once at construction.
///
/// tfidf(t) = tf(t) * idf(t)
#[derive(Debug, Clone, PartialEq)]
pub struct TfIdfVector {
    weights: IndexMap<Box<str>, f64, RandomState>,
    norm: f64,
}

impl TfIdfVector {
    /// Derive TF-IDF weights
    ///
    /// # Arguments
    /// * `vector` - term frequencies
    /// * `universe` - universe supplying IDF statistics
    ///
    /// # Returns
    /// * `Err(ScoringError::UniverseTooSmall)` - when the vector spans more documents than the universe
    pub fn from_frequency(vector: &FrequencyVector, universe: &UniverseVector) -> Result<Self, ScoringError> {
        if vector.document_count() > universe.document_count() {
            return Err(ScoringError::UniverseTooSmall {
                vector_documents: vector.document_count(),
                universe_documents: universe.document_count(),
            });
        }
        let document_count = universe.document_count();
        Ok(Self::from_weights(vector.iter().map(|(term, counts)| {
            let weight = counts.frequency as f64 * idf(document_count, universe.document_occurrence(term));
            (term, weight)
        })))
    }

    /// Build directly from weights
    /// Negative and non-finite weights are stored as 0.
    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<Box<str>>,
    {
        let mut map = IndexMap::with_hasher(RandomState::new());
        let mut sum_sq = 0.0_f64;
        for (term, weight) in weights {
            let weight = if weight.is_finite() && weight > 0.0 { weight } else { 0.0 };
            sum_sq += weight * weight;
            map.insert(term.into(), weight);
        }
        Self {
            weights: map,
            norm: sum_sq.sqrt(),
        }
    }
}

/// Implementation for retrieving information from TfIdfVector
impl TfIdfVector {
    #[inline]
    pub fn weight(&self, term: &str) -> Option<f64> {
        self.weights.get(term).copied()
    }

    /// L2 norm over every key
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// true when every weight is 0, cosine is undefined then
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.norm == 0.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(term, &w)| (term.as_ref(), w))
    }

    /// Highest weighted terms, ties keep first-seen order
    ///
    /// # Arguments
    /// * `n` - number of terms to return
    pub fn top_terms(&self, n: usize) -> Vec<String> {
        let mut top = TopList::new(n);
        for (term, weight) in self.iter() {
            if weight > 0.0 {
                top.add(term, weight);
            }
        }
        top.keys().into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::term::TermCounts;

    fn universe() -> UniverseVector {
        let vector = FrequencyVector::from_parts(
            100,
            [
                ("common", TermCounts { frequency: 400, document_occurrence: 100 }),
                ("robots", TermCounts { frequency: 30, document_occurrence: 10 }),
                ("welding", TermCounts { frequency: 2, document_occurrence: 1 }),
            ],
        )
        .unwrap();
        UniverseVector::new(vector)
    }

    fn single(term: &str, frequency: u64) -> FrequencyVector {
        FrequencyVector::from_parts(1, [(term, TermCounts { frequency, document_occurrence: 1 })]).unwrap()
    }

    #[test]
    fn weight_follows_formula() {
        let universe = universe();
        let tfidf = TfIdfVector::from_frequency(&single("robots", 3), &universe).unwrap();
        let expected = 3.0 * (100.0_f64 / (IDF_EPSILON + 10.0)).ln();
        assert!((tfidf.weight("robots").unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn weight_never_decreases_with_frequency() {
        let universe = universe();
        for term in ["common", "robots", "welding", "unseen"] {
            let mut previous = 0.0;
            for frequency in 1..=20 {
                let tfidf = TfIdfVector::from_frequency(&single(term, frequency), &universe).unwrap();
                let weight = tfidf.weight(term).unwrap();
                assert!(weight >= previous, "{term}: {weight} < {previous} at tf={frequency}");
                assert!(weight >= 0.0);
                previous = weight;
            }
        }
    }

    #[test]
    fn unseen_terms_get_large_finite_weight() {
        let universe = universe();
        let tfidf = TfIdfVector::from_frequency(&single("novel", 1), &universe).unwrap();
        let weight = tfidf.weight("novel").unwrap();
        assert!(weight.is_finite());
        assert!(weight > tfidf_of(&universe, "welding"));
    }

    fn tfidf_of(universe: &UniverseVector, term: &str) -> f64 {
        TfIdfVector::from_frequency(&single(term, 1), universe)
            .unwrap()
            .weight(term)
            .unwrap()
    }

    #[test]
    fn ubiquitous_terms_weigh_zero() {
        let universe = universe();
        assert_eq!(tfidf_of(&universe, "common"), 0.0);
    }

    #[test]
    fn vector_larger_than_universe_is_rejected() {
        let universe = universe();
        let big = FrequencyVector::from_parts(101, Vec::<(&str, TermCounts)>::new()).unwrap();
        let err = TfIdfVector::from_frequency(&big, &universe).unwrap_err();
        assert!(matches!(err, ScoringError::UniverseTooSmall { vector_documents: 101, universe_documents: 100 }));
    }

    #[test]
    fn memo_returns_same_arc_for_same_universe() {
        let universe = universe();
        let vector = single("robots", 2);
        let first = vector.tf_idf(&universe).unwrap();
        let second = vector.tf_idf(&universe).unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));

        let other = self::universe();
        let third = vector.tf_idf(&other).unwrap();
        assert!(!std::sync::Arc::ptr_eq(&first, &third));
        assert_eq!(*first, *third);
    }

    #[test]
    fn top_terms_orders_by_weight() {
        let tfidf = TfIdfVector::from_weights([("alpha", 1.0), ("beta", 3.0), ("gamma", 2.0), ("zero", 0.0)]);
        assert_eq!(tfidf.top_terms(2), vec!["beta", "gamma"]);
        assert_eq!(tfidf.top_terms(10), vec!["beta", "gamma", "alpha"]);
    }
}
