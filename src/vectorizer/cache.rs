use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use ahash::RandomState;
use moka::sync::Cache;
use tracing::debug;

use crate::{document::Document, error::ScoringError, vectorizer::tfidf::TfIdfVector};

pub const DEFAULT_CAPACITY: u64 = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

const FIELD_SEPARATOR: char = '\u{1f}';
const PARAGRAPH_SEPARATOR: char = '\u{1e}';

/// fixed seeds so fingerprints are stable for the life of the process
const FINGERPRINT_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

#[derive(Debug)]
struct CachedDocument {
    text: Box<str>,
    vector: Arc<TfIdfVector>,
}

/// Snapshot of DocumentCache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// DocumentCache
/// Bounded, time expiring memo of per-document TF-IDF vectors.
///
/// Keys are 64 bit fingerprints of the document text. Each entry keeps the
/// text it was computed from; a fingerprint match on different text is
/// treated as a miss and recomputed.
/// A capacity of 0 disables caching.
pub struct DocumentCache {
    entries: Option<Cache<u64, Arc<CachedDocument>>>,
    hasher: RandomState,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DocumentCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = (capacity > 0).then(|| {
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl.max(Duration::from_millis(1)))
                .build()
        });
        let [a, b, c, d] = FINGERPRINT_SEEDS;
        Self {
            entries,
            hasher: RandomState::with_seeds(a, b, c, d),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Cached vector of a document, computing it on a miss
    ///
    /// # Arguments
    /// * `document` - document to look up
    /// * `compute` - derivation run on a miss, its error is not cached
    pub fn get_or_compute<D, F>(&self, document: &D, compute: F) -> Result<Arc<TfIdfVector>, ScoringError>
    where
        D: Document + ?Sized,
        F: FnOnce() -> Result<TfIdfVector, ScoringError>,
    {
        let Some(entries) = &self.entries else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return compute().map(Arc::new);
        };
        let text = canonical_text(document);
        let key = self.hasher.hash_one(&text);
        if let Some(entry) = entries.get(&key) {
            if *entry.text == *text {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(&entry.vector));
            }
            debug!(fingerprint = key, "document fingerprint collision");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(fingerprint = key, "document vector cache miss");
        let vector = Arc::new(compute()?);
        entries.insert(
            key,
            Arc::new(CachedDocument {
                text: text.into_boxed_str(),
                vector: Arc::clone(&vector),
            }),
        );
        Ok(vector)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.as_ref().map_or(0, Cache::entry_count),
        }
    }

    /// Drop every entry, counters are kept
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            entries.invalidate_all();
        }
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl std::fmt::Debug for DocumentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("enabled", &self.entries.is_some())
            .field("stats", &self.stats())
            .finish()
    }
}

/// every scored field joined with separators that never occur in prose
fn canonical_text<D>(document: &D) -> String
where
    D: Document + ?Sized,
{
    let paragraphs = document.paragraphs();
    let mut text = String::with_capacity(
        document.title().len()
            + document.description().len()
            + document.author().len()
            + paragraphs.iter().map(|p| p.len() + 1).sum::<usize>()
            + 3,
    );
    text.push_str(document.title());
    text.push(FIELD_SEPARATOR);
    text.push_str(document.description());
    text.push(FIELD_SEPARATOR);
    text.push_str(document.author());
    text.push(FIELD_SEPARATOR);
    for (i, paragraph) in paragraphs.iter().enumerate() {
        if i > 0 {
            text.push(PARAGRAPH_SEPARATOR);
        }
        text.push_str(paragraph);
    }
    text
}
