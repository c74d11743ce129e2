use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
};

use ahash::RandomState;
use num::Num;

/// rank key: higher score first, then earlier insertion first
#[derive(Debug, Clone, Copy)]
struct Rank<N> {
    score: N,
    seq: u64,
}

impl<N: PartialOrd> PartialEq for Rank<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: PartialOrd> Eq for Rank<N> {}

impl<N: PartialOrd> PartialOrd for Rank<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: PartialOrd> Ord for Rank<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN never gets in, see TopList::add
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then(self.seq.cmp(&other.seq))
    }
}

/// TopList
/// Bounded ranked list keeping the `capacity` best scored items.
///
/// - insertion is O(log N)
/// - ties rank by insertion order, the first inserted item ranks higher
/// - adding an item already in the list replaces its score
/// - NaN scores are ignored
///
/// # Examples
/// ```
/// use feature_scorer::utils::top_list::TopList;
/// let mut top = TopList::new(2);
/// top.add("a", 5);
/// top.add("b", 5);
/// top.add("c", 10);
///
/// assert_eq!(top.keys(), vec!["c", "a"]);
/// assert_eq!(top.value_of(&"b"), None);
/// ```
pub struct TopList<K, N> {
    capacity: usize,
    next_seq: u64,
    ranked: BTreeMap<Rank<N>, K>,
    index: HashMap<K, Rank<N>, RandomState>,
}

impl<K, N> TopList<K, N>
where
    K: Eq + Hash + Clone,
    N: Num + PartialOrd + Copy,
{
    /// Create an empty list keeping at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_seq: 0,
            ranked: BTreeMap::new(),
            index: HashMap::with_hasher(RandomState::new()),
        }
    }

    /// Offer an item
    ///
    /// # Arguments
    /// * `item` - item to rank
    /// * `score` - its score
    ///
    /// # Returns
    /// * `bool` - true when the item is in the list afterwards
    pub fn add(&mut self, item: K, score: N) -> bool {
        if score.partial_cmp(&score).is_none() {
            return false;
        }
        if let Some(previous) = self.index.get(&item).copied() {
            self.ranked.remove(&previous);
            let rank = Rank { score, seq: previous.seq };
            self.ranked.insert(rank, item.clone());
            self.index.insert(item, rank);
            return true;
        }

        let rank = Rank { score, seq: self.next_seq };
        self.next_seq += 1;
        if self.capacity == 0 {
            return false;
        }
        if self.ranked.len() >= self.capacity {
            match self.ranked.last_key_value() {
                Some((lowest, _)) if rank < *lowest => {}
                _ => return false,
            }
            if let Some((_, evicted)) = self.ranked.pop_last() {
                self.index.remove(&evicted);
            }
        }
        self.ranked.insert(rank, item.clone());
        self.index.insert(item, rank);
        true
    }

    /// Items ordered by descending score
    pub fn keys(&self) -> Vec<K> {
        self.ranked.values().cloned().collect()
    }

    /// Score of an item still in the list
    pub fn value_of(&self, item: &K) -> Option<N> {
        self.index.get(item).map(|rank| rank.score)
    }

    /// Iterate (item, score) by descending score
    pub fn iter(&self) -> impl Iterator<Item = (&K, N)> {
        self.ranked.iter().map(|(rank, item)| (item, rank.score))
    }

    /// Consume into (item, score) pairs by descending score
    pub fn into_sorted_vec(self) -> Vec<(K, N)> {
        self.ranked
            .into_iter()
            .map(|(rank, item)| (item, rank.score))
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, N> Debug for TopList<K, N>
where
    K: Debug,
    N: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            writeln!(f, "TopList ({}) [", self.capacity)?;
            for (rank, item) in &self.ranked {
                writeln!(f, "    {:?}: {:?}", item, rank.score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.ranked.iter().map(|(rank, item)| (item, &rank.score)))
                .finish()
        }
    }
}
