use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub score: f64,
    pub document_name: String,
}

/// Ranking key: higher score ranks higher; on equal scores the
/// lexicographically smaller name ranks higher.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ranked {
    score: OrderedFloat<f64>,
    document_name: String,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.document_name.cmp(&self.document_name))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// At most `capacity` documents with their best score so far.
///
/// A document appears at most once. When full, an insert that outranks the
/// current minimum evicts it; anything else is dropped.
#[derive(Debug, Clone)]
pub struct BoundedScoreSet {
    capacity: usize,
    ranked: BTreeSet<Ranked>,
    scores: HashMap<String, OrderedFloat<f64>>,
}

impl BoundedScoreSet {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, ranked: BTreeSet::new(), scores: HashMap::new() }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    pub fn score_of(&self, document_name: &str) -> Option<f64> {
        self.scores.get(document_name).map(|s| s.0)
    }

    /// Insert or raise a document's score. Returns whether the set changed.
    pub fn insert(&mut self, score: f64, document_name: &str) -> bool {
        let score = OrderedFloat(score);
        if let Some(&old) = self.scores.get(document_name) {
            if old >= score {
                return false;
            }
            self.ranked.remove(&Ranked { score: old, document_name: document_name.to_string() });
            self.scores.remove(document_name);
        }
        let candidate = Ranked { score, document_name: document_name.to_string() };
        if self.ranked.len() >= self.capacity {
            match self.ranked.first() {
                Some(min) if candidate > *min => {
                    if let Some(evicted) = self.ranked.pop_first() {
                        self.scores.remove(&evicted.document_name);
                    }
                }
                _ => return false,
            }
        }
        self.scores.insert(candidate.document_name.clone(), score);
        self.ranked.insert(candidate);
        true
    }

    /// Entries from best to worst.
    pub fn iter(&self) -> impl Iterator<Item = ScoreEntry> + '_ {
        self.ranked
            .iter()
            .rev()
            .map(|r| ScoreEntry { score: r.score.0, document_name: r.document_name.clone() })
    }

    pub fn into_sorted_vec(self) -> Vec<ScoreEntry> {
        self.ranked
            .into_iter()
            .rev()
            .map(|r| ScoreEntry { score: r.score.0, document_name: r.document_name })
            .collect()
    }

    pub fn min_score(&self) -> Option<f64> {
        self.ranked.first().map(|r| r.score.0)
    }
}
