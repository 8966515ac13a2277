//! Similarity Ranker
//!
//! Top-N selection of the words closest to a query vector.
//!
//! Every entry except the query word is scored with [`cosine_similarity`]
//! and pushed through a bounded heap that keeps the `n` best candidates, so
//! a query costs `O(E log n)` over `E` entries. Ranking order is total:
//! descending score, then ascending word for equal scores.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use tracing::debug;

use super::embedding_store::EmbeddingStore;
use super::similarity::{cosine_similarity, VectorOps};
use crate::error::SimilarityError;

/// Number of matches reported when the caller does not ask for a count
pub const DEFAULT_TOP_N: usize = 10;

/// A word paired with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWord {
    pub word: String,
    pub score: f64,
}

/// Matches for one query, best first
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// The query text as the caller supplied it
    pub query: String,
    /// Number of matches the caller asked for
    pub requested: usize,
    pub matches: Vec<ScoredWord>,
}

impl RankedResult {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredWord> {
        self.matches.iter()
    }
}

/// Heap element borrowing its word from the store
struct Candidate<'a> {
    word: &'a str,
    score: f64,
}

impl Ord for Candidate<'_> {
    /// `Less` means "ranks ahead of". The heap's maximum is therefore the
    /// weakest candidate kept so far.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.word.cmp(other.word))
    }
}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

/// Ranks store entries against a query vector
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityRanker;

impl SimilarityRanker {
    pub fn new() -> Self {
        Self
    }

    /// Rank with [`DEFAULT_TOP_N`]
    pub fn rank_default(
        &self,
        store: &EmbeddingStore,
        query_word: &str,
        query_vector: &[f64],
    ) -> Result<RankedResult, SimilarityError> {
        self.rank(store, query_word, query_vector, DEFAULT_TOP_N)
    }

    /// Return the `n` entries most similar to `query_vector`.
    ///
    /// The entry whose key equals `query_word` (folded with the store's key
    /// policy) is never scored. Entries with a zero-magnitude vector have no
    /// defined similarity and are skipped. Fewer than `n` eligible entries
    /// yields all of them; `n == 0` yields none.
    pub fn rank(
        &self,
        store: &EmbeddingStore,
        query_word: &str,
        query_vector: &[f64],
        n: usize,
    ) -> Result<RankedResult, SimilarityError> {
        let excluded = store.key_policy().normalize(query_word);
        let mut heap = BinaryHeap::with_capacity(n.min(store.len()) + 1);

        if n > 0 {
            if query_vector.max_abs() == 0.0 {
                return Err(SimilarityError::ZeroMagnitude);
            }

            let mut skipped = 0usize;
            for (key, entry) in store.iter() {
                if key == excluded.as_ref() {
                    continue;
                }

                // The query is non-zero, so this can only be the candidate
                let score = match cosine_similarity(query_vector, &entry.vector) {
                    Ok(score) => score,
                    Err(SimilarityError::ZeroMagnitude) => {
                        skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                heap.push(Candidate {
                    word: &entry.word,
                    score,
                });
                if heap.len() > n {
                    heap.pop();
                }
            }

            if skipped > 0 {
                debug!(skipped, "Skipped zero-magnitude embeddings");
            }
        }

        let matches = heap
            .into_sorted_vec()
            .into_iter()
            .map(|c| ScoredWord {
                word: c.word.to_string(),
                score: c.score,
            })
            .collect();

        Ok(RankedResult {
            query: query_word.to_string(),
            requested: n,
            matches,
        })
    }
}
