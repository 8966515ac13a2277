//! Vector Module
//!
//! Embedding storage, cosine similarity and top-N ranking.

mod embedding_store;
mod ranker;
mod similarity;

pub use embedding_store::{EmbeddingEntry, EmbeddingStore, KeyPolicy};
pub use ranker::{RankedResult, ScoredWord, SimilarityRanker, DEFAULT_TOP_N};
pub use similarity::{cosine_similarity, dot_product, VectorOps};
