//! WORDSIM - Word Embedding Similarity Search
//!
//! Loads a `word, v1, ..., vk` embeddings table and ranks the words most
//! similar to a query word by cosine similarity.

pub mod config;
pub mod error;
pub mod menu;
pub mod output;
pub mod session;
pub mod stats;
pub mod vector;

pub use config::Config;
pub use error::{Error, LoadError, ParseError, QueryError, Result, SimilarityError};
pub use menu::{Menu, MenuOption};
pub use session::Session;
pub use stats::SessionStats;
pub use vector::{
    cosine_similarity, EmbeddingEntry, EmbeddingStore, KeyPolicy, RankedResult, ScoredWord,
    SimilarityRanker,
};
