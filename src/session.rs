//! Query Session
//!
//! Owns the current embedding store and the output destination. A load
//! builds a complete store before taking the write lock, then swaps the
//! `Arc` in; readers clone the `Arc` and never observe a partial table.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_OUTPUT_PATH};
use crate::error::{QueryError, Result};
use crate::output;
use crate::stats::{duration_micros, SessionStats};
use crate::vector::{EmbeddingStore, RankedResult, SimilarityRanker};

/// Session state shared by every command
#[derive(Debug)]
pub struct Session {
    config: Config,
    store: RwLock<Option<Arc<EmbeddingStore>>>,
    output_path: RwLock<PathBuf>,
    ranker: SimilarityRanker,
    stats: SessionStats,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            output_path: RwLock::new(config.output_path.clone()),
            config,
            store: RwLock::new(None),
            ranker: SimilarityRanker::new(),
            stats: SessionStats::new(),
        }
    }

    /// Load an embeddings file and make it the current store.
    ///
    /// On failure the previous store stays in place.
    pub fn load_embeddings(&self, path: impl AsRef<Path>) -> Result<Arc<EmbeddingStore>> {
        let path = path.as_ref();
        match EmbeddingStore::load(path, self.config.key_policy) {
            Ok(store) => {
                let store = Arc::new(store);
                *self.store.write() = Some(Arc::clone(&store));
                self.stats.record_load(true);
                Ok(store)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load embeddings");
                self.stats.record_load(false);
                Err(e.into())
            }
        }
    }

    /// Set where results are written. An empty path restores the default.
    pub fn set_output_destination(&self, path: impl Into<PathBuf>) {
        let mut path = path.into();
        if path.as_os_str().is_empty() {
            path = PathBuf::from(DEFAULT_OUTPUT_PATH);
        }
        info!(path = %path.display(), "Output destination set");
        *self.output_path.write() = path;
    }

    pub fn output_destination(&self) -> PathBuf {
        self.output_path.read().clone()
    }

    /// Rank the words most similar to `text`.
    ///
    /// `text` is trimmed and looked up as a single key. `n` defaults to the
    /// configured top-N.
    pub fn query(
        &self,
        text: &str,
        n: Option<usize>,
    ) -> std::result::Result<RankedResult, QueryError> {
        let started = Instant::now();
        let result = self.run_query(text.trim(), n.unwrap_or(self.config.default_top_n));

        match &result {
            Ok(ranked) => {
                self.stats.record_query(started.elapsed());
                debug!(
                    query = %ranked.query,
                    matches = ranked.len(),
                    elapsed_us = duration_micros(started.elapsed()),
                    "Query ranked"
                );
            }
            Err(e) => {
                self.stats.record_failed_query();
                debug!(error = %e, "Query failed");
            }
        }
        result
    }

    fn run_query(&self, text: &str, n: usize) -> std::result::Result<RankedResult, QueryError> {
        if text.is_empty() {
            return Err(QueryError::EmptyText);
        }
        let store = self.store().ok_or(QueryError::StoreEmpty)?;
        let vector = store.lookup(text).ok_or_else(|| QueryError::NotFound {
            word: text.to_string(),
        })?;

        Ok(self.ranker.rank(&store, text, vector, n)?)
    }

    /// Append `result` to the output destination when file output is enabled
    pub fn write_results(&self, result: &RankedResult) -> Result<()> {
        if !self.config.write_results {
            return Ok(());
        }
        output::append_to_file(result, &self.output_destination())
    }

    /// Current store, if one has been loaded
    pub fn store(&self) -> Option<Arc<EmbeddingStore>> {
        self.store.read().clone()
    }

    /// True until a load succeeds
    pub fn is_empty(&self) -> bool {
        self.store.read().is_none()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, LoadError, ParseError};
    use crate::vector::KeyPolicy;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn embeddings_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn session() -> Session {
        Session::new(Config::default().with_write_results(false))
    }

    #[test]
    fn test_query_before_load() {
        let session = session();
        assert!(session.is_empty());
        assert_eq!(session.query("king", None).unwrap_err(), QueryError::StoreEmpty);
        assert_eq!(session.stats().failed_queries(), 1);
    }

    #[test]
    fn test_load_and_query() {
        let file = embeddings_file("king, 1.0, 0.0\nqueen, 0.9, 0.1\nman, 0.0, 1.0\n");
        let session = session();
        let store = session.load_embeddings(file.path()).unwrap();
        assert_eq!(store.len(), 3);
        assert!(!session.is_empty());

        let result = session.query("  king ", Some(2)).unwrap();
        let words: Vec<&str> = result.iter().map(|m| m.word.as_str()).collect();
        assert_eq!(words, vec!["queen", "man"]);
        assert_eq!(result.query, "king");
        assert_eq!(session.stats().queries(), 1);
    }

    #[test]
    fn test_query_unknown_word() {
        let file = embeddings_file("king, 1.0, 0.0\nqueen, 0.9, 0.1\n");
        let session = session();
        session.load_embeddings(file.path()).unwrap();

        assert_eq!(
            session.query("King", None).unwrap_err(),
            QueryError::NotFound {
                word: "King".to_string()
            }
        );
        assert_eq!(session.query("   ", None).unwrap_err(), QueryError::EmptyText);
        assert_eq!(session.store().unwrap().len(), 2);
    }

    #[test]
    fn test_ignore_case_session() {
        let file = embeddings_file("King, 1.0, 0.0\nqueen, 0.9, 0.1\n");
        let session = Session::new(
            Config::default()
                .with_key_policy(KeyPolicy::IgnoreCase)
                .with_write_results(false),
        );
        session.load_embeddings(file.path()).unwrap();

        let result = session.query("KING", Some(5)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.matches[0].word, "queen");
    }

    #[test]
    fn test_failed_load_keeps_previous_store() {
        let good = embeddings_file("a, 1.0, 0.0\nb, 1.0, 0.0\n");
        let bad = embeddings_file("c, 1.0, 0.0\nd, 1.0, oops\n");
        let session = session();

        session.load_embeddings(good.path()).unwrap();
        let err = session.load_embeddings(bad.path()).unwrap_err();
        assert!(matches!(
            err,
            Error::Load(LoadError::Parse(ParseError::InvalidNumber { line: 2, .. }))
        ));

        let store = session.store().unwrap();
        assert_eq!(store.source(), Some(good.path()));
        assert!(store.contains("a") && !store.contains("c"));
        assert_eq!(session.stats().loads(), 1);
        assert_eq!(session.stats().failed_loads(), 1);
    }

    #[test]
    fn test_reload_replaces_store() {
        let first = embeddings_file("a, 1.0, 0.0\nb, 1.0, 0.0\n");
        let second = embeddings_file("x, 0.0, 1.0\ny, 1.0, 1.0\n");
        let session = session();

        let held = session.load_embeddings(first.path()).unwrap();
        session.load_embeddings(second.path()).unwrap();

        // A reader holding the old store still sees all of it
        assert!(held.contains("a") && held.contains("b"));
        assert!(session.query("a", None).is_err());
        assert_eq!(session.query("x", None).unwrap().matches[0].word, "y");
    }

    #[test]
    fn test_output_destination() {
        let session = session();
        assert_eq!(session.output_destination(), PathBuf::from("./out.txt"));

        session.set_output_destination("/tmp/elsewhere.txt");
        assert_eq!(session.output_destination(), PathBuf::from("/tmp/elsewhere.txt"));

        session.set_output_destination("");
        assert_eq!(session.output_destination(), PathBuf::from("./out.txt"));
    }

    #[test]
    fn test_write_results() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("results.txt");
        let file = embeddings_file("a, 1.0, 0.0\nb, 1.0, 0.0\n");

        let session = Session::new(Config::default().with_output_path(&out));
        session.load_embeddings(file.path()).unwrap();
        let result = session.query("a", Some(1)).unwrap();
        session.write_results(&result).unwrap();

        let contents = std::fs::read_to_string(&out).unwrap();
        assert!(contents.contains("b - Cosine Similarity: 1\n"));
    }

    #[test]
    fn test_write_results_disabled() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("results.txt");
        let session = Session::new(
            Config::default()
                .with_output_path(&out)
                .with_write_results(false),
        );
        let file = embeddings_file("a, 1.0, 0.0\nb, 1.0, 0.0\n");
        session.load_embeddings(file.path()).unwrap();

        let result = session.query("a", None).unwrap();
        session.write_results(&result).unwrap();
        assert!(!out.exists());
    }
}
