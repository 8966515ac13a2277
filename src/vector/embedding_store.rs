//! Embedding Store
//!
//! Immutable word -> vector table parsed from a text source.
//!
//! Each line of the source has the form `word, v1, v2, ..., vk`. Fields are
//! comma separated and trimmed; blank lines are skipped. Every line must
//! carry the same number of components as the first one.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use hashbrown::HashMap;
use tracing::{debug, info};

use crate::error::{LoadError, ParseError};

/// How query text is matched against stored words
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Keys are compared verbatim
    #[default]
    Exact,
    /// Keys are lowercased when the store is built and when it is queried
    IgnoreCase,
}

impl KeyPolicy {
    /// Fold a word into the form used as a store key
    pub fn normalize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        match self {
            KeyPolicy::Exact => Cow::Borrowed(word),
            KeyPolicy::IgnoreCase => Cow::Owned(word.to_lowercase()),
        }
    }
}

/// A single parsed line: a word and its vector
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingEntry {
    /// The word as written in the source
    pub word: String,
    /// The embedding vector
    pub vector: Vec<f64>,
}

impl EmbeddingEntry {
    pub fn new(word: impl Into<String>, vector: Vec<f64>) -> Self {
        Self {
            word: word.into(),
            vector,
        }
    }

    /// Parse one `word, v1, ..., vk` line.
    ///
    /// Returns `Ok(None)` for a blank line. A trailing empty field (a line
    /// ending in a comma) is tolerated.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut fields: Vec<&str> = line.split(',').map(str::trim).collect();
        while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }

        let word = fields[0];
        if word.is_empty() {
            return Err(ParseError::MissingWord { line: line_no });
        }
        if fields.len() == 1 {
            return Err(ParseError::NoComponents {
                line: line_no,
                word: word.to_string(),
            });
        }

        let vector = fields[1..]
            .iter()
            .enumerate()
            .map(|(i, token)| match token.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(ParseError::InvalidNumber {
                    line: line_no,
                    field: i + 2,
                    token: token.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Self::new(word, vector)))
    }

    /// Get embedding dimension
    pub fn dim(&self) -> usize {
        self.vector.len()
    }
}

/// Read-only embedding table.
///
/// A store is never mutated after it is built; reloading produces a new
/// store which the session swaps in whole.
#[derive(Debug, Clone)]
pub struct EmbeddingStore {
    /// Folded key -> entry as written in the source
    embeddings: HashMap<String, EmbeddingEntry>,
    /// Shared dimension of every vector
    dimension: usize,
    key_policy: KeyPolicy,
    source: Option<PathBuf>,
    loaded_at: DateTime<Local>,
}

impl EmbeddingStore {
    /// Build a store from an embeddings file
    pub fn load(path: impl AsRef<Path>, key_policy: KeyPolicy) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut store = Self::from_reader(BufReader::new(file), key_policy)?;
        store.source = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            entries = store.len(),
            dimension = store.dimension,
            "Loaded word embeddings"
        );
        Ok(store)
    }

    /// Build a store from any buffered text source
    pub fn from_reader<R: BufRead>(reader: R, key_policy: KeyPolicy) -> Result<Self, LoadError> {
        let mut builder = StoreBuilder::new(key_policy);
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| LoadError::Read {
                line: idx + 1,
                source,
            })?;
            if let Some(entry) = EmbeddingEntry::parse_line(&line, idx + 1)? {
                builder.push(idx + 1, entry)?;
            }
        }
        Ok(builder.finish()?)
    }

    /// Build a store from already-parsed entries, numbered from 1 in order
    pub fn from_entries<I>(entries: I, key_policy: KeyPolicy) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = EmbeddingEntry>,
    {
        let mut builder = StoreBuilder::new(key_policy);
        for (idx, entry) in entries.into_iter().enumerate() {
            builder.push(idx + 1, entry)?;
        }
        builder.finish()
    }

    /// Get the vector for a word, folded per the store's key policy
    pub fn lookup(&self, word: &str) -> Option<&[f64]> {
        self.entry(word).map(|e| e.vector.as_slice())
    }

    /// Get the entry for a word, keeping the word as it was written
    pub fn entry(&self, word: &str) -> Option<&EmbeddingEntry> {
        self.embeddings.get(self.key_policy.normalize(word).as_ref())
    }

    /// Check if a word exists
    pub fn contains(&self, word: &str) -> bool {
        self.lookup(word).is_some()
    }

    /// Iterate over every `(key, entry)` pair in unspecified order.
    ///
    /// The key is folded per the key policy; `entry.word` is the original.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmbeddingEntry)> {
        self.embeddings.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Get number of stored embeddings
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Get embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn key_policy(&self) -> KeyPolicy {
        self.key_policy
    }

    /// File the store was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Local> {
        self.loaded_at
    }
}

/// Accumulates entries and enforces a single dimension
struct StoreBuilder {
    embeddings: HashMap<String, EmbeddingEntry>,
    dimension: Option<usize>,
    key_policy: KeyPolicy,
    overwritten: usize,
}

impl StoreBuilder {
    fn new(key_policy: KeyPolicy) -> Self {
        Self {
            embeddings: HashMap::new(),
            dimension: None,
            key_policy,
            overwritten: 0,
        }
    }

    fn push(&mut self, line_no: usize, entry: EmbeddingEntry) -> Result<(), ParseError> {
        if entry.vector.is_empty() {
            return Err(ParseError::NoComponents {
                line: line_no,
                word: entry.word,
            });
        }

        match self.dimension {
            Some(expected) if expected != entry.dim() => {
                return Err(ParseError::InconsistentDimension {
                    line: line_no,
                    expected,
                    found: entry.dim(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(entry.dim()),
        }

        let key = self.key_policy.normalize(&entry.word).into_owned();
        if self.embeddings.insert(key, entry).is_some() {
            // Last write wins
            self.overwritten += 1;
        }
        Ok(())
    }

    fn finish(self) -> Result<EmbeddingStore, ParseError> {
        let dimension = self.dimension.ok_or(ParseError::Empty)?;
        if self.overwritten > 0 {
            debug!(count = self.overwritten, "Duplicate words replaced by later lines");
        }

        Ok(EmbeddingStore {
            embeddings: self.embeddings,
            dimension,
            key_policy: self.key_policy,
            source: None,
            loaded_at: Local::now(),
        })
    }
}
