//! Error Types
//!
//! Every failure here is recoverable: the menu loop prints it and carries on.

use std::io;
use std::path::PathBuf;

/// Convenience alias over the crate-wide [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Umbrella error returned by session operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Loading an embeddings file failed
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A similarity query failed
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Results could not be written to the output file
    #[error("cannot write results to {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while building a store from an embeddings file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open embeddings file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error reading embeddings at line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("error parsing embeddings: {0}")]
    Parse(#[from] ParseError),
}

/// A malformed line in an embeddings source.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: field {field} `{token}` is not a valid number")]
    InvalidNumber {
        line: usize,
        field: usize,
        token: String,
    },

    #[error("line {line}: missing word")]
    MissingWord { line: usize },

    #[error("line {line}: `{word}` has no vector components")]
    NoComponents { line: usize, word: String },

    #[error("line {line}: expected {expected} components, found {found}")]
    InconsistentDimension {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("no embeddings found")]
    Empty,
}

/// Similarity between two vectors is undefined
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SimilarityError {
    #[error("dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("similarity is undefined for a zero-magnitude vector")]
    ZeroMagnitude,

    #[error("similarity is not a finite number")]
    NonFinite,
}

/// A query that could not be served
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("Embeddings not loaded. Please specify embedding file first.")]
    StoreEmpty,

    #[error("Word not found in embeddings: {word}")]
    NotFound { word: String },

    #[error("No text given")]
    EmptyText,

    #[error(transparent)]
    Similarity(#[from] SimilarityError),
}
