//! Error types for nndb-import

use std::path::PathBuf;
use thiserror::Error;

/// Import pipeline error
#[derive(Debug, Error)]
pub enum ImportError {
    /// A source file could not be opened or read
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source directory lacks one or more distribution files
    #[error("Missing files in {}: {}", .dir.display(), .files.join(", "))]
    MissingFiles { dir: PathBuf, files: Vec<String> },

    /// A record references a code or id missing from its lookup table
    #[error("{file} line {line}: unknown {kind} '{key}'")]
    UnknownReference {
        file: &'static str,
        line: usize,
        kind: &'static str,
        key: String,
    },

    /// The same NDB number appears twice in the food descriptions
    #[error("{file} line {line}: duplicate food {ndb_num}")]
    DuplicateFood {
        file: &'static str,
        line: usize,
        ndb_num: String,
    },

    /// The collection write did not persist every document
    #[error("Bulk insert failed: expected {expected} documents, inserted {inserted}")]
    BulkFailure { expected: usize, inserted: u64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// nndb-common error
    #[error("Common error: {0}")]
    Common(#[from] nndb_common::Error),
}

/// Result type for the import pipeline
pub type ImportResult<T> = Result<T, ImportError>;
