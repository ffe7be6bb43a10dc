//! Error types for nndb-optimize

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    /// Selection produced nothing to optimize over
    #[error("No foods selected")]
    NoFoods,

    /// A genetic search parameter is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A line of a JSON-lines food file did not parse
    #[error("{} line {line}: {source}", .path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// nndb-common error
    #[error("Common error: {0}")]
    Common(#[from] nndb_common::Error),
}

pub type OptimizeResult<T> = Result<T, OptimizeError>;
