//! Error types for the benchmark harness.

use pgviews_db::DbError;

/// Top-level error for the benchmark binary.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// A data layer operation failed.
    #[error("database error: {source}")]
    Db {
        /// The underlying data layer error.
        #[from]
        source: DbError,
    },

    /// The report could not be written.
    #[error("report I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The report could not be serialized.
    #[error("report serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
