//! Error types for the data layer.
//!
//! Every failure is propagated via [`DbError`]. The variant records which
//! kind of operation failed; the wrapped [`sqlx`] error carries the
//! driver's own description. Nothing here retries or recovers.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The session could not be established or was lost while connecting.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// An insert failed (constraint violation, disconnected session).
    #[error("write error: {0}")]
    Write(#[source] sqlx::Error),

    /// A query failed (malformed statement, disconnected session, decode failure).
    #[error("read error: {0}")]
    Read(#[source] sqlx::Error),

    /// Rebuilding the materialized aggregate failed.
    ///
    /// The store keeps serving the previous contents.
    #[error("refresh error: {0}")]
    Refresh(#[source] sqlx::Error),

    /// A schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A query plan could not be written to disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A query plan could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// Short, stable label for the failing operation kind, logged as `kind`.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Write(_) => "write",
            Self::Read(_) => "read",
            Self::Refresh(_) => "refresh",
            Self::Migration(_) => "migration",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Config(_) => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_passes_driver_message_through() {
        let err = DbError::Read(sqlx::Error::RowNotFound);
        let message = err.to_string();
        assert!(message.starts_with("read error: "));
        assert!(message.contains(&sqlx::Error::RowNotFound.to_string()));
    }

    #[test]
    fn kinds_are_distinct_per_operation() {
        assert_eq!(DbError::Write(sqlx::Error::PoolClosed).kind(), "write");
        assert_eq!(DbError::Refresh(sqlx::Error::PoolClosed).kind(), "refresh");
        assert_eq!(DbError::Config("bad".to_owned()).kind(), "config");
    }
}
