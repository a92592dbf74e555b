//! Error types shared by the SQLite storage implementation.

use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias returning [`SqliteDaoError`] failures.
pub type SqliteResult<T> = Result<T, SqliteDaoError>;

/// Failures that can occur while interacting with the SQLite database.
#[derive(Debug, Error)]
pub enum SqliteDaoError {
    /// Listings need a window of at least one row.
    #[error("SQLite page size must be strictly positive")]
    InvalidPageSize,
    /// Table names are spliced into statements and must be plain identifiers.
    #[error("invalid SQLite table name `{table}`")]
    InvalidTable { table: String },
    /// The database file could not be opened or created.
    #[error("failed to open SQLite database `{}`", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the table or its index failed.
    #[error("failed to prepare SQLite schema for table `{table}`")]
    Schema {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A statement was rejected by the engine.
    #[error("SQLite statement failed during `{operation}`")]
    Statement {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    /// A previous holder of the connection panicked.
    #[error("SQLite connection lock poisoned")]
    Poisoned,
    /// The blocking worker running the statement did not complete.
    #[error("SQLite worker task failed")]
    Worker {
        #[source]
        source: tokio::task::JoinError,
    },
}
