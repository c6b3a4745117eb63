use std::path::PathBuf;

use rusqlite::{Error as SqlError, ErrorCode};
use thiserror::Error;

/// Everything that can go wrong at the storage boundary. The cache and the
/// vault hand these back untouched, so callers can match on the variant to
/// decide what to tell the user.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Insert hit the primary key on `title`.
    #[error("an entry titled {0:?} already exists")]
    DuplicateKey(String),

    /// Get, update or delete matched no row.
    #[error("no entry titled {0:?}")]
    NotFound(String),

    /// Titles are primary keys and must contain something other than
    /// whitespace.
    #[error("entry title must not be empty")]
    EmptyTitle,

    /// Driver or connection failure while running a statement.
    #[error("{context}")]
    Io {
        context: &'static str,
        #[source]
        source: SqlError,
    },

    /// The directory that should hold the database file could not be created.
    #[error("failed to create data directory {}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Creating the entries table failed. Fatal at startup.
    #[error("failed to create the entries table")]
    Schema(#[source] SqlError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Attach a short description to raw driver errors, the same way the rest of
/// the persistence code annotates every fallible call.
pub(crate) trait SqlContext<T> {
    fn sql_context(self, context: &'static str) -> StorageResult<T>;
}

impl<T> SqlContext<T> for Result<T, SqlError> {
    fn sql_context(self, context: &'static str) -> StorageResult<T> {
        self.map_err(|source| StorageError::Io { context, source })
    }
}

/// Coerce a primary key violation on insert into `DuplicateKey`. Any other
/// driver error keeps its original cause.
pub(crate) fn map_unique_constraint(err: SqlError, title: &str) -> StorageError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        StorageError::DuplicateKey(title.to_string())
    } else {
        StorageError::Io {
            context: "failed to insert entry",
            source: err,
        }
    }
}
