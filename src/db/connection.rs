use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;
use tracing::info;

use super::error::{SqlContext, StorageError, StorageResult};

/// Application name used for the per-user data and config directories.
pub const APP_NAME: &str = "passvault";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "passvault.sqlite";

/// Where the store keeps its data. Chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A SQLite file on disk; parent directories are created on open.
    File(PathBuf),
    /// A private in-memory database that vanishes with the connection.
    Memory,
}

/// Open a connection for `location`, creating the data directory first when
/// the target is a file.
pub fn open_connection(location: &Location) -> StorageResult<Connection> {
    match location {
        Location::File(path) => {
            ensure_parent_dir(path)?;
            let conn = Connection::open(path).sql_context("failed to open SQLite database")?;
            info!(path = %path.display(), "opened entry database");
            Ok(conn)
        }
        Location::Memory => {
            let conn = Connection::open_in_memory()
                .sql_context("failed to open in-memory SQLite database")?;
            info!("opened in-memory entry database");
            Ok(conn)
        }
    }
}

/// Resolve the default database file inside the user's data directory.
pub fn default_db_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
}

fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| StorageError::DataDir {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}
