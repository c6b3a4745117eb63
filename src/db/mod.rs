//! Persistence module split across logical submodules.

mod connection;
mod error;
mod statements;
mod store;

pub use connection::{default_db_path, open_connection, Location, APP_NAME};
pub use error::{StorageError, StorageResult};
pub use statements::{BoundStatement, StatementFactory, ENTRIES_TABLE};
pub use store::EntryStore;
