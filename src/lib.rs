//! Local persistence and cache layer for a password manager.
//!
//! Entries live in a single SQLite table behind [`EntryStore`]. Readers go
//! through [`EntryCache`], a sorted in-memory mirror that is reloaded in full
//! after every write, and [`SearchIndex`], the display units derived from it.
//! [`Vault`] owns all three and keeps them in step.
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod ordering;
pub mod password;
pub mod seed;
pub mod vault;

pub use cache::{DisplayUnit, EntryCache, SearchIndex};
pub use config::{Settings, StorageMode};
pub use db::{EntryStore, Location, StatementFactory, StorageError, StorageResult};
pub use models::{Entry, EntryBuilder, EntryField, EntryPatch};
pub use ordering::{compare_titles, TitleComparator};
pub use vault::Vault;
