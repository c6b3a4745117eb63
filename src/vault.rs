//! Top-level composition of the store, the cache and the search index.
//!
//! Every mutation goes to the store first and is followed by a full cache
//! reload and an index rebuild, so readers never see a mirror that disagrees
//! with the database.

use anyhow::Context;
use tracing::{info, warn};

use crate::cache::{EntryCache, SearchIndex};
use crate::config::Settings;
use crate::db::{EntryStore, Location, StorageError, StorageResult};
use crate::models::{Entry, EntryField, EntryPatch};

/// One store, one cache, one index. Build one per process (or per test) and
/// pass it to whatever needs entries.
pub struct Vault {
    store: EntryStore,
    cache: EntryCache,
    index: SearchIndex,
}

impl Vault {
    /// Open whatever store `settings` points at, load the cache and build the
    /// index.
    pub fn open(settings: &Settings) -> anyhow::Result<Self> {
        let location = settings.location()?;
        info!(?location, "opening vault");
        Self::open_at(&location)
            .with_context(|| format!("failed to open vault at {location:?}"))
    }

    /// Same as [`Vault::open`] for an already resolved location.
    pub fn open_at(location: &Location) -> StorageResult<Self> {
        Self::from_store(EntryStore::open(location)?)
    }

    /// Scratch vault over a private in-memory database.
    pub fn in_memory() -> StorageResult<Self> {
        Self::open_at(&Location::Memory)
    }

    /// Load the cache and index over an already opened store.
    pub fn from_store(store: EntryStore) -> StorageResult<Self> {
        let cache = EntryCache::load(&store)?;
        let index = SearchIndex::build(&cache);
        info!(entries = cache.len(), "vault ready");
        Ok(Self {
            store,
            cache,
            index,
        })
    }

    /// Insert a new entry. The cache is checked first so the common
    /// duplicate case never reaches the database; the store's primary key
    /// still rejects anything the cache missed.
    pub fn add(&mut self, entry: &Entry) -> StorageResult<()> {
        if self.cache.contains(&entry.title) {
            warn!(title = %entry.title, "title already cached, skipping insert");
            return Err(StorageError::DuplicateKey(entry.title.clone()));
        }
        self.store.create(entry)?;
        self.sync()
    }

    /// Change one field of an existing entry.
    pub fn edit(&mut self, title: &str, field: EntryField, new_value: &str) -> StorageResult<()> {
        self.store.update(title, field, new_value)?;
        self.sync()
    }

    /// Change several fields of an existing entry in one write.
    pub fn patch(&mut self, title: &str, patch: &EntryPatch) -> StorageResult<()> {
        self.store.apply_patch(title, patch)?;
        self.sync()
    }

    /// Delete an entry by title.
    pub fn remove(&mut self, title: &str) -> StorageResult<()> {
        self.store.delete(title)?;
        self.sync()
    }

    /// Reload the cache from the store and rebuild the index from the cache.
    pub fn sync(&mut self) -> StorageResult<()> {
        self.cache.refresh(&self.store)?;
        self.index.rebuild(&self.cache);
        Ok(())
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn cache(&self) -> &EntryCache {
        &self.cache
    }

    pub fn index(&self) -> &SearchIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageMode;

    #[test]
    fn open_follows_the_configured_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.sqlite");
        let file_settings = Settings {
            mode: StorageMode::File,
            database_path: Some(path.clone()),
        };

        Vault::open(&file_settings)
            .unwrap()
            .add(&Entry::builder("Kept").build())
            .unwrap();
        assert!(path.exists());
        assert!(Vault::open(&file_settings).unwrap().cache().contains("Kept"));

        let memory_settings = Settings {
            mode: StorageMode::Memory,
            database_path: Some(path),
        };
        assert!(Vault::open(&memory_settings).unwrap().cache().is_empty());
    }

    #[test]
    fn add_is_visible_in_cache_and_index() {
        let mut vault = Vault::in_memory().unwrap();

        vault
            .add(&Entry::builder("Steam").email("g@e.com").build())
            .unwrap();

        assert!(vault.cache().contains("Steam"));
        assert_eq!(vault.index().filter("steam").len(), 1);
    }

    #[test]
    fn cached_duplicate_is_rejected_before_the_store() {
        let mut vault = Vault::in_memory().unwrap();
        vault.add(&Entry::builder("Steam").build()).unwrap();

        let err = vault.add(&Entry::builder("Steam").build()).unwrap_err();

        assert!(matches!(err, StorageError::DuplicateKey(_)));
        assert_eq!(vault.cache().len(), 1);
    }

    #[test]
    fn store_guard_catches_what_the_cache_missed() {
        let mut vault = Vault::in_memory().unwrap();
        // Written behind the cache's back, so the fast check cannot see it.
        vault.store().create(&Entry::builder("Hidden").build()).unwrap();

        let err = vault.add(&Entry::builder("Hidden").build()).unwrap_err();

        assert!(matches!(err, StorageError::DuplicateKey(_)));
    }

    #[test]
    fn failed_mutation_leaves_mirror_untouched() {
        let mut vault = Vault::in_memory().unwrap();
        vault.add(&Entry::builder("Keep").build()).unwrap();

        assert!(matches!(vault.remove("Missing"), Err(StorageError::NotFound(_))));
        assert!(matches!(
            vault.edit("Missing", EntryField::Link, "x"),
            Err(StorageError::NotFound(_))
        ));
        assert_eq!(vault.index().len(), 1);
    }

    #[test]
    fn patch_and_remove_keep_index_consistent() {
        let mut vault = Vault::in_memory().unwrap();
        vault.add(&Entry::builder("Bank").build()).unwrap();

        vault
            .patch(
                "Bank",
                &EntryPatch::set(EntryField::Username, "me").with(EntryField::Category, "Finance"),
            )
            .unwrap();
        assert_eq!(vault.index().units()[0].username(), Some("me"));
        assert_eq!(vault.cache().groups(), vec!["Finance"]);

        vault.remove("Bank").unwrap();
        assert!(vault.index().is_empty());
        assert!(vault.cache().is_empty());
    }
}
