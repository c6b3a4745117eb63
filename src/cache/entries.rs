use std::rc::Rc;

use tracing::debug;

use crate::db::{EntryStore, StorageResult};
use crate::models::Entry;
use crate::ordering::{compare_titles, TitleComparator};

/// In-memory mirror of every stored entry, sorted by title.
///
/// The cache is loaded eagerly and never patched in place: after any create,
/// update or delete the owner calls [`EntryCache::refresh`], which throws the
/// old contents away and reloads the whole table. That costs a full read per
/// write but keeps the mirror and everything derived from it trivially
/// consistent.
///
/// Entries are shared as `Rc<Entry>` with the search index. The cache is
/// therefore single-threaded; concurrent mutation is unsupported.
#[derive(Debug, Default)]
pub struct EntryCache {
    entries: Vec<Rc<Entry>>,
}

impl EntryCache {
    /// Build a cache and perform the initial full load.
    pub fn load(store: &EntryStore) -> StorageResult<Self> {
        let mut cache = Self::default();
        cache.refresh(store)?;
        Ok(cache)
    }

    /// Replace the contents with a fresh, sorted copy of the store. On error
    /// the previous contents stay in place and the store error is returned
    /// as is.
    pub fn refresh(&mut self, store: &EntryStore) -> StorageResult<()> {
        let mut entries: Vec<Rc<Entry>> = store.list_all()?.into_iter().map(Rc::new).collect();
        TitleComparator.sort(&mut entries);
        self.entries = entries;
        debug!(count = self.entries.len(), "entry cache refreshed");
        Ok(())
    }

    /// Entries in title order.
    pub fn entries(&self) -> &[Rc<Entry>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-title lookup.
    pub fn get(&self, title: &str) -> Option<&Rc<Entry>> {
        self.entries.iter().find(|entry| entry.title == title)
    }

    /// Linear scan for an exact title. A quick hint before inserting; the
    /// store's primary key remains the real guard.
    pub fn contains(&self, title: &str) -> bool {
        self.get(title).is_some()
    }

    /// Every distinct email in first-seen order, for autofill. Entries without
    /// an email are skipped.
    pub fn unique_emails(&self) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();
        for email in self.entries.iter().filter_map(|entry| entry.email.as_deref()) {
            if email.is_empty() {
                continue;
            }
            if !emails.iter().any(|seen| seen == email) {
                emails.push(email.to_string());
            }
        }
        emails
    }

    /// Distinct non-blank categories, ordered like titles.
    pub fn groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = Vec::new();
        for category in self.entries.iter().filter_map(|entry| entry.category.as_deref()) {
            if !category.is_empty() && !groups.iter().any(|seen| seen == category) {
                groups.push(category.to_string());
            }
        }
        groups.sort_by(|a, b| compare_titles(a, b));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Location;
    use crate::models::EntryField;

    fn store_with(titles: &[&str]) -> EntryStore {
        let store = EntryStore::open_in_memory().unwrap();
        for title in titles {
            store.create(&Entry::builder(*title).build()).unwrap();
        }
        store
    }

    fn titles(cache: &EntryCache) -> Vec<&str> {
        cache.entries().iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn load_sorts_case_insensitively() {
        let store = store_with(&["Banana", "apple", "Cherry"]);

        let cache = EntryCache::load(&store).unwrap();

        assert_eq!(titles(&cache), vec!["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn refresh_picks_up_mutations() {
        let store = store_with(&["Keep", "Drop"]);
        let mut cache = EntryCache::load(&store).unwrap();

        store.delete("Drop").unwrap();
        store.create(&Entry::builder("Add").build()).unwrap();
        assert!(cache.contains("Drop"));
        assert!(!cache.contains("Add"));

        cache.refresh(&store).unwrap();

        assert!(!cache.contains("Drop"));
        assert!(cache.contains("Add"));
        assert_eq!(titles(&cache), vec!["Add", "Keep"]);
    }

    #[test]
    fn refresh_sees_updated_fields() {
        let store = store_with(&["Mail"]);
        let mut cache = EntryCache::load(&store).unwrap();

        store.update("Mail", EntryField::Email, "new@example.com").unwrap();
        cache.refresh(&store).unwrap();

        assert_eq!(
            cache.get("Mail").and_then(|e| e.email.as_deref()),
            Some("new@example.com")
        );
    }

    #[test]
    fn contains_is_exact_match() {
        let cache = EntryCache::load(&store_with(&["GitHub"])).unwrap();

        assert!(cache.contains("GitHub"));
        assert!(!cache.contains("github"));
        assert!(!cache.contains("Git"));
    }

    #[test]
    fn unique_emails_keep_first_occurrence_order() {
        let store = EntryStore::open_in_memory().unwrap();
        for (title, email) in [("d", "x@e.com"), ("a", "y@e.com"), ("c", "x@e.com"), ("b", "z@e.com")] {
            store
                .create(&Entry::builder(title).email(email).build())
                .unwrap();
        }
        store.create(&Entry::builder("e").build()).unwrap();

        let cache = EntryCache::load(&store).unwrap();

        // Cache order is a, b, c, d, e.
        assert_eq!(cache.unique_emails(), vec!["y@e.com", "z@e.com", "x@e.com"]);
    }

    #[test]
    fn groups_are_distinct_and_sorted() {
        let store = EntryStore::open_in_memory().unwrap();
        for (title, category) in [("1", "social"), ("2", "Banking"), ("3", "social"), ("4", "")] {
            store
                .create(&Entry::builder(title).category(category).build())
                .unwrap();
        }

        let cache = EntryCache::load(&store).unwrap();

        assert_eq!(cache.groups(), vec!["Banking", "social"]);
    }

    #[test]
    fn failed_refresh_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.sqlite");
        let store = EntryStore::open(&Location::File(path.clone())).unwrap();
        store.create(&Entry::builder("Survivor").build()).unwrap();
        let mut cache = EntryCache::load(&store).unwrap();

        // Pull the table out from under the store's connection.
        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE ENTRIES")
            .unwrap();

        assert!(cache.refresh(&store).is_err());
        assert_eq!(titles(&cache), vec!["Survivor"]);
    }

    #[test]
    fn empty_store_gives_empty_cache() {
        let cache = EntryCache::load(&store_with(&[])).unwrap();

        assert!(cache.is_empty());
        assert!(cache.unique_emails().is_empty());
    }
}
