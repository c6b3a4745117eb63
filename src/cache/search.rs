use std::rc::Rc;

use tracing::debug;

use crate::models::Entry;

use super::entries::EntryCache;

/// One row of the search results list. Carries the fields a result card
/// shows plus a handle back to the entry, which edit and delete actions use.
#[derive(Debug, Clone)]
pub struct DisplayUnit {
    entry: Rc<Entry>,
    /// `None` when the entry has no username, so the view can grey it out.
    username: Option<String>,
    search_key: String,
}

impl DisplayUnit {
    fn new(entry: Rc<Entry>) -> Self {
        let username = entry.username.clone().filter(|name| !name.trim().is_empty());
        let search_key = entry.title.to_lowercase();
        Self {
            entry,
            username,
            search_key,
        }
    }

    /// The cached entry this unit was built from.
    pub fn entry(&self) -> &Rc<Entry> {
        &self.entry
    }

    pub fn title(&self) -> &str {
        &self.entry.title
    }

    /// Email, or an empty string when the entry has none.
    pub fn email(&self) -> &str {
        self.entry.email.as_deref().unwrap_or_default()
    }

    pub fn password(&self) -> &str {
        self.entry.password.as_deref().unwrap_or_default()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn matches(&self, needle: &str) -> bool {
        self.search_key.contains(needle)
    }
}

/// Display units derived from the entry cache, one per entry and in cache
/// order. Has to be rebuilt every time the cache refreshes, otherwise
/// results would show deleted entries or miss new ones.
#[derive(Debug, Default)]
pub struct SearchIndex {
    units: Vec<DisplayUnit>,
}

impl SearchIndex {
    /// Derive an index from the current cache contents.
    pub fn build(cache: &EntryCache) -> Self {
        let mut index = Self::default();
        index.rebuild(cache);
        index
    }

    /// Drop every unit and derive a fresh set from `cache`.
    pub fn rebuild(&mut self, cache: &EntryCache) {
        self.units = cache
            .entries()
            .iter()
            .map(|entry| DisplayUnit::new(Rc::clone(entry)))
            .collect();
        debug!(count = self.units.len(), "search index rebuilt");
    }

    /// Units whose title contains `query`, ignoring case. The query is matched
    /// as typed, surrounding spaces included. A blank query returns everything.
    pub fn filter(&self, query: &str) -> Vec<&DisplayUnit> {
        if query.trim().is_empty() {
            return self.units.iter().collect();
        }
        let needle = query.to_lowercase();
        self.units.iter().filter(|unit| unit.matches(&needle)).collect()
    }

    /// Every unit, in cache order.
    pub fn units(&self) -> &[DisplayUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
