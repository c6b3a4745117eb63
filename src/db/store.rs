use std::collections::BTreeSet;

use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::models::{Entry, EntryField, EntryPatch};

use super::connection::{open_connection, Location};
use super::error::{map_unique_constraint, SqlContext, StorageError, StorageResult};
use super::statements::{BoundStatement, StatementFactory};

/// The authoritative CRUD boundary for entries. Owns one connection for its
/// whole lifetime and speaks in `Entry` values rather than SQL.
///
/// The connection is used synchronously on the caller's thread; long queries
/// block that thread.
pub struct EntryStore {
    conn: Connection,
    statements: StatementFactory,
}

impl EntryStore {
    /// Open the database at `location` and make sure the schema exists.
    pub fn open(location: &Location) -> StorageResult<Self> {
        let conn = open_connection(location)?;
        Self::from_connection(conn, StatementFactory::new())
    }

    /// Shorthand for a throwaway store, mostly for tests.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open(&Location::Memory)
    }

    /// Wrap an existing connection. Runs the idempotent schema creation, so
    /// reopening an existing file is safe.
    pub fn from_connection(conn: Connection, statements: StatementFactory) -> StorageResult<Self> {
        let schema = statements.create_schema();
        conn.execute(&schema.sql, params_from_iter(schema.params.iter()))
            .map_err(StorageError::Schema)?;
        debug!("entries table ready");
        Ok(Self { conn, statements })
    }

    /// Insert a new entry. Fails with `DuplicateKey` instead of overwriting
    /// when the title is already taken.
    pub fn create(&self, entry: &Entry) -> StorageResult<()> {
        if entry.title.trim().is_empty() {
            return Err(StorageError::EmptyTitle);
        }

        let stmt = self.statements.insert(entry);
        self.conn
            .execute(&stmt.sql, params_from_iter(stmt.params.iter()))
            .map_err(|err| map_unique_constraint(err, &entry.title))
            .inspect_err(|err| warn!(title = %entry.title, error = %err, "insert rejected"))?;

        debug!(title = %entry.title, "inserted entry");
        Ok(())
    }

    /// Change a single field of the entry titled `title`.
    pub fn update(&self, title: &str, field: EntryField, new_value: &str) -> StorageResult<()> {
        self.apply_patch(title, &EntryPatch::set(field, new_value))
    }

    /// Apply every present field of `patch` in one statement and bump the
    /// modification date. An empty patch only bumps the date.
    pub fn apply_patch(&self, title: &str, patch: &EntryPatch) -> StorageResult<()> {
        let stmt = self.statements.update(title, patch);
        let updated = self.execute(&stmt, "failed to update entry")?;

        if updated == 0 {
            warn!(title, "update matched no entry");
            Err(StorageError::NotFound(title.to_string()))
        } else {
            debug!(title, "updated entry");
            Ok(())
        }
    }

    /// Remove the entry titled `title`. A missing row is an error so callers
    /// notice when they acted on stale state.
    pub fn delete(&self, title: &str) -> StorageResult<()> {
        let stmt = self.statements.delete(title);
        let deleted = self.execute(&stmt, "failed to delete entry")?;

        if deleted == 0 {
            warn!(title, "delete matched no entry");
            Err(StorageError::NotFound(title.to_string()))
        } else {
            debug!(title, "deleted entry");
            Ok(())
        }
    }

    /// Fetch one entry by exact title.
    pub fn get(&self, title: &str) -> StorageResult<Entry> {
        let stmt = self.statements.get_by_title(title);
        let mut prepared = self
            .conn
            .prepare_cached(&stmt.sql)
            .sql_context("failed to prepare entry query")?;

        prepared
            .query_row(params_from_iter(stmt.params.iter()), entry_from_row)
            .optional()
            .sql_context("failed to load entry")?
            .ok_or_else(|| StorageError::NotFound(title.to_string()))
    }

    /// Every stored entry, in whatever order SQLite returns them.
    pub fn list_all(&self) -> StorageResult<Vec<Entry>> {
        let stmt = self.statements.all_entries();
        let mut prepared = self
            .conn
            .prepare_cached(&stmt.sql)
            .sql_context("failed to prepare entries query")?;

        let entries = prepared
            .query_map(params_from_iter(stmt.params.iter()), entry_from_row)
            .sql_context("failed to load entries")?
            .collect::<Result<Vec<_>, _>>()
            .sql_context("failed to collect entries")?;

        debug!(count = entries.len(), "loaded all entries");
        Ok(entries)
    }

    /// Every stored title, unordered.
    pub fn list_titles(&self) -> StorageResult<Vec<String>> {
        let stmt = self.statements.all_titles();
        let mut prepared = self
            .conn
            .prepare_cached(&stmt.sql)
            .sql_context("failed to prepare title query")?;

        let titles = prepared
            .query_map(params_from_iter(stmt.params.iter()), |row| row.get(0))
            .sql_context("failed to load titles")?
            .collect::<Result<Vec<String>, _>>()
            .sql_context("failed to collect titles")?;

        Ok(titles)
    }

    /// Distinct, non-blank categories.
    pub fn list_groups(&self) -> StorageResult<BTreeSet<String>> {
        let stmt = self.statements.distinct_groups();
        let mut prepared = self
            .conn
            .prepare_cached(&stmt.sql)
            .sql_context("failed to prepare group query")?;

        let mut rows = prepared
            .query(params_from_iter(stmt.params.iter()))
            .sql_context("failed to execute group query")?;

        let mut groups = BTreeSet::new();
        while let Some(row) = rows.next().sql_context("failed to fetch group row")? {
            let group: String = row.get(0).sql_context("failed to read group value")?;
            groups.insert(group);
        }

        Ok(groups)
    }

    fn execute(&self, stmt: &BoundStatement, context: &'static str) -> StorageResult<usize> {
        self.conn
            .prepare_cached(&stmt.sql)
            .and_then(|mut prepared| prepared.execute(params_from_iter(stmt.params.iter())))
            .sql_context(context)
    }
}

/// Hydrate an entry from a row selected with the shared column list.
fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<Entry> {
    Ok(Entry {
        title: row.get(0)?,
        email: row.get(1)?,
        secondary_email: row.get(2)?,
        password: row.get(3)?,
        username: row.get(4)?,
        phone_number: row.get(5)?,
        link: row.get(6)?,
        category: row.get(7)?,
        date_created: row.get(8)?,
        date_modified: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn store() -> EntryStore {
        EntryStore::open_in_memory().expect("in-memory store")
    }

    fn sample(title: &str) -> Entry {
        Entry::builder(title)
            .email("a@a.com")
            .password("password123")
            .username("example")
            .link("www.example.com")
            .category("example")
            .build()
    }

    #[test]
    fn create_then_get_round_trips_every_field() {
        let store = store();
        let entry = sample("Example");

        store.create(&entry).unwrap();
        let mut fetched = store.get("Example").unwrap();

        assert!(fetched.is_persisted());
        assert_eq!(fetched.date_created, fetched.date_modified);
        fetched.date_created = None;
        fetched.date_modified = None;
        assert_eq!(fetched, entry);
    }

    #[test]
    fn entry_with_only_a_title_round_trips() {
        let store = store();
        let entry = Entry::builder("Bare").build();

        store.create(&entry).unwrap();
        let fetched = store.get("Bare").unwrap();

        assert_eq!(fetched.email, None);
        assert_eq!(fetched.category, None);
        assert!(fetched.is_persisted());
    }

    #[test]
    fn second_insert_with_same_title_is_duplicate_key() {
        let store = store();
        store.create(&sample("Twice")).unwrap();

        let err = store.create(&Entry::builder("Twice").build()).unwrap_err();

        assert!(matches!(err, StorageError::DuplicateKey(ref t) if t == "Twice"));
        assert_eq!(store.get("Twice").unwrap().email.as_deref(), Some("a@a.com"));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = store().create(&Entry::builder("   ").build()).unwrap_err();
        assert!(matches!(err, StorageError::EmptyTitle));
    }

    #[test]
    fn update_changes_only_the_target_field_and_modified_date() {
        let store = store();
        store.create(&sample("Mail")).unwrap();
        let before = store.get("Mail").unwrap();

        thread::sleep(Duration::from_millis(5));
        store.update("Mail", EntryField::Password, "n3w").unwrap();
        let after = store.get("Mail").unwrap();

        assert_eq!(after.password.as_deref(), Some("n3w"));
        assert_eq!(after.date_created, before.date_created);
        assert!(after.date_modified > before.date_modified);
        assert_eq!(
            Entry { password: before.password.clone(), date_modified: before.date_modified, ..after },
            before
        );
    }

    #[test]
    fn patch_with_several_fields_keeps_values_in_their_columns() {
        let store = store();
        store.create(&sample("Phone")).unwrap();

        let patch = EntryPatch::set(EntryField::Username, "user-x")
            .with(EntryField::PhoneNumber, "555-0100");
        store.apply_patch("Phone", &patch).unwrap();
        let fetched = store.get("Phone").unwrap();

        assert_eq!(fetched.username.as_deref(), Some("user-x"));
        assert_eq!(fetched.phone_number.as_deref(), Some("555-0100"));
    }

    #[test]
    fn empty_patch_touches_the_row() {
        let store = store();
        store.create(&sample("Touch")).unwrap();
        let before = store.get("Touch").unwrap();

        thread::sleep(Duration::from_millis(5));
        store.apply_patch("Touch", &EntryPatch::default()).unwrap();
        let after = store.get("Touch").unwrap();

        assert!(after.date_modified > before.date_modified);
        assert_eq!(after.email, before.email);
    }

    #[test]
    fn update_delete_and_get_report_missing_titles() {
        let store = store();

        assert!(matches!(
            store.update("ghost", EntryField::Email, "x"),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(store.delete("ghost"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.get("ghost"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn delete_removes_the_row() {
        let store = store();
        store.create(&sample("Gone")).unwrap();

        store.delete("Gone").unwrap();

        assert!(matches!(store.get("Gone"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.delete("Gone"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn listings_cover_every_row() {
        let store = store();
        store.create(&sample("One")).unwrap();
        store
            .create(&Entry::builder("Two").category("Games").build())
            .unwrap();
        store.create(&Entry::builder("Three").category("").build()).unwrap();

        let mut titles = store.list_titles().unwrap();
        titles.sort();
        assert_eq!(titles, vec!["One", "Three", "Two"]);

        assert_eq!(store.list_all().unwrap().len(), 3);

        let groups: Vec<_> = store.list_groups().unwrap().into_iter().collect();
        assert_eq!(groups, vec!["Games", "example"]);
    }

    #[test]
    fn reopening_a_file_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let location = Location::File(dir.path().join("nested").join("vault.sqlite"));

        EntryStore::open(&location)
            .unwrap()
            .create(&sample("Persisted"))
            .unwrap();
        let reopened = EntryStore::open(&location).unwrap();

        assert_eq!(reopened.list_titles().unwrap(), vec!["Persisted"]);
    }

    #[test]
    fn file_that_is_not_a_database_fails_schema_setup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.sqlite");
        std::fs::write(&path, b"definitely not sqlite\n".repeat(256)).unwrap();

        let err = EntryStore::open(&Location::File(path)).err().unwrap();

        assert!(matches!(err, StorageError::Schema(_)), "{err:?}");
    }
}
