//! SQL text and bind parameters for every query the store runs. Nothing in
//! here touches a connection: each builder returns a [`BoundStatement`] whose
//! placeholders line up with its parameter list, and the store executes it.
//! Keeping construction separate from execution means the exact SQL can be
//! unit tested without a database.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;

use crate::models::{Entry, EntryField, EntryPatch};

/// Name of the single table that holds entries.
pub const ENTRIES_TABLE: &str = "ENTRIES";

pub(crate) const TITLE_COLUMN: &str = "title";
pub(crate) const DATE_MODIFIED_COLUMN: &str = "date_modified";

/// Text layout used for timestamps. Matches what rusqlite's chrono support
/// writes and reads back, so stored values round-trip without loss.
const TIMESTAMP_FORMAT: &str = "%F %T%.f%:z";

/// Column list shared by every `SELECT` that hydrates a full entry. The store
/// reads rows by position, so the order here is load-bearing.
const ENTRY_COLUMNS: &str = "title, email, secondary_email, password, username, \
                             phone_number, link, category, date_created, date_modified";

/// SQL plus positional parameters, ready to hand to the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BoundStatement {
    fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Builds parameterized statements for the `ENTRIES` schema.
///
/// "Now" is sampled when a statement is built, not when SQLite runs it, which
/// is what lets an insert stamp `date_created` and `date_modified` with the
/// same instant.
#[derive(Debug, Clone, Copy)]
pub struct StatementFactory {
    clock: fn() -> DateTime<Utc>,
}

impl Default for StatementFactory {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl StatementFactory {
    /// Factory that stamps with the system clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom time source. Tests pin the clock to assert on stamps.
    pub fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }

    /// Idempotent table creation.
    pub fn create_schema(&self) -> BoundStatement {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {ENTRIES_TABLE} (
                title TEXT NOT NULL PRIMARY KEY,
                email TEXT,
                secondary_email TEXT,
                password TEXT,
                username TEXT,
                phone_number TEXT,
                link TEXT,
                category TEXT,
                date_created TIMESTAMP NOT NULL,
                date_modified TIMESTAMP NOT NULL
            )"
        );
        BoundStatement::new(sql, Vec::new())
    }

    /// Insert every field of `entry`. Any timestamps already on the entry are
    /// ignored in favour of a fresh stamp.
    pub fn insert(&self, entry: &Entry) -> BoundStatement {
        let now = timestamp_value((self.clock)());

        let mut params = Vec::with_capacity(10);
        params.push(Value::Text(entry.title.clone()));
        params.extend(
            EntryField::ALL
                .into_iter()
                .map(|field| optional_text(entry.field(field))),
        );
        params.push(now.clone());
        params.push(now);

        let sql = format!(
            "INSERT INTO {ENTRIES_TABLE} ({ENTRY_COLUMNS}) VALUES ({})",
            placeholders(params.len())
        );
        BoundStatement::new(sql, params)
    }

    /// Selective update: one `SET` clause per field present in `patch`, then
    /// the modification stamp, then the row anchor. Clause text and bind
    /// order are both produced from the same ordered list of pairs, and the
    /// title is always the final parameter.
    ///
    /// An empty patch is legal and only touches `date_modified`.
    pub fn update(&self, title: &str, patch: &EntryPatch) -> BoundStatement {
        let mut assignments: Vec<(&'static str, Value)> = patch
            .changes()
            .map(|(field, value)| (field.column(), Value::Text(value.to_string())))
            .collect();
        assignments.push((DATE_MODIFIED_COLUMN, timestamp_value((self.clock)())));

        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE {ENTRIES_TABLE} SET {set_clause} WHERE {TITLE_COLUMN} = ?");

        let mut params: Vec<Value> = assignments.into_iter().map(|(_, value)| value).collect();
        params.push(Value::Text(title.to_string()));
        BoundStatement::new(sql, params)
    }

    /// Remove the row keyed by `title`.
    pub fn delete(&self, title: &str) -> BoundStatement {
        BoundStatement::new(
            format!("DELETE FROM {ENTRIES_TABLE} WHERE {TITLE_COLUMN} = ?"),
            vec![Value::Text(title.to_string())],
        )
    }

    /// Full row for one title.
    pub fn get_by_title(&self, title: &str) -> BoundStatement {
        BoundStatement::new(
            format!("SELECT {ENTRY_COLUMNS} FROM {ENTRIES_TABLE} WHERE {TITLE_COLUMN} = ?"),
            vec![Value::Text(title.to_string())],
        )
    }

    /// Every row in one pass. No `ORDER BY`: ordering is the cache's job.
    pub fn all_entries(&self) -> BoundStatement {
        BoundStatement::new(
            format!("SELECT {ENTRY_COLUMNS} FROM {ENTRIES_TABLE}"),
            Vec::new(),
        )
    }

    /// Just the title column, unordered.
    pub fn all_titles(&self) -> BoundStatement {
        BoundStatement::new(
            format!("SELECT {TITLE_COLUMN} FROM {ENTRIES_TABLE}"),
            Vec::new(),
        )
    }

    /// Distinct non-blank categories.
    pub fn distinct_groups(&self) -> BoundStatement {
        BoundStatement::new(
            format!(
                "SELECT DISTINCT category FROM {ENTRIES_TABLE}
                 WHERE category IS NOT NULL AND category <> ''"
            ),
            Vec::new(),
        )
    }
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

fn timestamp_value(instant: DateTime<Utc>) -> Value {
    Value::Text(instant.format(TIMESTAMP_FORMAT).to_string())
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
