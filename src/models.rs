//! Domain models that mirror the `ENTRIES` table and get passed between the
//! store, the cache and the search index. The types stay plain data holders;
//! persistence rules live in `db` and ordering rules in `ordering`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One stored credential record. The title doubles as the primary key, every
/// other field is optional because users rarely fill in all of them.
pub struct Entry {
    /// Unique, non-empty key. Never changes after insert.
    pub title: String,
    pub email: Option<String>,
    pub secondary_email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub link: Option<String>,
    /// Free-form group name used to bucket entries in the UI.
    pub category: Option<String>,
    /// Set by the store on insert. `None` until the entry has been persisted.
    pub date_created: Option<DateTime<Utc>>,
    /// Set by the store on insert and bumped on every update.
    pub date_modified: Option<DateTime<Utc>>,
}

impl Entry {
    /// Start building an entry. Only the title is required.
    pub fn builder(title: impl Into<String>) -> EntryBuilder {
        EntryBuilder::new(title)
    }

    /// Read one editable field by name.
    pub fn field(&self, field: EntryField) -> Option<&str> {
        let value = match field {
            EntryField::Email => &self.email,
            EntryField::SecondaryEmail => &self.secondary_email,
            EntryField::Password => &self.password,
            EntryField::Username => &self.username,
            EntryField::PhoneNumber => &self.phone_number,
            EntryField::Link => &self.link,
            EntryField::Category => &self.category,
        };
        value.as_deref()
    }

    /// Case-insensitive substring test against the title. An empty query
    /// matches everything.
    pub fn title_contains(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.to_lowercase())
    }

    /// True once the store has stamped the entry.
    pub fn is_persisted(&self) -> bool {
        self.date_created.is_some() && self.date_modified.is_some()
    }
}

impl fmt::Display for Entry {
    /// Multi-line rendering for terminals and logs. The password is masked so
    /// the output is safe to paste into bug reports.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        for field in EntryField::ALL {
            let value = match (field, self.field(field)) {
                (_, None) => "",
                (EntryField::Password, Some(_)) => "********",
                (_, Some(value)) => value,
            };
            writeln!(f, "\t{}: {}", field.label(), value)?;
        }
        if let Some(created) = self.date_created {
            writeln!(f, "\tDate Created: {}", created.format("%Y-%m-%d %H:%M:%S"))?;
        }
        if let Some(modified) = self.date_modified {
            writeln!(f, "\tDate Modified: {}", modified.format("%Y-%m-%d %H:%M:%S"))?;
        }
        Ok(())
    }
}

/// Fluent constructor for [`Entry`]. Timestamps are deliberately not settable:
/// only the store assigns them.
#[derive(Debug, Clone)]
pub struct EntryBuilder {
    entry: Entry,
}

impl EntryBuilder {
    /// Builder with only the title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            entry: Entry {
                title: title.into(),
                email: None,
                secondary_email: None,
                password: None,
                username: None,
                phone_number: None,
                link: None,
                category: None,
                date_created: None,
                date_modified: None,
            },
        }
    }

    /// Primary email address.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.entry.email = Some(email.into());
        self
    }

    /// Backup or recovery email address.
    pub fn secondary_email(mut self, secondary_email: impl Into<String>) -> Self {
        self.entry.secondary_email = Some(secondary_email.into());
        self
    }

    /// Stored password, kept as plain text.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.entry.password = Some(password.into());
        self
    }

    /// Login name, when it differs from the email.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.entry.username = Some(username.into());
        self
    }

    /// Phone number tied to the account.
    pub fn phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.entry.phone_number = Some(phone_number.into());
        self
    }

    /// Login or home page URL.
    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.entry.link = Some(link.into());
        self
    }

    /// Group the entry is filed under.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.entry.category = Some(category.into());
        self
    }

    /// Set any editable field by name. Handy for callers that carry the field
    /// as data, such as the CLI.
    pub fn field(mut self, field: EntryField, value: impl Into<String>) -> Self {
        *self.entry.slot_mut(field) = Some(value.into());
        self
    }

    /// Finish building. The entry has no timestamps yet.
    pub fn build(self) -> Entry {
        self.entry
    }
}

impl Entry {
    fn slot_mut(&mut self, field: EntryField) -> &mut Option<String> {
        match field {
            EntryField::Email => &mut self.email,
            EntryField::SecondaryEmail => &mut self.secondary_email,
            EntryField::Password => &mut self.password,
            EntryField::Username => &mut self.username,
            EntryField::PhoneNumber => &mut self.phone_number,
            EntryField::Link => &mut self.link,
            EntryField::Category => &mut self.category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The user-editable columns of an entry. Title and the two timestamps are
/// intentionally absent: the title is the key and the timestamps belong to
/// the store.
pub enum EntryField {
    Email,
    SecondaryEmail,
    Password,
    Username,
    PhoneNumber,
    Link,
    Category,
}

impl EntryField {
    /// Every editable field in schema column order.
    pub const ALL: [EntryField; 7] = [
        EntryField::Email,
        EntryField::SecondaryEmail,
        EntryField::Password,
        EntryField::Username,
        EntryField::PhoneNumber,
        EntryField::Link,
        EntryField::Category,
    ];

    /// Column name in the `ENTRIES` table.
    pub fn column(self) -> &'static str {
        match self {
            EntryField::Email => "email",
            EntryField::SecondaryEmail => "secondary_email",
            EntryField::Password => "password",
            EntryField::Username => "username",
            EntryField::PhoneNumber => "phone_number",
            EntryField::Link => "link",
            EntryField::Category => "category",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            EntryField::Email => "Email",
            EntryField::SecondaryEmail => "Secondary Email",
            EntryField::Password => "Password",
            EntryField::Username => "Username",
            EntryField::PhoneNumber => "Phone Number",
            EntryField::Link => "Link",
            EntryField::Category => "Category",
        }
    }
}

impl fmt::Display for EntryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown entry field {0:?}")]
pub struct UnknownField(pub String);

impl FromStr for EntryField {
    type Err = UnknownField;

    /// Accepts the column name, with dashes or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        EntryField::ALL
            .into_iter()
            .find(|field| field.column() == normalized)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A set of optional field changes for one entry. `Some` means "change to
/// this value", `None` means "leave as is". An empty string clears the field
/// to blank.
pub struct EntryPatch {
    pub email: Option<String>,
    pub secondary_email: Option<String>,
    pub password: Option<String>,
    pub username: Option<String>,
    pub phone_number: Option<String>,
    pub link: Option<String>,
    pub category: Option<String>,
}

impl EntryPatch {
    /// Patch that changes exactly one field.
    pub fn set(field: EntryField, value: impl Into<String>) -> Self {
        Self::default().with(field, value)
    }

    /// Also change `field` to `value`.
    pub fn with(mut self, field: EntryField, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = Some(value.into());
        self
    }

    /// New value for `field`, if the patch changes it.
    pub fn get(&self, field: EntryField) -> Option<&str> {
        let value = match field {
            EntryField::Email => &self.email,
            EntryField::SecondaryEmail => &self.secondary_email,
            EntryField::Password => &self.password,
            EntryField::Username => &self.username,
            EntryField::PhoneNumber => &self.phone_number,
            EntryField::Link => &self.link,
            EntryField::Category => &self.category,
        };
        value.as_deref()
    }

    /// Present fields in schema column order.
    pub fn changes(&self) -> impl Iterator<Item = (EntryField, &str)> + '_ {
        EntryField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
    }

    /// True when the patch changes no field.
    pub fn is_empty(&self) -> bool {
        self.changes().next().is_none()
    }

    fn slot_mut(&mut self, field: EntryField) -> &mut Option<String> {
        match field {
            EntryField::Email => &mut self.email,
            EntryField::SecondaryEmail => &mut self.secondary_email,
            EntryField::Password => &mut self.password,
            EntryField::Username => &mut self.username,
            EntryField::PhoneNumber => &mut self.phone_number,
            EntryField::Link => &mut self.link,
            EntryField::Category => &mut self.category,
        }
    }
}
