//! Title ordering shared by the cache and anything else that lists entries.
//!
//! Plain byte order would put "Zoom" before "apple". Users browsing an
//! alphabetical list expect letters to group regardless of case, so the
//! primary key is the lowercase character and case only breaks ties.

use std::borrow::Borrow;
use std::cmp::{Ordering, Reverse};

use crate::models::Entry;

/// Total order over titles: case-insensitive first, lowercase before
/// uppercase for the same letter, shorter prefix first.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    for (left, right) in a.chars().zip(b.chars()) {
        if left == right {
            continue;
        }
        return char_key(left).cmp(&char_key(right));
    }
    a.chars().count().cmp(&b.chars().count())
}

/// Sort key for one character: the folded letter, then lowercase before
/// anything else, then reverse code point so the remaining case variants
/// still order deterministically.
fn char_key(c: char) -> (char, bool, Reverse<char>) {
    (fold(c), !c.is_lowercase(), Reverse(c))
}

/// Single-character lowercase. Characters whose lowercase form expands to
/// several code points keep their first one.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Orders [`Entry`] values by title using [`compare_titles`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleComparator;

impl TitleComparator {
    /// Compare two entries by title.
    pub fn compare(&self, a: &Entry, b: &Entry) -> Ordering {
        compare_titles(&a.title, &b.title)
    }

    /// Sort a slice of entries or shared entry handles.
    pub fn sort<E: Borrow<Entry>>(&self, entries: &mut [E]) {
        entries.sort_by(|a, b| self.compare(a.borrow(), b.borrow()));
    }
}
