//! Read-side mirrors of the store: the sorted entry cache and the search
//! index derived from it.

mod entries;
mod search;

pub use entries::EntryCache;
pub use search::{DisplayUnit, SearchIndex};
