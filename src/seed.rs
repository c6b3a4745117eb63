//! Demo data for trying the vault out without typing entries by hand.

use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

use crate::models::Entry;

/// Service names used as titles. Titles must be unique, so this also caps how
/// many demo entries can be generated.
const TITLES: &[&str] = &[
    "Facebook", "Gmail", "Twitter", "LinkedIn", "Instagram", "Reddit", "Amazon", "Netflix",
    "Dropbox", "GitHub", "Yahoo", "Microsoft", "Google Drive", "Twitch", "Slack", "WhatsApp",
    "Zoom", "Skype", "Discord", "Pinterest", "Tumblr", "Snapchat", "Ebay", "PayPal", "Spotify",
    "Apple", "PlayStation", "Xbox", "Nintendo", "Steam",
];

const EMAILS: &[&str] = &[
    "john.doe@example.com",
    "jane.doe@example.com",
    "testuser@example.com",
    "info@example.com",
    "support@example.com",
    "admin@example.com",
    "developer@example.com",
    "billing@example.com",
];

const USERNAMES: &[&str] = &[
    "john_doe", "jane_doe", "testuser", "admin", "developer", "webmaster", "user1", "user2",
];

const CATEGORIES: &[&str] = &[
    "Social Media",
    "Email",
    "Professional",
    "Shopping",
    "Streaming",
    "Cloud Storage",
    "Development",
    "Gaming",
    "Communication",
    "Finance",
];

/// Largest batch [`demo_entries`] can produce.
pub fn max_demo_entries() -> usize {
    TITLES.len()
}

/// Up to `count` entries with distinct titles and random details. Roughly one
/// in four has no link.
pub fn demo_entries<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Entry> {
    TITLES
        .iter()
        .choose_multiple(rng, count.min(TITLES.len()))
        .into_iter()
        .map(|title| {
            let mut builder = Entry::builder(*title)
                .email(pick(EMAILS, rng))
                .password(crate::password::generate_password_with(rng))
                .username(pick(USERNAMES, rng))
                .category(pick(CATEGORIES, rng));
            if rng.gen_bool(0.75) {
                let slug: String = title
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase();
                builder = builder.link(format!("https://www.{slug}.com"));
            }
            builder.build()
        })
        .collect()
}

fn pick<R: Rng + ?Sized>(items: &[&'static str], rng: &mut R) -> &'static str {
    items.choose(rng).copied().unwrap_or_default()
}
