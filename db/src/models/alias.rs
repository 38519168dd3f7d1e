use std::cmp::Reverse;
use std::collections::HashMap;

use crate::canon::{BOOKS, EXTRA_ALIASES, SHORT_ALIASES};

/// Lower-cases a string and collapses runs of whitespace into single spaces.
pub(crate) fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Mapping of book name spellings to canonical book codes.
///
/// Keys are stored normalized (see [normalize]), so lookups are
/// case-insensitive and ignore extra whitespace. Each alias maps to exactly
/// one book code; registering an alias twice keeps the last code.
///
/// The substring fallback walks aliases longest first (by character count),
/// ties broken alphabetically, so a short alias nested inside a longer one
/// ("john" inside "1 john") never shadows it. Aliases added through
/// [AliasTable::with_exact] take no part in the fallback, so book codes like
/// "est" do not match inside ordinary words such as "testament".
#[derive(Clone, Debug)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
    fallback_order: Vec<String>,
}

impl AliasTable {
    /// Builds a table from `(alias, book code)` pairs, all of which take
    /// part in the substring fallback.
    pub fn new<I, A, B>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>,
    {
        let mut table = Self {
            aliases: HashMap::new(),
            fallback_order: vec![],
        };
        for alias in table.insert(entries) {
            if !table.fallback_order.contains(&alias) {
                table.fallback_order.push(alias);
            }
        }
        table.fallback_order.sort_by(|a, b| {
            (Reverse(a.chars().count()), a).cmp(&(Reverse(b.chars().count()), b))
        });
        table
    }

    /// Adds aliases that only match an exact book name.
    pub fn with_exact<I, A, B>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>,
    {
        let added = self.insert(entries);
        self.fallback_order.retain(|alias| !added.contains(alias));
        self
    }

    /// Inserts normalized entries, returning the aliases written.
    fn insert<I, A, B>(&mut self, entries: I) -> Vec<String>
    where
        I: IntoIterator<Item = (A, B)>,
        A: AsRef<str>,
        B: Into<String>,
    {
        let mut added = vec![];
        for (alias, book) in entries {
            let alias = normalize(alias.as_ref());
            if alias.is_empty() {
                continue;
            }
            self.aliases.insert(alias.clone(), book.into());
            added.push(alias);
        }
        added
    }

    /// Looks up a book code by exact (normalized) alias.
    pub fn get(&self, alias: &str) -> Option<&str> {
        self.aliases.get(&normalize(alias)).map(String::as_str)
    }

    /// Finds the first alias, in fallback order, contained in `haystack`.
    pub fn find_within(&self, haystack: &str) -> Option<&str> {
        let haystack = normalize(haystack);
        self.fallback_order
            .iter()
            .find(|alias| haystack.contains(alias.as_str()))
            .and_then(|alias| self.aliases.get(alias))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for AliasTable {
    /// The built-in table: English book names and the extra spellings from
    /// [EXTRA_ALIASES], plus book codes and [SHORT_ALIASES] as exact-only
    /// aliases.
    fn default() -> Self {
        let names = BOOKS.iter().map(|(code, name, _)| (*name, *code));
        let extras = EXTRA_ALIASES.iter().copied();
        let codes = BOOKS.iter().map(|(code, _, _)| (*code, *code));
        let short = SHORT_ALIASES.iter().copied();

        Self::new(names.chain(extras)).with_exact(codes.chain(short))
    }
}
