//! An in-memory store, constructed explicitly and shared by reference.

use std::sync::RwLock;

use crate::models::{Book, NewVerse, Translation, Verse};
use crate::passage::{MetadataLookup, VerseLookup, VerseQuery};
use crate::seed::{sample_books, sample_translations, sample_verses};
use crate::sword_drill::{canonical_position, sanitize_search, SwordDrillable, SEARCH_RESULT_LIMIT};
use crate::DbError;

/// Verses, books and translations held in memory.
///
/// Verses are kept in insertion order; lookups return them unsorted.
#[derive(Debug)]
pub struct BibleData {
    translations: Vec<Translation>,
    books: Vec<Book>,
    verses: RwLock<Vec<Verse>>,
}

impl BibleData {
    pub fn new(translations: Vec<Translation>, books: Vec<Book>, verses: Vec<NewVerse>) -> Self {
        let verses = verses
            .into_iter()
            .enumerate()
            .map(|(i, v)| v.with_id(i as i32 + 1))
            .collect();

        Self {
            translations,
            books,
            verses: RwLock::new(verses),
        }
    }

    /// The same data a freshly seeded database holds.
    pub fn sample() -> Self {
        Self::new(sample_translations(), sample_books(), sample_verses())
    }

    fn poisoned() -> DbError {
        DbError::Other {
            cause: "verse store lock was poisoned".to_string(),
        }
    }
}

impl VerseLookup for BibleData {
    fn find(&self, query: &VerseQuery) -> Result<Vec<Verse>, DbError> {
        let verses = self.verses.read().map_err(|_| Self::poisoned())?;
        Ok(verses.iter().filter(|v| query.matches(v)).cloned().collect())
    }
}

impl MetadataLookup for BibleData {
    fn translation(&self, id: &str) -> Result<Option<Translation>, DbError> {
        Ok(self.translations.iter().find(|t| t.id == id).cloned())
    }
}

impl SwordDrillable for BibleData {
    fn all_translations(&self) -> Result<Vec<Translation>, DbError> {
        Ok(self.translations.clone())
    }

    fn all_books(&self) -> Result<Vec<Book>, DbError> {
        let mut books = self.books.clone();
        books.sort_by_key(|book| canonical_position(&book.id));
        Ok(books)
    }

    fn search(&self, query: &str) -> Result<Vec<Verse>, DbError> {
        let query = match sanitize_search(query) {
            Some(query) => query.to_lowercase(),
            None => return Ok(vec![]),
        };

        let verses = self.verses.read().map_err(|_| Self::poisoned())?;
        Ok(verses
            .iter()
            .filter(|v| v.text.to_lowercase().contains(&query))
            .take(SEARCH_RESULT_LIMIT as usize)
            .cloned()
            .collect())
    }

    fn add_verse(&self, verse: NewVerse) -> Result<(), DbError> {
        let mut verses = self.verses.write().map_err(|_| Self::poisoned())?;
        let id = verses.len() as i32 + 1;
        verses.push(verse.with_id(id));
        Ok(())
    }
}
