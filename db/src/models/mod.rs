use diesel::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::schema::{books, translations, verses};

/// Model representing a Bible verse in one translation.
#[derive(Clone, Debug, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = verses)]
pub struct Verse {
    #[serde(skip)]
    pub id: i32,
    #[serde(skip)]
    pub translation_id: String,
    pub book_id: String,
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub text: String,
}

/// A verse that has not been stored yet.
#[derive(Clone, Debug, PartialEq, Insertable, Serialize, Deserialize)]
#[diesel(table_name = verses)]
pub struct NewVerse {
    pub translation_id: String,
    pub book_id: String,
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub text: String,
}

impl NewVerse {
    /// Attaches a storage id, producing the stored form of the verse.
    pub fn with_id(self, id: i32) -> Verse {
        Verse {
            id,
            translation_id: self.translation_id,
            book_id: self.book_id,
            book_name: self.book_name,
            chapter: self.chapter,
            verse: self.verse,
            text: self.text,
        }
    }
}

/// Model representing a translation (edition) of the text.
#[derive(
    Clone, Debug, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize,
)]
#[diesel(table_name = translations)]
pub struct Translation {
    pub id: String,
    pub name: String,
    pub note: String,
}

/// Model representing a book of the Bible.
#[derive(
    Clone, Debug, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize,
)]
#[diesel(table_name = books)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub chapters: i32,
}

mod alias;
mod reference;
pub use self::alias::AliasTable;
pub use self::reference::ParsedReference;
