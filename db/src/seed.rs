//! Seeding of an empty database with translations, books and verses.
//!
//! Each table is seeded only when it holds no rows, so running the seed
//! against an existing database is a no-op.

use std::fs;
use std::path::Path;

use diesel::prelude::*;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

use crate::canon::{BEN, BEN_CHAPTERS, BEN_NAME, BOOKS};
use crate::models::{Book, NewVerse, Translation};
use crate::DbError;

/// Number of rows inserted per table by a seed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub translations: usize,
    pub books: usize,
    pub verses: usize,
}

/// Seeds every empty table. Chapter files found in `chapters_dir` are
/// loaded as the Book of Jachanan Ben Kathryn (see [load_chapters]).
pub fn initialize_data(
    conn: &mut SqliteConnection,
    chapters_dir: Option<&Path>,
) -> Result<SeedReport, DbError> {
    let report = SeedReport {
        translations: initialize_translations(conn)?,
        books: initialize_books(conn)?,
        verses: initialize_verses(conn, chapters_dir)?,
    };
    info!(
        "Seeded {} translations, {} books, {} verses",
        report.translations, report.books, report.verses
    );
    Ok(report)
}

fn initialize_translations(conn: &mut SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::translations as t;

    let count: i64 = t::table.count().get_result(conn)?;
    if count > 0 {
        debug!("Translations already initialized");
        return Ok(0);
    }

    diesel::insert_into(t::table)
        .values(&sample_translations())
        .execute(conn)
        .map_err(DbError::from)
}

fn initialize_books(conn: &mut SqliteConnection) -> Result<usize, DbError> {
    use crate::schema::books as b;

    let count: i64 = b::table.count().get_result(conn)?;
    if count > 0 {
        debug!("Books already initialized");
        return Ok(0);
    }

    diesel::insert_into(b::table)
        .values(&sample_books())
        .execute(conn)
        .map_err(DbError::from)
}

fn initialize_verses(
    conn: &mut SqliteConnection,
    chapters_dir: Option<&Path>,
) -> Result<usize, DbError> {
    use crate::schema::verses as v;

    let count: i64 = v::table.count().get_result(conn)?;
    if count > 0 {
        debug!("Verses already initialized");
        return Ok(0);
    }

    let mut verses = sample_verses();
    if let Some(dir) = chapters_dir {
        verses.extend(load_chapters(dir)?);
    }

    conn.transaction(|conn| {
        diesel::insert_into(v::table)
            .values(&verses)
            .execute(conn)
    })
    .map_err(DbError::from)
}

/// The translations every database starts with.
pub fn sample_translations() -> Vec<Translation> {
    [
        ("cuv", "Chinese Union Version"),
        ("kjv", "King James Version"),
        ("en", "English Version"),
    ]
    .iter()
    .map(|(id, name)| Translation {
        id: id.to_string(),
        name: name.to_string(),
        note: "Public Domain".to_string(),
    })
    .collect()
}

/// The canonical books followed by the Book of Jachanan Ben Kathryn.
pub fn sample_books() -> Vec<Book> {
    BOOKS
        .iter()
        .map(|(id, name, chapters)| (*id, *name, *chapters))
        .chain(std::iter::once((BEN, BEN_NAME, BEN_CHAPTERS)))
        .map(|(id, name, chapters)| Book {
            id: id.to_string(),
            name: name.to_string(),
            chapters,
        })
        .collect()
}

/// Genesis 1:1-5 (KJV) and John 3:16 (CUV).
pub fn sample_verses() -> Vec<NewVerse> {
    let genesis = [
        "In the beginning God created the heaven and the earth.",
        "And the earth was without form, and void; and darkness was upon the face of the deep. And the Spirit of God moved upon the face of the waters.",
        "And God said, Let there be light: and there was light.",
        "And God saw the light, that it was good: and God divided the light from the darkness.",
        "And God called the light Day, and the darkness he called Night. And the evening and the morning were the first day.",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| NewVerse {
        translation_id: "kjv".to_string(),
        book_id: "GEN".to_string(),
        book_name: "Genesis".to_string(),
        chapter: 1,
        verse: i as i32 + 1,
        text: text.to_string(),
    });

    let john = NewVerse {
        translation_id: "cuv".to_string(),
        book_id: "JHN".to_string(),
        book_name: "約翰福音".to_string(),
        chapter: 3,
        verse: 16,
        text: "神愛世人，甚至將他的獨生子賜給他們，叫一切信他的，不至滅亡，反得永生。".to_string(),
    };

    genesis.chain(std::iter::once(john)).collect()
}

/// Loads `chapter{N}.json` files from `dir` as chapter N of the Book of
/// Jachanan Ben Kathryn in the `en` translation.
///
/// Each file holds a JSON array of verse texts, verse 1 first. Other files
/// are ignored, as are chapter numbers outside the book.
pub fn load_chapters(dir: &Path) -> Result<Vec<NewVerse>, DbError> {
    lazy_static! {
        static ref CHAPTER_FILE: Regex = Regex::new(r"^chapter(\d+)\.json$").unwrap();
    }

    let seed_err = |cause: String| DbError::Seed { cause };

    let mut chapters: Vec<(i32, std::path::PathBuf)> = vec![];
    for entry in fs::read_dir(dir).map_err(|e| seed_err(format!("{}: {e}", dir.display())))? {
        let path = entry.map_err(|e| seed_err(e.to_string()))?.path();
        let chapter = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| CHAPTER_FILE.captures(name))
            .and_then(|caps| caps[1].parse::<i32>().ok())
            .filter(|n| (1..=BEN_CHAPTERS).contains(n));
        if let Some(chapter) = chapter {
            chapters.push((chapter, path));
        }
    }
    chapters.sort();

    let mut verses = vec![];
    for (chapter, path) in chapters {
        let content =
            fs::read_to_string(&path).map_err(|e| seed_err(format!("{}: {e}", path.display())))?;
        let texts: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| seed_err(format!("{}: {e}", path.display())))?;
        debug!("Loaded {} verses for chapter {}", texts.len(), chapter);

        verses.extend(texts.into_iter().enumerate().map(|(i, text)| NewVerse {
            translation_id: "en".to_string(),
            book_id: BEN.to_string(),
            book_name: BEN_NAME.to_string(),
            chapter,
            verse: i as i32 + 1,
            text,
        }));
    }

    Ok(verses)
}
