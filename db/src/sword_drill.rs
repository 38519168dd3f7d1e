use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::models::*;
use crate::passage::{MetadataLookup, VerseLookup, VerseQuery};
use crate::{DbError, SqliteConnectionPool};

/// Max number of search results returned from the database.
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Trait implemented by stores that can look up passages and list the
/// catalogue of books and translations.
pub trait SwordDrillable: VerseLookup + MetadataLookup + Send + Sync {
    /// Gets all translations.
    fn all_translations(&self) -> Result<Vec<Translation>, DbError>;

    /// Gets all books, in canonical order.
    fn all_books(&self) -> Result<Vec<Book>, DbError>;

    /// Finds verses whose text contains the query, ignoring case.
    ///
    /// LIKE wildcards (`%`, `_`) and backslashes are stripped from the query
    /// first; a query with nothing left returns no results.
    fn search(&self, query: &str) -> Result<Vec<Verse>, DbError>;

    /// Stores a new verse.
    fn add_verse(&self, verse: NewVerse) -> Result<(), DbError>;
}

/// Strips LIKE wildcards from a search query, returning `None` when
/// nothing searchable is left.
pub(crate) fn sanitize_search(query: &str) -> Option<String> {
    lazy_static! {
        static ref WILDCARDS: Regex = Regex::new(r"[%_\\]+").unwrap();
    }

    let query = WILDCARDS.replace_all(query, "");
    let query = query.trim();
    if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    }
}

/// SQLite implementation of [SwordDrillable].
#[derive(Clone)]
pub struct SwordDrill {
    pool: SqliteConnectionPool,
}

impl SwordDrill {
    pub fn new(pool: SqliteConnectionPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<SqliteConnection>>, DbError> {
        self.pool.get().map_err(|e| DbError::ConnectionPool {
            cause: e.to_string(),
        })
    }
}

impl VerseLookup for SwordDrill {
    fn find(&self, query: &VerseQuery) -> Result<Vec<Verse>, DbError> {
        use crate::schema::verses as v;

        let mut conn = self.conn()?;
        let mut statement = v::table
            .filter(v::translation_id.eq(query.translation_id.as_str()))
            .filter(v::book_id.eq(query.book_id.as_str()))
            .filter(v::chapter.eq(query.chapter))
            .order_by(v::verse.asc())
            .select(Verse::as_select())
            .into_boxed();

        if let Some(ref verses) = query.verses {
            statement = if verses.start() == verses.end() {
                statement.filter(v::verse.eq(*verses.start()))
            } else {
                statement.filter(v::verse.between(*verses.start(), *verses.end()))
            };
        }

        let verses = statement.load(&mut *conn)?;
        debug!("{} verses matched {:?}", verses.len(), query);
        Ok(verses)
    }
}

impl MetadataLookup for SwordDrill {
    fn translation(&self, id: &str) -> Result<Option<Translation>, DbError> {
        use crate::schema::translations as t;

        let mut conn = self.conn()?;
        t::table
            .find(id)
            .select(Translation::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(DbError::from)
    }
}

impl SwordDrillable for SwordDrill {
    fn all_translations(&self) -> Result<Vec<Translation>, DbError> {
        use crate::schema::translations as t;

        let mut conn = self.conn()?;
        t::table
            .select(Translation::as_select())
            .load(&mut *conn)
            .map_err(DbError::from)
    }

    fn all_books(&self) -> Result<Vec<Book>, DbError> {
        use crate::schema::books as b;

        let mut conn = self.conn()?;
        let mut books: Vec<Book> = b::table.select(Book::as_select()).load(&mut *conn)?;
        books.sort_by_key(|book| canonical_position(&book.id));
        Ok(books)
    }

    fn search(&self, query: &str) -> Result<Vec<Verse>, DbError> {
        use crate::schema::verses as v;

        let query = match sanitize_search(query) {
            Some(query) => query,
            None => return Ok(vec![]),
        };

        let mut conn = self.conn()?;
        v::table
            .filter(v::text.like(format!("%{query}%")))
            .order_by(v::id.asc())
            .limit(SEARCH_RESULT_LIMIT)
            .select(Verse::as_select())
            .load(&mut *conn)
            .map_err(DbError::from)
    }

    fn add_verse(&self, verse: NewVerse) -> Result<(), DbError> {
        use crate::schema::verses as v;

        let mut conn = self.conn()?;
        diesel::insert_into(v::table)
            .values(&verse)
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(DbError::from)
    }
}

/// Position of a book in the canon; unknown books sort last.
pub(crate) fn canonical_position(book_id: &str) -> usize {
    crate::canon::BOOKS
        .iter()
        .position(|(code, _, _)| *code == book_id)
        .unwrap_or(crate::canon::BOOKS.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::PassageAssembler;
    use crate::{build_pool, run_migrations, seed, PassageError};

    /// A migrated and seeded in-memory database behind a single connection.
    fn drill() -> SwordDrill {
        let pool = build_pool(":memory:", 1).unwrap();
        {
            let mut conn = pool.get().unwrap();
            run_migrations(&mut conn).unwrap();
            seed::initialize_data(&mut conn, None).unwrap();
        }
        SwordDrill::new(pool)
    }

    #[test]
    fn find() {
        let drill = drill();
        let query = VerseQuery {
            translation_id: "kjv".to_string(),
            book_id: "GEN".to_string(),
            chapter: 1,
            verses: Some(2..=4),
        };
        let verses = drill.find(&query).unwrap();
        assert_eq!(
            verses.iter().map(|v| v.verse).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );

        let whole = VerseQuery {
            verses: None,
            ..query.clone()
        };
        assert_eq!(drill.find(&whole).unwrap().len(), 5);

        let single = VerseQuery {
            verses: Some(3..=3),
            ..query.clone()
        };
        assert_eq!(
            drill.find(&single).unwrap()[0].text,
            "And God said, Let there be light: and there was light."
        );

        let other_translation = VerseQuery {
            translation_id: "cuv".to_string(),
            ..query
        };
        assert!(drill.find(&other_translation).unwrap().is_empty());
    }

    #[test]
    fn translation() {
        let drill = drill();
        assert_eq!(
            drill.translation("kjv").unwrap().map(|t| t.name),
            Some("King James Version".to_string())
        );
        assert_eq!(drill.translation("xx").unwrap(), None);
    }

    #[test]
    fn catalogue() {
        let drill = drill();
        assert_eq!(drill.all_translations().unwrap().len(), 3);

        let books = drill.all_books().unwrap();
        assert_eq!(books.len(), 67);
        assert_eq!(books[0].id, "GEN");
        assert_eq!(books[64].name, "Jude");
        assert_eq!(books[66].id, "BEN");
        assert_eq!(books[66].chapters, 73);
    }

    #[test]
    fn search() {
        let drill = drill();

        let results = drill.search("LIGHT").unwrap();
        assert_eq!(
            results.iter().map(|v| v.verse).collect::<Vec<_>>(),
            vec![3, 4, 5]
        );

        assert_eq!(drill.search("%").unwrap(), vec![]);
        assert_eq!(drill.search("  _ ").unwrap(), vec![]);
        assert_eq!(drill.search("li%ght").unwrap().len(), 3);
        assert!(drill.search("zebra").unwrap().is_empty());
    }

    #[test]
    fn add_verse() {
        let drill = drill();
        drill
            .add_verse(NewVerse {
                translation_id: "kjv".to_string(),
                book_id: "GEN".to_string(),
                book_name: "Genesis".to_string(),
                chapter: 1,
                verse: 6,
                text: "And God said, Let there be a firmament in the midst of the waters."
                    .to_string(),
            })
            .unwrap();

        let passage = PassageAssembler::default()
            .resolve("Genesis 1:5-6", Some("kjv"), &drill, &drill)
            .unwrap();
        assert_eq!(passage.verses.len(), 2);
        assert!(passage.text.ends_with("midst of the waters."));
    }

    #[test]
    fn resolve() {
        let drill = drill();
        let assembler = PassageAssembler::default();

        let passage = assembler
            .resolve("約翰福音 3:16", Some("cuv"), &drill, &drill)
            .unwrap();
        assert_eq!(passage.verses[0].book_name, "約翰福音");
        assert_eq!(passage.translation_name, "Chinese Union Version");

        assert!(matches!(
            assembler.resolve("Genesis 99", Some("kjv"), &drill, &drill),
            Err(PassageError::PassageNotFound { .. })
        ));
        assert!(matches!(
            assembler.resolve("John 3:16", Some("xx"), &drill, &drill),
            Err(PassageError::TranslationNotFound { .. })
        ));
    }
}
