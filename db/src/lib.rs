use diesel::prelude::*;
use diesel::r2d2;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

/// Type of a pooled SQLite connection manager.
pub type SqliteConnectionManager = r2d2::ConnectionManager<SqliteConnection>;

/// Type for a SQLite connection pool.
pub type SqliteConnectionPool = r2d2::Pool<SqliteConnectionManager>;

pub type DbConnection = SqliteConnection;

/// Migrations compiled into the binary from `db/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised by the storage layer.
#[derive(Clone, Error, Debug, PartialEq)]
pub enum DbError {
    #[error("There was a connection pool error. Root cause: {cause}.")]
    ConnectionPool { cause: String },

    #[error("There was a database error. Root cause: {cause:?}.")]
    Other { cause: String },

    #[error("There was a database migration error. Root cause: {cause:?}.")]
    Migration { cause: String },

    #[error("Could not seed the database. Root cause: {cause}.")]
    Seed { cause: String },
}

impl From<diesel::result::Error> for DbError {
    fn from(e: diesel::result::Error) -> Self {
        DbError::Other {
            cause: e.to_string(),
        }
    }
}

/// Errors raised while resolving a reference into a passage.
#[derive(Clone, Error, Debug, PartialEq)]
pub enum PassageError {
    #[error("'{reference}' is not a valid Bible reference.")]
    MalformedReference { reference: String },

    #[error("'{book}' was not found.")]
    BookNotFound { book: String },

    #[error("Translation '{translation}' was not found.")]
    TranslationNotFound { translation: String },

    #[error("'{reference}' was not found in translation '{translation}'.")]
    PassageNotFound {
        reference: String,
        translation: String,
    },

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Builds a SQLite connection pool with the given URL.
pub fn build_pool(db_url: &str, max_size: u32) -> Result<SqliteConnectionPool, DbError> {
    r2d2::Pool::builder()
        .max_size(max_size)
        .build(SqliteConnectionManager::new(db_url))
        .map_err(|e| DbError::ConnectionPool {
            cause: e.to_string(),
        })
}

/// Establishes a non-pooled SQLite connection.
pub fn establish_connection(db_url: &str) -> Result<SqliteConnection, DbError> {
    SqliteConnection::establish(db_url).map_err(|e| DbError::ConnectionPool {
        cause: format!("Error connecting to {db_url}: {e}"),
    })
}

/// Run any pending Diesel migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DbError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| DbError::Migration {
            cause: e.to_string(),
        })
}

pub mod canon;
pub mod memory;
pub mod models;
pub mod passage;
mod schema;
pub mod seed;
mod sword_drill;

pub use memory::BibleData;
pub use models::AliasTable;
pub use passage::{MetadataLookup, PassageAssembler, TextJoin, VerseLookup, VerseQuery};
pub use sword_drill::{SwordDrill, SwordDrillable, SEARCH_RESULT_LIMIT};
