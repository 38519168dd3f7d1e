//! Assembly of verse rows into a passage.
//!
//! [PassageAssembler] turns a [ParsedReference] and a translation id into a
//! [Passage], reading verses and translation metadata through the
//! [VerseLookup] and [MetadataLookup] capabilities.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use log::debug;
use serde_derive::{Deserialize, Serialize};

use crate::models::{AliasTable, ParsedReference, Translation, Verse};
use crate::{DbError, PassageError};

/// Translation used when a request does not name one.
pub const DEFAULT_TRANSLATION: &str = "en";

/// Filter for a verse lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerseQuery {
    pub translation_id: String,
    pub book_id: String,
    pub chapter: i32,
    /// Inclusive verse range; `None` selects the whole chapter.
    pub verses: Option<RangeInclusive<i32>>,
}

impl VerseQuery {
    /// Whether a verse row satisfies this filter.
    pub fn matches(&self, verse: &Verse) -> bool {
        verse.translation_id == self.translation_id
            && verse.book_id == self.book_id
            && verse.chapter == self.chapter
            && self
                .verses
                .as_ref()
                .map_or(true, |range| range.contains(&verse.verse))
    }
}

/// Capability to fetch verse rows. Rows may come back in any order.
pub trait VerseLookup {
    fn find(&self, query: &VerseQuery) -> Result<Vec<Verse>, DbError>;
}

/// Capability to read translation metadata.
pub trait MetadataLookup {
    fn translation(&self, id: &str) -> Result<Option<Translation>, DbError>;
}

/// How verse texts are joined into the passage reading text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextJoin {
    /// Verses separated by a single space.
    #[default]
    Space,
    /// Verses concatenated without a separator.
    Concat,
}

impl TextJoin {
    pub fn separator(self) -> &'static str {
        match self {
            TextJoin::Space => " ",
            TextJoin::Concat => "",
        }
    }

    pub fn join(self, verses: &[Verse]) -> String {
        verses
            .iter()
            .map(|v| v.text.as_str())
            .collect::<Vec<_>>()
            .join(self.separator())
    }
}

impl FromStr for TextJoin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "space" => Ok(TextJoin::Space),
            "none" | "concat" => Ok(TextJoin::Concat),
            other => Err(format!(
                "unknown text join '{other}', expected 'space' or 'none'"
            )),
        }
    }
}

impl fmt::Display for TextJoin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TextJoin::Space => write!(f, "space"),
            TextJoin::Concat => write!(f, "none"),
        }
    }
}

/// An assembled passage: ordered verses plus the joined reading text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub reference: String,
    pub verses: Vec<Verse>,
    pub text: String,
    pub translation_id: String,
    pub translation_name: String,
    pub translation_note: String,
}

/// Resolves references into passages.
#[derive(Clone, Debug)]
pub struct PassageAssembler {
    aliases: AliasTable,
    default_translation: String,
    join: TextJoin,
}

impl Default for PassageAssembler {
    fn default() -> Self {
        Self::new(AliasTable::default(), DEFAULT_TRANSLATION, TextJoin::default())
    }
}

impl PassageAssembler {
    pub fn new(aliases: AliasTable, default_translation: &str, join: TextJoin) -> Self {
        Self {
            aliases,
            default_translation: default_translation.to_string(),
            join,
        }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn default_translation(&self) -> &str {
        &self.default_translation
    }

    pub fn join(&self) -> TextJoin {
        self.join
    }

    /// Parses a raw reference with this assembler's alias table.
    pub fn parse(&self, raw: &str) -> Result<ParsedReference, PassageError> {
        ParsedReference::parse(raw, &self.aliases)
    }

    /// Parses `raw` and assembles the passage it names.
    pub fn resolve<L, M>(
        &self,
        raw: &str,
        translation_id: Option<&str>,
        lookup: &L,
        meta: &M,
    ) -> Result<Passage, PassageError>
    where
        L: VerseLookup + ?Sized,
        M: MetadataLookup + ?Sized,
    {
        let reference = self.parse(raw)?;
        self.assemble(raw, &reference, translation_id.unwrap_or(""), lookup, meta)
    }

    /// Fetches the verses of `reference` in a translation and folds them
    /// into a [Passage].
    ///
    /// An empty `translation_id` selects the default translation. The
    /// translation must exist even when verses would be found.
    pub fn assemble<L, M>(
        &self,
        raw: &str,
        reference: &ParsedReference,
        translation_id: &str,
        lookup: &L,
        meta: &M,
    ) -> Result<Passage, PassageError>
    where
        L: VerseLookup + ?Sized,
        M: MetadataLookup + ?Sized,
    {
        let translation_id = match translation_id.trim() {
            "" => self.default_translation.as_str(),
            id => id,
        };

        let translation = meta.translation(translation_id)?.ok_or_else(|| {
            PassageError::TranslationNotFound {
                translation: translation_id.to_string(),
            }
        })?;

        let query = VerseQuery {
            translation_id: translation.id.clone(),
            book_id: reference.book_id.clone(),
            chapter: reference.chapter,
            verses: reference.verse_range(),
        };
        debug!("Looking up {} in '{}'", reference, translation.id);

        let mut verses = lookup.find(&query)?;
        if verses.is_empty() {
            return Err(PassageError::PassageNotFound {
                reference: raw.to_string(),
                translation: translation.id,
            });
        }
        verses.sort_by_key(|v| v.verse);

        Ok(Passage {
            reference: raw.to_string(),
            text: self.join.join(&verses),
            verses,
            translation_id: translation.id,
            translation_name: translation.name,
            translation_note: translation.note,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct Fixture {
        verses: Vec<Verse>,
        translations: Vec<Translation>,
        queries: RefCell<Vec<VerseQuery>>,
    }

    impl VerseLookup for Fixture {
        fn find(&self, query: &VerseQuery) -> Result<Vec<Verse>, DbError> {
            self.queries.borrow_mut().push(query.clone());
            Ok(self
                .verses
                .iter()
                .filter(|v| query.matches(v))
                .cloned()
                .collect())
        }
    }

    impl MetadataLookup for Fixture {
        fn translation(&self, id: &str) -> Result<Option<Translation>, DbError> {
            Ok(self.translations.iter().find(|t| t.id == id).cloned())
        }
    }

    struct Broken;

    impl VerseLookup for Broken {
        fn find(&self, _: &VerseQuery) -> Result<Vec<Verse>, DbError> {
            Err(DbError::Other {
                cause: "disk on fire".to_string(),
            })
        }
    }

    fn verse(translation: &str, book: &str, chapter: i32, verse: i32, text: &str) -> Verse {
        Verse {
            id: verse,
            translation_id: translation.to_string(),
            book_id: book.to_string(),
            book_name: "Genesis".to_string(),
            chapter,
            verse,
            text: text.to_string(),
        }
    }

    /// Genesis 1:1-5 stored out of order.
    fn fixture() -> Fixture {
        Fixture {
            verses: vec![
                verse("en", "GEN", 1, 3, "three"),
                verse("en", "GEN", 1, 1, "one"),
                verse("en", "GEN", 1, 5, "five"),
                verse("en", "GEN", 1, 2, "two"),
                verse("en", "GEN", 1, 4, "four"),
                verse("kjv", "GEN", 1, 1, "In the beginning"),
                verse("en", "GEN", 2, 1, "chapter two"),
            ],
            translations: vec![
                Translation {
                    id: "en".to_string(),
                    name: "English Version".to_string(),
                    note: "Public Domain".to_string(),
                },
                Translation {
                    id: "kjv".to_string(),
                    name: "King James Version".to_string(),
                    note: "Public Domain".to_string(),
                },
            ],
            queries: RefCell::new(vec![]),
        }
    }

    fn resolve(raw: &str, translation: Option<&str>) -> Result<Passage, PassageError> {
        let store = fixture();
        PassageAssembler::default().resolve(raw, translation, &store, &store)
    }

    fn verse_numbers(passage: &Passage) -> Vec<i32> {
        passage.verses.iter().map(|v| v.verse).collect()
    }

    #[test]
    fn whole_chapter_sorted() {
        let passage = resolve("Genesis 1", None).unwrap();
        assert_eq!(verse_numbers(&passage), vec![1, 2, 3, 4, 5]);
        assert_eq!(passage.text, "one two three four five");
        assert_eq!(passage.reference, "Genesis 1");
        assert_eq!(passage.translation_id, "en");
        assert_eq!(passage.translation_name, "English Version");
        assert_eq!(passage.translation_note, "Public Domain");
    }

    #[test]
    fn query_filters() {
        let store = fixture();
        let assembler = PassageAssembler::default();

        assembler.resolve("Genesis 1", None, &store, &store).unwrap();
        assembler.resolve("Genesis 1:3", None, &store, &store).unwrap();
        assembler
            .resolve("Genesis 1:2-4", Some("en"), &store, &store)
            .unwrap();

        let ranges: Vec<_> = store
            .queries
            .borrow()
            .iter()
            .map(|q| q.verses.clone())
            .collect();
        assert_eq!(ranges, vec![None, Some(3..=3), Some(2..=4)]);
    }

    #[test]
    fn verse_range_inclusive() {
        let passage = resolve("Genesis 1:2-4", None).unwrap();
        assert_eq!(verse_numbers(&passage), vec![2, 3, 4]);
        assert_eq!(passage.text, "two three four");
    }

    #[test]
    fn single_verse() {
        let passage = resolve("Genesis 1:5", None).unwrap();
        assert_eq!(verse_numbers(&passage), vec![5]);
    }

    #[test]
    fn explicit_translation() {
        let passage = resolve("Genesis 1", Some("kjv")).unwrap();
        assert_eq!(passage.text, "In the beginning");
        assert_eq!(passage.translation_name, "King James Version");
    }

    #[test]
    fn empty_translation_uses_default() {
        let passage = resolve("Genesis 1:1", Some("")).unwrap();
        assert_eq!(passage.translation_id, DEFAULT_TRANSLATION);
    }

    #[test]
    fn configured_default_translation() {
        let store = fixture();
        let assembler = PassageAssembler::new(AliasTable::default(), "kjv", TextJoin::Space);
        let passage = assembler.resolve("Genesis 1", None, &store, &store).unwrap();
        assert_eq!(passage.translation_id, "kjv");
    }

    #[test]
    fn translation_not_found() {
        assert_eq!(
            resolve("Genesis 1", Some("xx")),
            Err(PassageError::TranslationNotFound {
                translation: "xx".to_string()
            })
        );
    }

    #[test]
    fn translation_checked_before_verses() {
        let store = fixture();
        let result = PassageAssembler::default().resolve("Genesis 1", Some("xx"), &Broken, &store);
        assert!(matches!(
            result,
            Err(PassageError::TranslationNotFound { .. })
        ));
    }

    #[test]
    fn passage_not_found() {
        assert_eq!(
            resolve("Genesis 99", Some("en")),
            Err(PassageError::PassageNotFound {
                reference: "Genesis 99".to_string(),
                translation: "en".to_string()
            })
        );
        assert!(matches!(
            resolve("Genesis 2", Some("kjv")),
            Err(PassageError::PassageNotFound { .. })
        ));
    }

    #[test]
    fn parse_errors_propagate() {
        assert!(matches!(
            resolve("Genesis", None),
            Err(PassageError::MalformedReference { .. })
        ));
        assert!(matches!(
            resolve("Nonexistentbook 1:1", None),
            Err(PassageError::BookNotFound { .. })
        ));
    }

    #[test]
    fn store_errors_propagate() {
        let store = fixture();
        let result = PassageAssembler::default().resolve("Genesis 1", None, &Broken, &store);
        assert_eq!(
            result,
            Err(PassageError::Store(DbError::Other {
                cause: "disk on fire".to_string()
            }))
        );
    }

    #[test]
    fn concat_join() {
        let store = fixture();
        let assembler = PassageAssembler::new(AliasTable::default(), "en", TextJoin::Concat);
        let passage = assembler.resolve("Genesis 1:1-2", None, &store, &store).unwrap();
        assert_eq!(passage.text, "onetwo");
    }

    #[test]
    fn idempotent() {
        let first = serde_json::to_string(&resolve("Genesis 1", None).unwrap()).unwrap();
        let second = serde_json::to_string(&resolve("Genesis 1", None).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn json_shape() {
        let passage = resolve("Genesis 1:1", None).unwrap();
        let json = serde_json::to_value(&passage).unwrap();
        assert_eq!(json["reference"], "Genesis 1:1");
        assert_eq!(json["text"], "one");
        assert_eq!(json["translation_id"], "en");
        assert_eq!(json["verses"][0]["book_id"], "GEN");
        assert_eq!(json["verses"][0]["book_name"], "Genesis");
        assert_eq!(json["verses"][0]["chapter"], 1);
        assert_eq!(json["verses"][0]["verse"], 1);
        assert!(json["verses"][0].get("id").is_none());
        assert!(json["verses"][0].get("translation_id").is_none());
    }

    #[test]
    fn text_join_from_str() {
        assert_eq!("space".parse::<TextJoin>(), Ok(TextJoin::Space));
        assert_eq!("NONE".parse::<TextJoin>(), Ok(TextJoin::Concat));
        assert_eq!("concat".parse::<TextJoin>(), Ok(TextJoin::Concat));
        assert!("comma".parse::<TextJoin>().is_err());
    }
}
