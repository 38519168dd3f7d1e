use std::fmt;
use std::ops::RangeInclusive;

use serde_derive::{Deserialize, Serialize};

use crate::models::alias::normalize;
use crate::models::AliasTable;
use crate::PassageError;

/// A reference resolved to a canonical book code, used to look up a
/// passage in the store.
///
/// `start_verse == 0` (with `end_verse == 0`) selects the whole chapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReference {
    pub book_id: String,
    pub chapter: i32,
    pub start_verse: i32,
    pub end_verse: i32,
}

impl ParsedReference {
    /// Parses a human reference such as `John 3:16`, `Genesis 1` or
    /// `創世紀 1:1-9`.
    ///
    /// Everything but the last whitespace separated token names the book;
    /// the last token is `chapter`, `chapter:verse` or `chapter:start-end`.
    /// When the book part is not a known alias, the first alias (longest
    /// first) found anywhere in the input is used instead.
    pub fn parse(raw: &str, aliases: &AliasTable) -> Result<Self, PassageError> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let (locator, book) = match tokens.split_last() {
            Some((locator, book)) if !book.is_empty() => (*locator, book.join(" ")),
            _ => return Err(malformed(raw)),
        };

        let book_id = aliases
            .get(&book)
            .or_else(|| aliases.find_within(raw))
            .ok_or_else(|| PassageError::BookNotFound {
                book: normalize(&book),
            })?
            .to_string();

        let (chapter, start_verse, end_verse) = match locator.split_once(':') {
            // Chapter only
            None => (parse_num(locator, raw)?, 0, 0),
            Some((chapter, verses)) => {
                let chapter = parse_num(chapter, raw)?;
                match verses.split_once('-') {
                    // Chapter and one verse
                    None => {
                        let verse = parse_num(verses, raw)?;
                        (chapter, verse, verse)
                    }
                    // Chapter with a verse range
                    Some((start, end)) => {
                        let start = parse_num(start, raw)?;
                        let end = parse_num(end, raw)?;
                        if start > end {
                            return Err(malformed(raw));
                        }
                        (chapter, start, end)
                    }
                }
            }
        };

        Ok(Self {
            book_id,
            chapter,
            start_verse,
            end_verse,
        })
    }

    /// Whether the reference covers the entire chapter.
    pub fn is_whole_chapter(&self) -> bool {
        self.start_verse == 0
    }

    /// The inclusive verse range, or `None` for a whole chapter.
    pub fn verse_range(&self) -> Option<RangeInclusive<i32>> {
        if self.is_whole_chapter() {
            None
        } else {
            Some(self.start_verse..=self.end_verse)
        }
    }
}

impl fmt::Display for ParsedReference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.verse_range() {
            None => write!(f, "{} {}", self.book_id, self.chapter),
            Some(verses) if verses.start() == verses.end() => {
                write!(f, "{} {}:{}", self.book_id, self.chapter, verses.start())
            }
            Some(verses) => write!(
                f,
                "{} {}:{}-{}",
                self.book_id,
                self.chapter,
                verses.start(),
                verses.end()
            ),
        }
    }
}

/// Parse a chapter or verse number; zero, signs and non-digits are rejected.
fn parse_num(s: &str, raw: &str) -> Result<i32, PassageError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(raw));
    }
    match s.parse() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(malformed(raw)),
    }
}

/// Create a malformed reference error from the input.
fn malformed(raw: &str) -> PassageError {
    PassageError::MalformedReference {
        reference: raw.to_string(),
    }
}
