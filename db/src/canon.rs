//! The canonical book list: USFM book code, English name and number of
//! chapters, in canonical order.

/// Code of the non-canonical Book of Jachanan Ben Kathryn.
pub const BEN: &str = "BEN";

/// Display name of the Book of Jachanan Ben Kathryn.
pub const BEN_NAME: &str = "The Book of Jachanan Ben Kathryn";

/// Number of chapters in the Book of Jachanan Ben Kathryn.
pub const BEN_CHAPTERS: i32 = 73;

pub const BOOKS: [(&str, &str, i32); 66] = [
    ("GEN", "Genesis", 50),
    ("EXO", "Exodus", 40),
    ("LEV", "Leviticus", 27),
    ("NUM", "Numbers", 36),
    ("DEU", "Deuteronomy", 34),
    ("JOS", "Joshua", 24),
    ("JDG", "Judges", 21),
    ("RUT", "Ruth", 4),
    ("1SA", "1 Samuel", 31),
    ("2SA", "2 Samuel", 24),
    ("1KI", "1 Kings", 22),
    ("2KI", "2 Kings", 25),
    ("1CH", "1 Chronicles", 29),
    ("2CH", "2 Chronicles", 36),
    ("EZR", "Ezra", 10),
    ("NEH", "Nehemiah", 13),
    ("EST", "Esther", 10),
    ("JOB", "Job", 42),
    ("PSA", "Psalms", 150),
    ("PRO", "Proverbs", 31),
    ("ECC", "Ecclesiastes", 12),
    ("SNG", "Song of Solomon", 8),
    ("ISA", "Isaiah", 66),
    ("JER", "Jeremiah", 52),
    ("LAM", "Lamentations", 5),
    ("EZK", "Ezekiel", 48),
    ("DAN", "Daniel", 12),
    ("HOS", "Hosea", 14),
    ("JOL", "Joel", 3),
    ("AMO", "Amos", 9),
    ("OBA", "Obadiah", 1),
    ("JON", "Jonah", 4),
    ("MIC", "Micah", 7),
    ("NAM", "Nahum", 3),
    ("HAB", "Habakkuk", 3),
    ("ZEP", "Zephaniah", 3),
    ("HAG", "Haggai", 2),
    ("ZEC", "Zechariah", 14),
    ("MAL", "Malachi", 4),
    ("MAT", "Matthew", 28),
    ("MRK", "Mark", 16),
    ("LUK", "Luke", 24),
    ("JHN", "John", 21),
    ("ACT", "Acts", 28),
    ("ROM", "Romans", 16),
    ("1CO", "1 Corinthians", 16),
    ("2CO", "2 Corinthians", 13),
    ("GAL", "Galatians", 6),
    ("EPH", "Ephesians", 6),
    ("PHP", "Philippians", 4),
    ("COL", "Colossians", 4),
    ("1TH", "1 Thessalonians", 5),
    ("2TH", "2 Thessalonians", 3),
    ("1TI", "1 Timothy", 6),
    ("2TI", "2 Timothy", 4),
    ("TIT", "Titus", 3),
    ("PHM", "Philemon", 1),
    ("HEB", "Hebrews", 13),
    ("JAS", "James", 5),
    ("1PE", "1 Peter", 5),
    ("2PE", "2 Peter", 3),
    ("1JN", "1 John", 5),
    ("2JN", "2 John", 1),
    ("3JN", "3 John", 1),
    ("JUD", "Jude", 1),
    ("REV", "Revelation", 22),
];

/// Extra spellings recognised on top of the English names and book codes.
pub const EXTRA_ALIASES: [(&str, &str); 9] = [
    ("創世記", "GEN"),
    ("創世紀", "GEN"),
    ("馬太福音", "MAT"),
    ("約翰福音", "JHN"),
    ("psalm", "PSA"),
    ("song of songs", "SNG"),
    ("revelations", "REV"),
    ("the book of jachanan ben kathryn", BEN),
    ("book of ben", BEN),
];

/// Short spellings only accepted as an exact book name, never matched
/// inside a longer string.
pub const SHORT_ALIASES: [(&str, &str); 1] = [("ben", BEN)];
