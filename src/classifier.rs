//! Maps a statement to the table it targets.
//!
//! Classification is pattern matching on the leading SQL verb, not parsing.
//! The patterns are unanchored: the first one found anywhere in the
//! statement, in the order of [`Verb::ALL`], decides the table.

use regex::bytes::Regex;

/// Table name for statements whose target cannot be determined.
pub const FALLBACK_TABLE: &str = "misc";

/// Quote characters stripped around a captured table name.
const QUOTES: &[u8] = b"`\"";

/// A name built from quoted segments and bare characters, so `"s"."t"` is
/// captured whole. Bare characters stop at whitespace, quotes and
/// punctuation.
const NAME: &str = r#"((?:[`"][^`"\s]+[`"]|[^`"'\s(),;])+)"#;

/// The statement kinds that name a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `CREATE TABLE [IF NOT EXISTS]`
    CreateTable,
    /// `INSERT INTO`
    InsertInto,
    /// `UPDATE`
    Update,
    /// `DELETE FROM`
    DeleteFrom,
    /// `ALTER TABLE`
    AlterTable,
    /// `DROP TABLE [IF EXISTS]`
    DropTable,
}

impl Verb {
    /// Every verb, in matching priority order.
    pub const ALL: [Verb; 6] = [
        Verb::CreateTable,
        Verb::InsertInto,
        Verb::Update,
        Verb::DeleteFrom,
        Verb::AlterTable,
        Verb::DropTable,
    ];

    fn prefix(self) -> &'static str {
        match self {
            Verb::CreateTable => r"CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?",
            Verb::InsertInto => r"INSERT\s+INTO\s+",
            Verb::Update => r"UPDATE\s+",
            Verb::DeleteFrom => r"DELETE\s+FROM\s+",
            Verb::AlterTable => r"ALTER\s+TABLE\s+",
            Verb::DropTable => r"DROP\s+TABLE\s+(?:IF\s+EXISTS\s+)?",
        }
    }

    fn pattern(self) -> String {
        // Case-insensitive, byte-oriented: dumps need not be valid UTF-8.
        format!("(?i-u){}{NAME}", self.prefix())
    }
}

/// Classifier holding the precompiled verb patterns.
#[derive(Debug, Clone)]
pub struct TableClassifier {
    patterns: Vec<(Verb, Regex)>,
}

impl Default for TableClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TableClassifier {
    /// Compiles the verb patterns.
    ///
    /// # Panics
    ///
    /// Panics if one of the built-in patterns fails to compile.
    #[must_use]
    pub fn new() -> Self {
        let patterns = Verb::ALL
            .into_iter()
            .map(|verb| {
                let regex = Regex::new(&verb.pattern())
                    .unwrap_or_else(|err| panic!("invalid pattern for {verb:?}: {err}"));
                (verb, regex)
            })
            .collect();
        Self { patterns }
    }

    /// Returns the matching verb and the raw captured name, quotes included.
    #[must_use]
    pub fn find<'s>(&self, statement: &'s [u8]) -> Option<(Verb, &'s [u8])> {
        self.patterns.iter().find_map(|(verb, regex)| {
            regex
                .captures(statement)
                .and_then(|caps| caps.get(1))
                .map(|name| (*verb, name.as_bytes()))
        })
    }

    /// Returns the lowercase table targeted by `statement`, or
    /// [`FALLBACK_TABLE`].
    #[must_use]
    pub fn classify(&self, statement: &[u8]) -> String {
        self.find(statement)
            .map(|(_, raw)| unquote(raw))
            .filter(|name| !name.is_empty())
            .map_or_else(
                || FALLBACK_TABLE.to_owned(),
                |name| String::from_utf8_lossy(&name).to_lowercase(),
            )
    }
}

/// Strips one layer of quote characters around each dot-separated segment
/// of `name`.
fn unquote(name: &[u8]) -> Vec<u8> {
    name.split(|&b| b == b'.')
        .map(unquote_segment)
        .collect::<Vec<_>>()
        .join(&b'.')
}

fn unquote_segment(segment: &[u8]) -> &[u8] {
    let segment = match segment.first() {
        Some(b) if QUOTES.contains(b) => &segment[1..],
        _ => segment,
    };
    match segment.last() {
        Some(b) if QUOTES.contains(b) => &segment[..segment.len() - 1],
        _ => segment,
    }
}
