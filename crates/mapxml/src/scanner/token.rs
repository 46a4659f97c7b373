use std::fmt;

use mapxml_shared::byte_stream::Location;
use phf::phf_map;

/// The different token kinds that can be emitted by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<`
    Langel,
    /// `>`
    Rangel,
    /// `=`
    Equals,
    /// `/`
    Slash,
    /// `?`
    Qmark,
    /// `!`
    Exmark,
    /// A name: starts with a letter, `_` or `$`, continues with letters,
    /// digits, `_` or `$`.
    Identifier,
    /// A string wrapped in `"` or `'`; the delimiter is not recorded.
    StringLit,
    /// Text between a tag's closing `>` and the next structural `<`.
    Content,
}

impl TokenKind {
    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Langel => "'<'",
            TokenKind::Rangel => "'>'",
            TokenKind::Equals => "'='",
            TokenKind::Slash => "'/'",
            TokenKind::Qmark => "'?'",
            TokenKind::Exmark => "'!'",
            TokenKind::Identifier => "identifier",
            TokenKind::StringLit => "string literal",
            TokenKind::Content => "content",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Fixed, process-wide keyword table, consulted after every identifier scan.
/// Reserved for future keyword tokens; no entries exist in the current
/// grammar, so identifiers are never reclassified today.
pub(crate) static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {};

/// A single scanned unit: its kind, its literal (entity-decoded) source text
/// and the position of its first character.
#[derive(Clone, Debug, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: Location) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
        }
    }
}

/// Tokens compare structurally by kind and lexeme; the source location is
/// ignored so expected token sequences can be written without positions.
impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.lexeme == other.lexeme
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}
