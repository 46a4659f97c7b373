//! Error results that can be returned from the front-end.
//!
//! There are exactly two error kinds: [`ScanError`] for lexical violations
//! and [`ParseError`] for grammar violations. Both are fatal for the current
//! call; there is no recovery or resynchronization.

use mapxml_shared::byte_stream::Location;
use thiserror::Error;

use crate::scanner::token::{Token, TokenKind};

/// Errors raised while turning the character stream into tokens.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ScanError {
    /// A character that cannot appear at the current position.
    #[error("illegal symbol '{found}' at {location}, expected one of: {}", .expected.join(", "))]
    IllegalSymbol {
        found: char,
        expected: Vec<String>,
        location: Location,
    },

    /// The input ended while more characters were structurally required
    /// (unterminated string, comment, content or entity escape).
    #[error("unexpected end of stream at {location}")]
    UnexpectedEndOfStream { location: Location },

    /// The declaration named a character set that no known label resolves to.
    #[error("unsupported encoding '{name}' at {location}")]
    UnsupportedEncoding { name: String, location: Location },
}

/// Errors raised while enforcing the grammar over the token queue.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParseError {
    /// A token of the wrong kind where another was required.
    #[error("unexpected token {found} at {}, expected {}", .found.location, kind_list(.expected))]
    UnexpectedToken { expected: Vec<TokenKind>, found: Token },

    /// A token of the right kind but with the wrong content.
    #[error("unexpected token {found} at {}, expected {expected}", .found.location)]
    UnexpectedLexeme { expected: String, found: Token },

    /// The token queue ran dry while more tokens were structurally required.
    #[error("unexpected end of input, expected {}", kind_list(.expected))]
    UnexpectedEnd { expected: Vec<TokenKind> },

    /// A closing tag whose name does not match its opening tag.
    #[error("mismatched closing tag at {}: expected '{expected}', found '{}'", .found.location, .found.lexeme)]
    MismatchedClosingTag { expected: String, found: Token },

    /// The declaration named a version outside the supported set.
    #[error("unsupported version '{version}' at {location}")]
    UnsupportedVersion { version: String, location: Location },

    /// The document root was a self-closing element.
    #[error("self-closing root element '{name}', expected a normal element")]
    RootSelfClosing { name: String },

    /// An attribute key appeared twice in one tag (strict mode only).
    #[error("duplicate attribute '{name}' at {location}")]
    DuplicateAttribute { name: String, location: Location },
}

/// Umbrella error for the whole pipeline.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result that can be returned which holds either T or an Error
pub type Result<T> = std::result::Result<T, Error>;

fn kind_list(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" or ")
}
