//! Grammar enforcement: consumes the token queue produced by the scanner and
//! builds the document tree.
//!
//! ```text
//! document    := declaration? doctype? element
//! declaration := '<' '?' 'xml' attrpair* '?' '>'
//! doctype     := '<' '!' 'DOCTYPE' <opaque tokens> '>'
//! element     := '<' IDENT attrpair* ( '/' '>' | '>' value* '<' '/' IDENT '>' )
//! attrpair    := IDENT '=' STRINGLIT
//! value       := CONTENT | element
//! ```
//!
//! The queue is walked with an index cursor and one token of lookahead (for
//! the `</` closing sequence). The first grammar violation aborts the parse;
//! no partial tree is returned.

use std::collections::HashMap;

use log::warn;

use crate::document::{Document, XmlVersion};
use crate::errors::{Error, ParseError, ScanError};
use crate::node::{Element, SelfClosingElement, Tag, Value};
use crate::scanner::token::{Token, TokenKind};

/// Grammar strictness knobs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Reject duplicate attribute keys instead of letting the last one win.
    pub deny_duplicate_attributes: bool,
}

/// Recursive-descent parser over a scanned token queue.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    options: ParserOptions,
}

impl Parser {
    /// Creates a parser with default options.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_options(tokens, ParserOptions::default())
    }

    pub fn with_options(tokens: Vec<Token>, options: ParserOptions) -> Self {
        Self {
            tokens,
            pos: 0,
            options,
        }
    }

    /// Parses the token queue and produces the document.
    pub fn parse(mut self) -> Result<Document, Error> {
        self.expect(TokenKind::Langel)?;

        let mut version = None;
        let mut encoding = None;
        if self.eat(TokenKind::Qmark) {
            self.expect_lexeme(TokenKind::Identifier, "xml", false)?;

            // `version` and `encoding` may come in either order and may
            // repeat; a repeat overwrites the earlier value.
            loop {
                let mut any_parsed = false;
                if self.eat_lexeme(TokenKind::Identifier, "version", false) {
                    self.expect(TokenKind::Equals)?;
                    let value = self.expect(TokenKind::StringLit)?;
                    version = Some(XmlVersion::from_version(&value.lexeme).ok_or_else(|| {
                        ParseError::UnsupportedVersion {
                            version: value.lexeme.clone(),
                            location: value.location,
                        }
                    })?);
                    any_parsed = true;
                }
                if self.eat_lexeme(TokenKind::Identifier, "encoding", false) {
                    self.expect(TokenKind::Equals)?;
                    let value = self.expect(TokenKind::StringLit)?;
                    encoding =
                        Some(
                            encoding_rs::Encoding::for_label(value.lexeme.as_bytes()).ok_or_else(
                                || ScanError::UnsupportedEncoding {
                                    name: value.lexeme.clone(),
                                    location: value.location,
                                },
                            )?,
                        );
                    any_parsed = true;
                }
                if !any_parsed {
                    break;
                }
            }
            self.expect(TokenKind::Qmark)?;
            self.expect(TokenKind::Rangel)?;

            self.expect(TokenKind::Langel)?;
        }

        let mut doctype = None;
        if self.eat(TokenKind::Exmark) {
            self.expect_lexeme(TokenKind::Identifier, "DOCTYPE", false)?;

            // The doctype interior is captured opaquely as a diagnostic
            // string, not structurally parsed.
            let mut raw = String::from("DOCTYPE");
            while !self.is(TokenKind::Rangel) {
                let token = self.bump().ok_or(ParseError::UnexpectedEnd {
                    expected: vec![TokenKind::Rangel],
                })?;
                raw.push(' ');
                raw.push_str(&token.lexeme);
            }
            self.expect(TokenKind::Rangel)?;
            doctype = Some(raw);

            self.expect(TokenKind::Langel)?;
        }

        match self.parse_tag()? {
            Tag::Element(root) => Ok(Document {
                version,
                encoding,
                doctype,
                root,
            }),
            Tag::SelfClosing(tag) => Err(ParseError::RootSelfClosing { name: tag.name }.into()),
        }
    }

    /// Parses a tag whose opening `<` has already been consumed.
    fn parse_tag(&mut self) -> Result<Tag, ParseError> {
        let name = self.expect(TokenKind::Identifier)?;

        let mut attributes = HashMap::new();
        while self.is(TokenKind::Identifier) {
            let key = self.expect(TokenKind::Identifier)?;
            self.expect(TokenKind::Equals)?;
            let value = self.expect(TokenKind::StringLit)?;

            if attributes.insert(key.lexeme.clone(), value.lexeme).is_some() {
                if self.options.deny_duplicate_attributes {
                    return Err(ParseError::DuplicateAttribute {
                        name: key.lexeme,
                        location: key.location,
                    });
                }
                warn!(
                    "duplicate attribute '{}' at {} overwrites an earlier value",
                    key.lexeme, key.location
                );
            }
        }

        if self.eat(TokenKind::Slash) {
            self.expect(TokenKind::Rangel)?;
            return Ok(Tag::SelfClosing(SelfClosingElement {
                name: name.lexeme,
                attributes,
            }));
        }

        self.expect(TokenKind::Rangel)?;
        let mut children = Vec::new();
        while !(self.is(TokenKind::Langel) && self.peek_is(TokenKind::Slash)) {
            children.push(self.parse_value()?);
        }
        self.expect(TokenKind::Langel)?;
        self.expect(TokenKind::Slash)?;
        let closing = self.expect(TokenKind::Identifier)?;
        if closing.lexeme != name.lexeme {
            return Err(ParseError::MismatchedClosingTag {
                expected: name.lexeme,
                found: closing,
            });
        }
        self.expect(TokenKind::Rangel)?;

        Ok(Tag::Element(Element {
            name: name.lexeme,
            attributes,
            children,
        }))
    }

    /// Parses one element child: text content or a nested tag.
    fn parse_value(&mut self) -> Result<Value, ParseError> {
        if self.is(TokenKind::Content) {
            let token = self.expect(TokenKind::Content)?;
            return Ok(Value::Text(token.lexeme));
        }
        if self.eat(TokenKind::Langel) {
            return Ok(Value::Element(self.parse_tag()?));
        }
        Err(self.unexpected(vec![TokenKind::Content, TokenKind::Langel]))
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn is(&self, kind: TokenKind) -> bool {
        self.current().is_some_and(|token| token.kind == kind)
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.tokens
            .get(self.pos + 1)
            .is_some_and(|token| token.kind == kind)
    }

    /// Consumes and returns the current token, if any.
    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consumes the current token when the predicate matches it.
    fn bump_if(&mut self, pred: impl Fn(&Token) -> bool) -> Option<Token> {
        let token = self.tokens.get(self.pos)?;
        if pred(token) {
            self.bump()
        } else {
            None
        }
    }

    /// Consumes a token of the given kind, or fails naming it.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.bump_if(|token| token.kind == kind)
            .ok_or_else(|| self.unexpected(vec![kind]))
    }

    /// Consumes a token of the given kind and content, or fails naming both.
    fn expect_lexeme(
        &mut self,
        kind: TokenKind,
        lexeme: &str,
        case_sensitive: bool,
    ) -> Result<Token, ParseError> {
        self.bump_if(|token| {
            token.kind == kind && lexeme_matches(&token.lexeme, lexeme, case_sensitive)
        })
        .ok_or_else(|| match self.current() {
            Some(found) => ParseError::UnexpectedLexeme {
                expected: format!("{kind} '{lexeme}'"),
                found: found.clone(),
            },
            None => ParseError::UnexpectedEnd {
                expected: vec![kind],
            },
        })
    }

    /// Consumes a token of the given kind when present.
    fn eat(&mut self, kind: TokenKind) -> bool {
        self.bump_if(|token| token.kind == kind).is_some()
    }

    /// Consumes a token of the given kind and content when present.
    fn eat_lexeme(&mut self, kind: TokenKind, lexeme: &str, case_sensitive: bool) -> bool {
        self.bump_if(|token| {
            token.kind == kind && lexeme_matches(&token.lexeme, lexeme, case_sensitive)
        })
        .is_some()
    }

    fn unexpected(&self, expected: Vec<TokenKind>) -> ParseError {
        match self.current() {
            Some(found) => ParseError::UnexpectedToken {
                expected,
                found: found.clone(),
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }
}

fn lexeme_matches(actual: &str, wanted: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        actual == wanted
    } else {
        actual.eq_ignore_ascii_case(wanted)
    }
}
