//! Lexical analysis: turns the character stream into the token queue the
//! parser consumes.
//!
//! The scanner runs in two modes. Between tags it produces structural tokens
//! (`<`, `>`, `=`, `/`, `?`, `!`, identifiers, string literals); after a `>`
//! it is armed to scan raw text content, unless a tag or comment starts
//! first. Comments are elided wherever they appear and never reach the token
//! queue. The only lookahead is the two characters needed to tell `<!--`
//! apart from a tag start.

use mapxml_shared::byte_stream::Character::{Ch, StreamEnd};
use mapxml_shared::byte_stream::{ByteStream, Location, LocationHandler, Stream};

pub mod token;

mod entity;

use crate::errors::ScanError;
use crate::scanner::token::{Token, TokenKind, KEYWORDS};

/// The scanner produces the stream of [`Token`]s that the parser builds the
/// document tree from.
pub struct Scanner<'stream> {
    /// Character input stream
    stream: &'stream mut ByteStream,
    /// Line/column bookkeeping for the consumed characters
    location_handler: LocationHandler,
    /// Characters consumed for the token currently in the making
    consumed: String,
}

impl<'stream> Scanner<'stream> {
    /// Creates a new scanner over the given stream. The stream is borrowed
    /// for the duration of the scan and never closed here.
    pub fn new(stream: &'stream mut ByteStream) -> Self {
        Self {
            stream,
            location_handler: LocationHandler::new(),
            consumed: String::new(),
        }
    }

    /// Scans the whole stream into a token queue. The first lexical error
    /// aborts the scan; no partial queue is returned.
    pub fn scan(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();

        // Set by a `>`: the next lexical unit is raw text content, unless a
        // tag or comment starts first.
        let mut content_armed = false;

        loop {
            let c = match self.stream.read() {
                Ch(c) => c,
                StreamEnd => break,
            };

            if c.is_whitespace() {
                self.advance();
                continue;
            }

            let location = self.location();
            self.consumed.clear();

            if c == '<' {
                if self.comment_ahead() {
                    // Elided comments are invisible to the mode switch.
                    self.scan_comment()?;
                } else {
                    self.advance();
                    tokens.push(Token::new(TokenKind::Langel, "<", location));
                    content_armed = false;
                }
            } else if content_armed {
                content_armed = false;
                self.scan_content()?;
                tokens.push(Token::new(TokenKind::Content, self.consumed.trim(), location));
            } else {
                let kind = self.scan_token()?;
                tokens.push(Token::new(kind, self.consumed.as_str(), location));
                content_armed = kind == TokenKind::Rangel;
            }
        }

        Ok(tokens)
    }

    /// Scans a single structural token at the current position.
    fn scan_token(&mut self) -> Result<TokenKind, ScanError> {
        let location = self.location();
        match self.stream.read() {
            Ch(c) if c == '"' || c == '\'' => {
                self.scan_string(c)?;
                Ok(TokenKind::StringLit)
            }
            Ch(c) if is_identifier_start(c) => self.scan_identifier(),
            Ch(c) => {
                self.advance();
                let kind = match c {
                    '>' => TokenKind::Rangel,
                    '=' => TokenKind::Equals,
                    '/' => TokenKind::Slash,
                    '?' => TokenKind::Qmark,
                    '!' => TokenKind::Exmark,
                    _ => {
                        return Err(ScanError::IllegalSymbol {
                            found: c,
                            expected: ["\"", "identifier", ">", "=", "/", "?", "!"]
                                .iter()
                                .map(ToString::to_string)
                                .collect(),
                            location,
                        })
                    }
                };
                self.consumed.push(c);
                Ok(kind)
            }
            StreamEnd => Err(self.unexpected_end()),
        }
    }

    /// Scans a string literal. The delimiter (either `"` or `'`) closes the
    /// string and is not recorded.
    fn scan_string(&mut self, delimiter: char) -> Result<(), ScanError> {
        self.advance();
        loop {
            match self.stream.read() {
                Ch(c) if c == delimiter => {
                    self.advance();
                    return Ok(());
                }
                Ch(_) => {
                    if !self.scan_entity()? {
                        self.take();
                    }
                }
                StreamEnd => return Err(self.unexpected_end()),
            }
        }
    }

    /// Scans an identifier, then consults the keyword table for a possible
    /// reclassification.
    fn scan_identifier(&mut self) -> Result<TokenKind, ScanError> {
        self.take();
        loop {
            match self.stream.read() {
                Ch('&') => {
                    self.scan_entity()?;
                }
                Ch(c) if is_identifier_part(c) => self.take(),
                _ => break,
            }
        }

        Ok(KEYWORDS
            .get(self.consumed.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier))
    }

    /// Scans text content up to the next `<` that does not open a comment.
    /// Comments inside content are elided; the text on both sides joins
    /// directly, with the whitespace around the comment dropped.
    fn scan_content(&mut self) -> Result<(), ScanError> {
        loop {
            match self.stream.read() {
                Ch('<') => {
                    if !self.comment_ahead() {
                        return Ok(());
                    }
                    self.scan_comment()?;
                    self.consumed = self.consumed.trim().to_string();
                    self.skip_whitespace();
                }
                Ch(_) => {
                    if !self.scan_entity()? {
                        self.take();
                    }
                }
                StreamEnd => return Err(self.unexpected_end()),
            }
        }
    }

    /// True when the characters after the current `<` begin a comment. Pure
    /// lookahead; the stream is not advanced.
    fn comment_ahead(&self) -> bool {
        self.stream.look_ahead(1) == Ch('!') && self.stream.look_ahead(2) == Ch('-')
    }

    /// Consumes a `<!--...-->` comment entirely. The `<!-` prefix has been
    /// confirmed by [`Self::comment_ahead`]; the fourth character must be the
    /// second `-` of the opening, and the body runs until `--` followed by a
    /// mandatory `>`.
    fn scan_comment(&mut self) -> Result<(), ScanError> {
        self.advance(); // <
        self.advance(); // !
        self.advance(); // -
        match self.stream.read() {
            Ch('-') => self.advance(),
            Ch(found) => return Err(self.illegal_symbol(found, &["-"])),
            StreamEnd => return Err(self.unexpected_end()),
        }

        loop {
            if self.next_comment_char()? != '-' {
                continue;
            }
            if self.next_comment_char()? != '-' {
                continue;
            }
            let location = self.location();
            return match self.next_comment_char()? {
                '>' => Ok(()),
                found => Err(ScanError::IllegalSymbol {
                    found,
                    expected: vec![">".to_string()],
                    location,
                }),
            };
        }
    }

    /// Consumes and returns the next comment character, failing when the
    /// comment is unterminated.
    fn next_comment_char(&mut self) -> Result<char, ScanError> {
        match self.stream.read_and_next() {
            Ch(c) => {
                self.location_handler.inc(c);
                Ok(c)
            }
            StreamEnd => Err(self.unexpected_end()),
        }
    }

    /// Appends the current character to the consume buffer and advances.
    fn take(&mut self) {
        if let Ch(c) = self.stream.read_and_next() {
            self.location_handler.inc(c);
            self.consumed.push(c);
        }
    }

    /// Advances past the current character without recording it.
    fn advance(&mut self) {
        if let Ch(c) = self.stream.read_and_next() {
            self.location_handler.inc(c);
        }
    }

    /// Skips any whitespace at the current position.
    fn skip_whitespace(&mut self) {
        while self.stream.read().is_whitespace() {
            self.advance();
        }
    }

    /// Returns the current character, failing when the stream has ended.
    fn read_or_end(&self) -> Result<char, ScanError> {
        match self.stream.read() {
            Ch(c) => Ok(c),
            StreamEnd => Err(self.unexpected_end()),
        }
    }

    fn location(&self) -> Location {
        self.location_handler.cur_location
    }

    fn illegal_symbol(&self, found: char, expected: &[&str]) -> ScanError {
        ScanError::IllegalSymbol {
            found,
            expected: expected.iter().map(ToString::to_string).collect(),
            location: self.location(),
        }
    }

    fn unexpected_end(&self) -> ScanError {
        ScanError::UnexpectedEndOfStream {
            location: self.location(),
        }
    }
}

/// Identifier start: a letter, `_` or `$`.
fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

/// Identifier continuation: a letter, digit, `_` or `$`.
fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::token::TokenKind::*;
    use test_case::test_case;

    fn scan(input: &str) -> Result<Vec<Token>, ScanError> {
        let mut stream = ByteStream::new();
        stream.read_from_str(input);
        Scanner::new(&mut stream).scan()
    }

    fn tok(kind: TokenKind, lexeme: &str) -> Token {
        Token::new(kind, lexeme, Location::default())
    }

    #[test]
    fn test_full_document() {
        let input = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<!DOCTYPE mapper>\n",
            "<mapper>\n",
            "    <environment id=\"1\">\n",
            "        <datasource driver=\"org.h2.Driver\"/>\n",
            "        <pooled/>\n",
            "        <timeout>30</timeout>\n",
            "        <escaped>&lt;&gt;&amp;&apos;&quot;</escaped>\n",
            "    </environment>\n",
            "</mapper>\n",
        );
        let expected = vec![
            tok(Langel, "<"),
            tok(Qmark, "?"),
            tok(Identifier, "xml"),
            tok(Identifier, "version"),
            tok(Equals, "="),
            tok(StringLit, "1.0"),
            tok(Identifier, "encoding"),
            tok(Equals, "="),
            tok(StringLit, "UTF-8"),
            tok(Qmark, "?"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Exmark, "!"),
            tok(Identifier, "DOCTYPE"),
            tok(Identifier, "mapper"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Identifier, "mapper"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Identifier, "environment"),
            tok(Identifier, "id"),
            tok(Equals, "="),
            tok(StringLit, "1"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Identifier, "datasource"),
            tok(Identifier, "driver"),
            tok(Equals, "="),
            tok(StringLit, "org.h2.Driver"),
            tok(Slash, "/"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Identifier, "pooled"),
            tok(Slash, "/"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Identifier, "timeout"),
            tok(Rangel, ">"),
            tok(Content, "30"),
            tok(Langel, "<"),
            tok(Slash, "/"),
            tok(Identifier, "timeout"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Identifier, "escaped"),
            tok(Rangel, ">"),
            tok(Content, "<>&'\""),
            tok(Langel, "<"),
            tok(Slash, "/"),
            tok(Identifier, "escaped"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Slash, "/"),
            tok(Identifier, "environment"),
            tok(Rangel, ">"),
            tok(Langel, "<"),
            tok(Slash, "/"),
            tok(Identifier, "mapper"),
            tok(Rangel, ">"),
        ];
        assert_eq!(scan(input).unwrap(), expected);
    }

    #[test]
    fn test_single_quoted_string() {
        let tokens = scan("<a b='c\"d'/>").unwrap();
        assert_eq!(tokens[4], tok(StringLit, "c\"d"));
    }

    #[test]
    fn test_string_delimiter_not_recorded() {
        let double = scan("<a b=\"x\"/>").unwrap();
        let single = scan("<a b='x'/>").unwrap();
        assert_eq!(double, single);
    }

    #[test]
    fn test_entities_in_string() {
        let tokens = scan("<a b=\"&lt;&amp;&gt;\"/>").unwrap();
        assert_eq!(tokens[4], tok(StringLit, "<&>"));
    }

    #[test]
    fn test_content_is_trimmed() {
        let tokens = scan("<a>  hello world  </a>").unwrap();
        assert_eq!(tokens[3], tok(Content, "hello world"));
    }

    #[test]
    fn test_whitespace_only_body_has_no_content_token() {
        let tokens = scan("<a>   \n  </a>").unwrap();
        assert_eq!(
            tokens,
            vec![
                tok(Langel, "<"),
                tok(Identifier, "a"),
                tok(Rangel, ">"),
                tok(Langel, "<"),
                tok(Slash, "/"),
                tok(Identifier, "a"),
                tok(Rangel, ">"),
            ]
        );
    }

    #[test]
    fn test_comment_between_tokens_is_elided() {
        let tokens = scan("<!-- header --><a/>").unwrap();
        assert_eq!(
            tokens,
            vec![
                tok(Langel, "<"),
                tok(Identifier, "a"),
                tok(Slash, "/"),
                tok(Rangel, ">"),
            ]
        );
    }

    #[test]
    fn test_comment_inside_tag_is_elided() {
        let tokens = scan("<a <!-- note --> id=\"1\"/>").unwrap();
        assert_eq!(
            tokens,
            vec![
                tok(Langel, "<"),
                tok(Identifier, "a"),
                tok(Identifier, "id"),
                tok(Equals, "="),
                tok(StringLit, "1"),
                tok(Slash, "/"),
                tok(Rangel, ">"),
            ]
        );
    }

    #[test]
    fn test_comment_inside_content_merges_text() {
        let tokens = scan("<a>foo<!-- c -->bar</a>").unwrap();
        assert_eq!(tokens[3], tok(Content, "foobar"));
    }

    #[test]
    fn test_whitespace_around_comment_collapses() {
        let tokens = scan("<a>foo <!-- c --> bar</a>").unwrap();
        assert_eq!(tokens[3], tok(Content, "foobar"));
    }

    #[test]
    fn test_comment_before_content() {
        let tokens = scan("<a><!-- c -->foo</a>").unwrap();
        assert_eq!(tokens[3], tok(Content, "foo"));
    }

    #[test]
    fn test_consecutive_comments_in_content() {
        let tokens = scan("<a>foo<!-- one --><!-- two -->bar</a>").unwrap();
        assert_eq!(tokens[3], tok(Content, "foobar"));
    }

    #[test]
    fn test_content_after_self_closing_tag() {
        let tokens = scan("<a><b/>tail</a>").unwrap();
        assert_eq!(tokens[7], tok(Content, "tail"));
    }

    #[test]
    fn test_doctype_is_not_a_comment() {
        let tokens = scan("<!DOCTYPE mapper>").unwrap();
        assert_eq!(
            tokens,
            vec![
                tok(Langel, "<"),
                tok(Exmark, "!"),
                tok(Identifier, "DOCTYPE"),
                tok(Identifier, "mapper"),
                tok(Rangel, ">"),
            ]
        );
    }

    #[test]
    fn test_single_dashes_inside_comment_body() {
        let tokens = scan("<a>x<!-- a - b -->y</a>").unwrap();
        assert_eq!(tokens[3], tok(Content, "xy"));
    }

    #[test_case("<a>&xy;</a>", 'x', &["l", "g", "a", "q"] ; "unknown escape start")]
    #[test_case("<a>&ax;</a>", 'x', &["m", "p"] ; "ambiguous amp apos")]
    #[test_case("<a>&lx;</a>", 'x', &["t"] ; "lt wrong second char")]
    #[test_case("<a>&quot</a>", '<', &[";"] ; "missing semicolon")]
    fn test_bad_entities(input: &str, found: char, expected: &[&str]) {
        let err = scan(input).unwrap_err();
        match err {
            ScanError::IllegalSymbol {
                found: f,
                expected: e,
                ..
            } => {
                assert_eq!(f, found);
                assert_eq!(e, expected.iter().map(ToString::to_string).collect::<Vec<_>>());
            }
            other => panic!("expected IllegalSymbol, got {other:?}"),
        }
    }

    #[test_case("<a b=\"unterminated" ; "unterminated string")]
    #[test_case("<a><!-- never closed" ; "unterminated comment")]
    #[test_case("<a>content runs off" ; "unterminated content")]
    #[test_case("<a>&lt" ; "escape cut short")]
    fn test_unexpected_end_of_stream(input: &str) {
        assert!(matches!(
            scan(input).unwrap_err(),
            ScanError::UnexpectedEndOfStream { .. }
        ));
    }

    #[test]
    fn test_malformed_comment_opening() {
        let err = scan("<a><!-x</a>").unwrap_err();
        match err {
            ScanError::IllegalSymbol { found, expected, .. } => {
                assert_eq!(found, 'x');
                assert_eq!(expected, vec!["-".to_string()]);
            }
            other => panic!("expected IllegalSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_double_dash_in_comment_requires_close() {
        let err = scan("<a><!-- x --y -->").unwrap_err();
        match err {
            ScanError::IllegalSymbol { found, expected, .. } => {
                assert_eq!(found, 'y');
                assert_eq!(expected, vec![">".to_string()]);
            }
            other => panic!("expected IllegalSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_illegal_symbol_between_tokens() {
        let err = scan("<a ;").unwrap_err();
        match err {
            ScanError::IllegalSymbol { found, location, .. } => {
                assert_eq!(found, ';');
                assert_eq!((location.line, location.column), (1, 4));
            }
            other => panic!("expected IllegalSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_token_locations() {
        let tokens = scan("<a>\n  <b/>\r\n</a>").unwrap();
        let positions: Vec<(usize, usize)> = tokens
            .iter()
            .map(|t| (t.location.line, t.location.column))
            .collect();
        assert_eq!(
            positions,
            vec![
                (1, 1), // <
                (1, 2), // a
                (1, 3), // >
                (2, 3), // <
                (2, 4), // b
                (2, 5), // /
                (2, 6), // >
                (3, 1), // <
                (3, 2), // /
                (3, 3), // a
                (3, 4), // >
            ]
        );
    }

    #[test]
    fn test_content_location_is_first_character() {
        let tokens = scan("<a>\n   hi</a>").unwrap();
        let content = &tokens[3];
        assert_eq!(content.kind, Content);
        assert_eq!((content.location.line, content.location.column), (2, 4));
    }

    #[test]
    fn test_identifier_with_digits_and_marks() {
        let tokens = scan("<h2 _x=\"1\" $y=\"2\"/>").unwrap();
        assert_eq!(tokens[1], tok(Identifier, "h2"));
        assert_eq!(tokens[2], tok(Identifier, "_x"));
        assert_eq!(tokens[5], tok(Identifier, "$y"));
    }
}
