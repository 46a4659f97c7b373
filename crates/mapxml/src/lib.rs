//! mapxml — a lightweight XML reader for mapper and configuration files.
//!
//! The pipeline runs in two explicit phases: [`Scanner::scan`] materializes
//! the complete token queue, then [`Parser::parse`] consumes it and builds
//! the immutable [`Document`] tree. [`parse_str`] and [`parse_reader`] wire
//! the phases together for the common case.
//!
//! Only a constrained subset of XML is accepted: one optional `<?xml ...?>`
//! declaration, one optional `<!DOCTYPE ...>` (captured opaquely), elements
//! with attributes, text content, comments (elided wherever they appear) and
//! the five standard entity escapes. Namespaces, CDATA sections, DTD
//! structure and processing instructions are out of scope. Input is always
//! decoded as UTF-8; a declared `encoding` is resolved and recorded on the
//! document but never applied to the bytes.

pub mod document;
pub mod errors;
pub mod node;
pub mod parser;
pub mod scanner;

use std::io::Read;

use mapxml_shared::byte_stream::ByteStream;

pub use crate::document::{Document, XmlVersion};
pub use crate::errors::{Error, ParseError, Result, ScanError};
pub use crate::node::{Element, SelfClosingElement, Tag, Value};
pub use crate::parser::{Parser, ParserOptions};
pub use crate::scanner::token::{Token, TokenKind};
pub use crate::scanner::Scanner;

/// Parses a complete document from a string.
pub fn parse_str(xml: &str) -> Result<Document> {
    let mut stream = ByteStream::new();
    stream.read_from_str(xml);
    parse_stream(&mut stream)
}

/// Reads the given reader to its end and parses the result. The reader is
/// only read here; acquiring and releasing the underlying resource stays
/// with the caller.
pub fn parse_reader(reader: impl Read) -> Result<Document> {
    let mut stream = ByteStream::new();
    stream.read_from_file(reader)?;
    parse_stream(&mut stream)
}

fn parse_stream(stream: &mut ByteStream) -> Result<Document> {
    let tokens = Scanner::new(stream).scan()?;
    Parser::new(tokens).parse()
}
