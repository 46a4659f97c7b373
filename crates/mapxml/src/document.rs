//! The parsed document: the root element plus whatever the prolog declared.

use std::fmt;

use encoding_rs::Encoding;

use crate::node::Element;

/// XML versions this reader accepts in the declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum XmlVersion {
    V1_0,
}

impl XmlVersion {
    /// The version string as it appears in a declaration.
    pub fn as_str(&self) -> &'static str {
        match self {
            XmlVersion::V1_0 => "1.0",
        }
    }

    /// Looks up a version by its declaration string.
    pub fn from_version(version: &str) -> Option<XmlVersion> {
        match version {
            "1.0" => Some(XmlVersion::V1_0),
            _ => None,
        }
    }
}

impl fmt::Display for XmlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parsed document. Immutable once returned; ownership passes to the
/// caller.
///
/// `encoding` is what the declaration named, resolved against the WHATWG
/// label set. It is informational only: the input has already been decoded as
/// UTF-8 by the time the declaration is parsed, and is never re-decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub version: Option<XmlVersion>,
    pub encoding: Option<&'static Encoding>,
    /// The raw `<!DOCTYPE ...>` interior, captured opaquely.
    pub doctype: Option<String>,
    /// The root element. Never self-closing.
    pub root: Element,
}
