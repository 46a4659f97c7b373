//! The node variants the parser builds the tree from. Closed enums with
//! structural equality; no behavior beyond construction and access.

use std::collections::HashMap;

/// An element with an explicit closing tag; the only tag form that can carry
/// children.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: HashMap<String, String>,
    pub children: Vec<Value>,
}

/// A `<name .../>` element. Never has children.
#[derive(Clone, Debug, PartialEq)]
pub struct SelfClosingElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
}

/// Either tag form.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    Element(Element),
    SelfClosing(SelfClosingElement),
}

/// One child of an element: text content or a nested tag.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Element(Tag),
}

impl Element {
    /// Looks up an attribute value by key.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The child tags, skipping text content.
    pub fn child_elements(&self) -> impl Iterator<Item = &Tag> {
        self.children.iter().filter_map(Value::as_tag)
    }
}

impl SelfClosingElement {
    /// Looks up an attribute value by key.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

impl Tag {
    /// The tag name, for either form.
    pub fn name(&self) -> &str {
        match self {
            Tag::Element(element) => &element.name,
            Tag::SelfClosing(element) => &element.name,
        }
    }

    /// The attribute map, for either form.
    pub fn attributes(&self) -> &HashMap<String, String> {
        match self {
            Tag::Element(element) => &element.attributes,
            Tag::SelfClosing(element) => &element.attributes,
        }
    }
}

impl Value {
    /// The text of a [`Value::Text`] node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Element(_) => None,
        }
    }

    /// The tag of a [`Value::Element`] node.
    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Value::Text(_) => None,
            Value::Element(tag) => Some(tag),
        }
    }
}
