//! A minimal DOM-like tree type.
//!
//! The loader (see [`crate::loader`]) consumes this generic [`Element`] tree rather
//! than any particular XML library's node type, so that XML parsing itself stays an
//! external collaborator (the `taci-xml` crate builds this tree from real XML text;
//! tests in this crate build it directly).

use std::collections::BTreeMap;

/// One element node: a tag name, its attributes, child elements, and (for leaf
/// elements such as `arg1`) its text content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Element>,
    pub text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Element {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Element {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: Element) -> Element {
        self.children.push(child);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Trimmed text content, the lexeme the loader decodes.
    pub fn lexeme(&self) -> &str {
        self.text.trim()
    }
}
