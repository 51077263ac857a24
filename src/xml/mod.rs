//! Materialized XML element trees.
//!
//! A row selected from a document is handed to the projector as an
//! [`Element`]: its attributes, child elements in document order, and text
//! content. Only the subtree of one row is ever materialized; streaming
//! happens in [`stream`].

pub mod stream;

/// A single attribute on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// One node inside an element: a child element or a run of text.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    Text(String),
}

/// An XML element with attributes and children in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<XmlNode>,
}

impl Element {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Child elements in document order, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    /// All descendant elements in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_descendants(self, &mut out);
        out
    }

    /// Flattened text: concatenation of all text in the subtree, in
    /// document order.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        append_text(self, &mut out);
        out
    }

    /// Append a run of text, merging with a trailing text node if present.
    pub fn push_text(&mut self, text: &str) {
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    // Test-friendly builders, mirroring the mapping builders.

    /// Add an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Add a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Add a text child.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }
}

fn collect_descendants<'a>(el: &'a Element, out: &mut Vec<&'a Element>) {
    for child in el.child_elements() {
        out.push(child);
        collect_descendants(child, out);
    }
}

fn append_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            XmlNode::Text(t) => out.push_str(t),
            XmlNode::Element(e) => append_text(e, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("item")
            .with_attribute("id", "1")
            .with_child(Element::new("name").with_text("name1"))
            .with_child(
                Element::new("value")
                    .with_text("a")
                    .with_child(Element::new("b").with_text("b"))
                    .with_text("c"),
            )
    }

    #[test]
    fn test_attribute_lookup() {
        let el = sample();
        assert_eq!(el.attribute("id"), Some("1"));
        assert_eq!(el.attribute("missing"), None);
    }

    #[test]
    fn test_child_elements_skip_text() {
        let el = sample();
        let names: Vec<_> = el.child_elements().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "value"]);
    }

    #[test]
    fn test_inner_text_document_order() {
        let el = sample();
        assert_eq!(el.inner_text(), "name1abc");

        let value = el.child_elements().nth(1).unwrap();
        assert_eq!(value.inner_text(), "abc");
    }

    #[test]
    fn test_descendants_preorder() {
        let el = sample();
        let names: Vec<_> = el.descendants().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["name", "value", "b"]);
    }

    #[test]
    fn test_push_text_merges_adjacent() {
        let mut el = Element::new("t");
        el.push_text("foo");
        el.push_text("bar");
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.inner_text(), "foobar");
    }
}
