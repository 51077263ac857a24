//! Streaming row selection over an XML byte stream.
//!
//! [`RowStream`] walks the quick-xml event stream and materializes only
//! the subtree of each element matching the row pattern, so memory use is
//! bounded by one row at a time. Row selection is structural: the open
//! element chain is matched against a compiled [`RowPattern`], which is
//! restricted to forward-only element-path descent (`/root/items/item`,
//! `//item`). The richer column expression language never runs against
//! the whole document, only against materialized row subtrees.
//!
//! Input is expected to be UTF-8; an `encoding` declaration in the XML
//! prolog is not honored.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{Attribute, Element, XmlNode};
use crate::error::{DocumentError, DocumentResult, ExpressionError, ExpressionResult};
use crate::xpath::parser::{Expr, NameTest, Step};

/// A row-selecting path compiled to a streaming-compatible form.
///
/// Either anchored (`/root/items/item`: the open-element chain must equal
/// the pattern) or floating (`//channel/item`: the chain must end with
/// the pattern). Attribute steps, wildcards, functions and mid-path `//`
/// are rejected at compile time.
#[derive(Debug, Clone)]
pub struct RowPattern {
    anchored: bool,
    names: Vec<String>,
}

impl RowPattern {
    /// Compile a rows path, rejecting anything not expressible as a
    /// forward-only element descent.
    pub fn compile(rows_path: &str) -> ExpressionResult<Self> {
        let invalid = |cause: &str| ExpressionError::invalid(rows_path, cause);

        let expr = crate::xpath::parser::parse(rows_path)
            .map_err(|cause| ExpressionError::invalid(rows_path, cause))?;
        let path = match expr {
            Expr::Path(path) => path,
            _ => return Err(invalid("row selection requires an element path")),
        };

        let mut anchored = true;
        let mut names = Vec::new();
        for (i, step) in path.steps.iter().enumerate() {
            let test = match step {
                Step::Child(test) => test,
                Step::Descendant(test) if i == 0 => {
                    anchored = false;
                    test
                }
                Step::Descendant(_) => {
                    return Err(invalid(
                        "`//` is only supported at the start of a row path",
                    ))
                }
                Step::Current | Step::Attribute(_) => {
                    return Err(invalid("row selection requires an element path"))
                }
            };
            match test {
                NameTest::Name(name) => names.push(name.clone()),
                NameTest::Any => {
                    return Err(invalid("wildcards are not supported in a row path"))
                }
            }
        }

        if names.is_empty() {
            return Err(invalid("row path selects no element"));
        }
        Ok(Self { anchored, names })
    }

    /// Does the open-element chain (root first) select a row?
    fn matches(&self, stack: &[String]) -> bool {
        if self.anchored {
            stack == self.names.as_slice()
        } else {
            stack.len() >= self.names.len() && stack.ends_with(&self.names)
        }
    }
}

/// A lazy, forward-only sequence of row elements from one document.
pub struct RowStream<R: BufRead> {
    reader: Reader<R>,
    pattern: RowPattern,
    input: String,
    stack: Vec<String>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> RowStream<R> {
    /// Open a row stream over a byte source. `input` identifies the
    /// source in diagnostics (a path or URL).
    pub fn new(source: R, pattern: RowPattern, input: impl Into<String>) -> Self {
        // Text nodes are kept verbatim: flattened text is the exact
        // concatenation of a row's character data, padding included.
        let reader = Reader::from_reader(source);
        Self {
            reader,
            pattern,
            input: input.into(),
            stack: Vec::new(),
            buf: Vec::new(),
            done: false,
        }
    }

    /// Advance to the next row, materializing its subtree.
    ///
    /// Returns `Ok(None)` once the document is exhausted. After an error
    /// the stream stays exhausted.
    pub fn next_row(&mut self) -> DocumentResult<Option<Element>> {
        if self.done {
            return Ok(None);
        }
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    self.done = true;
                    return Err(DocumentError::malformed(&self.input, e));
                }
            };
            match event {
                // Detach the event from the read buffer so the element
                // chain and attributes can be inspected via `&self`.
                Event::Start(start) => {
                    let start = start.into_owned();
                    let name = element_name(&start);
                    if self.chain_matches(&name) {
                        let root = self.open_element(&start)?;
                        let row = self.read_subtree(root)?;
                        return Ok(Some(row));
                    }
                    self.stack.push(name);
                }
                Event::Empty(start) => {
                    let start = start.into_owned();
                    let name = element_name(&start);
                    if self.chain_matches(&name) {
                        let row = self.open_element(&start)?;
                        return Ok(Some(row));
                    }
                }
                Event::End(_) => {
                    self.stack.pop();
                }
                Event::Eof => {
                    self.done = true;
                    if let Some(open) = self.stack.last() {
                        return Err(DocumentError::malformed(
                            &self.input,
                            format!("unexpected end of document inside <{open}>"),
                        ));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Would pushing `name` onto the open-element chain select a row?
    fn chain_matches(&self, name: &str) -> bool {
        // Cheap tail check before building the candidate chain.
        if let Some(last) = self.pattern.names.last() {
            if last != name {
                return false;
            }
        }
        let mut chain = self.stack.clone();
        chain.push(name.to_string());
        self.pattern.matches(&chain)
    }

    fn open_element(&self, start: &BytesStart<'_>) -> DocumentResult<Element> {
        let mut element = Element::new(element_name(start));
        for attr in start.attributes() {
            let attr = attr.map_err(|e| DocumentError::malformed(&self.input, e))?;
            let value = attr
                .unescape_value()
                .map_err(|e| DocumentError::malformed(&self.input, e))?;
            element.attributes.push(Attribute {
                name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                value: value.into_owned(),
            });
        }
        Ok(element)
    }

    /// Consume events up to and including the matched element's end tag,
    /// building its subtree. A nested element matching the row pattern
    /// stays part of this row (outermost match wins).
    fn read_subtree(&mut self, root: Element) -> DocumentResult<Element> {
        let mut open: Vec<Element> = vec![root];
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let event = match self.reader.read_event_into(&mut buf) {
                Ok(event) => event,
                Err(e) => {
                    self.done = true;
                    return Err(DocumentError::malformed(&self.input, e));
                }
            };
            match event {
                Event::Start(start) => {
                    let element = self.open_element(&start)?;
                    open.push(element);
                }
                Event::Empty(start) => {
                    let element = self.open_element(&start)?;
                    if let Some(parent) = open.last_mut() {
                        parent.children.push(XmlNode::Element(element));
                    }
                }
                Event::End(_) => {
                    let Some(element) = open.pop() else {
                        self.done = true;
                        return Err(DocumentError::malformed(
                            &self.input,
                            "unexpected closing tag",
                        ));
                    };
                    match open.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => return Ok(element),
                    }
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| DocumentError::malformed(&self.input, e))?;
                    if let Some(parent) = open.last_mut() {
                        parent.push_text(&text);
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    if let Some(parent) = open.last_mut() {
                        parent.push_text(&text);
                    }
                }
                Event::Eof => {
                    self.done = true;
                    return Err(DocumentError::malformed(
                        &self.input,
                        "unexpected end of document inside a row element",
                    ));
                }
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for RowStream<R> {
    type Item = DocumentResult<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}
