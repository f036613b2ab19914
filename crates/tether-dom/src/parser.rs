#![forbid(unsafe_code)]

//! Lenient markup parser: the `innerHTML` contract.
//!
//! Parses an HTML-like subset (elements, double-/single-/un-quoted and bare
//! attributes, text, comments, doctypes) into a [`Document`] fragment. The
//! parser never fails: malformed input degrades to a best-effort tree, the
//! same way a browser's fragment parser behaves.
//!
//! # Recovery rules
//!
//! - A `<` not followed by a tag-name character is literal text.
//! - An unmatched close tag is ignored; a close tag for an open ancestor
//!   pops every element up to and including it.
//! - Unterminated comments, tags, and quoted values run to end of input.
//! - Duplicate attributes keep the first occurrence.
//!
//! Marker attributes (`#value`, `@click`, `#show`, ...) are ordinary
//! attributes at this layer; their `#`/`@` prefixes are legal name bytes.

use std::borrow::Cow;

use memchr::memchr;

use crate::document::{Document, NodeId};

/// Elements that never have children and take no close tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[must_use]
pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parse a markup fragment into a fresh document. Fragment content hangs
/// under the synthetic root.
#[must_use]
pub fn parse_fragment(markup: &str) -> Document {
    let mut doc = Document::new();
    let root = doc.root();
    parse_into(&mut doc, root, markup);
    doc
}

/// Parse `markup` and append the resulting nodes under `parent`.
pub fn parse_into(doc: &mut Document, parent: NodeId, markup: &str) {
    Parser {
        bytes: markup.as_bytes(),
        src: markup,
        pos: 0,
        doc,
        stack: vec![parent],
    }
    .run();
}

struct Parser<'a, 'd> {
    bytes: &'a [u8],
    src: &'a str,
    pos: usize,
    doc: &'d mut Document,
    stack: Vec<NodeId>,
}

impl Parser<'_, '_> {
    fn run(mut self) {
        while self.pos < self.bytes.len() {
            match memchr(b'<', &self.bytes[self.pos..]) {
                Some(offset) => {
                    if offset > 0 {
                        self.emit_text(self.pos, self.pos + offset);
                    }
                    self.pos += offset;
                    self.tag_open();
                }
                None => {
                    self.emit_text(self.pos, self.bytes.len());
                    break;
                }
            }
        }
    }

    fn current_parent(&self) -> NodeId {
        *self.stack.last().expect("parser stack never empties")
    }

    fn emit_text(&mut self, start: usize, end: usize) {
        let text = decode_entities(&self.src[start..end]);
        if !text.is_empty() {
            let node = self.doc.create_text(text);
            let parent = self.current_parent();
            self.doc.append_child(parent, node);
        }
    }

    /// Dispatch on the byte after `<`. `self.pos` points at the `<`.
    fn tag_open(&mut self) {
        let rest = &self.bytes[self.pos..];
        if rest.starts_with(b"<!--") {
            self.skip_comment();
        } else if rest.len() >= 2 && (rest[1] == b'!' || rest[1] == b'?') {
            // Doctype or processing instruction: skip to `>`.
            self.pos = match memchr(b'>', rest) {
                Some(end) => self.pos + end + 1,
                None => self.bytes.len(),
            };
        } else if rest.len() >= 2 && rest[1] == b'/' {
            self.close_tag();
        } else if rest.len() >= 2 && rest[1].is_ascii_alphabetic() {
            self.open_tag();
        } else {
            // Literal `<` in text.
            self.emit_text(self.pos, self.pos + 1);
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        let rest = &self.src[self.pos + 4..];
        self.pos = match rest.find("-->") {
            Some(end) => self.pos + 4 + end + 3,
            None => self.bytes.len(),
        };
    }

    fn close_tag(&mut self) {
        self.pos += 2; // consume `</`
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_name_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let name = self.src[name_start..self.pos].to_ascii_lowercase();
        // Consume through `>` regardless of what sits between.
        self.pos = match memchr(b'>', &self.bytes[self.pos..]) {
            Some(end) => self.pos + end + 1,
            None => self.bytes.len(),
        };
        // Pop to the matching open element, if any; otherwise ignore.
        if let Some(depth) = self
            .stack
            .iter()
            .skip(1)
            .rposition(|&id| self.doc.tag(id) == Some(name.as_str()))
        {
            self.stack.truncate(depth + 1);
        }
    }

    fn open_tag(&mut self) {
        self.pos += 1; // consume `<`
        let name_start = self.pos;
        while self.pos < self.bytes.len() && is_name_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let tag = &self.src[name_start..self.pos];
        let element = self.doc.create_element(tag);
        let tag = self.doc.tag(element).expect("just created").to_string();

        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.bytes.get(self.pos) {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                    if self.bytes.get(self.pos) == Some(&b'>') {
                        self.pos += 1;
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => self.attribute(element),
            }
        }

        let parent = self.current_parent();
        self.doc.append_child(parent, element);
        if !self_closing && !is_void_element(&tag) {
            self.stack.push(element);
        }
    }

    fn attribute(&mut self, element: NodeId) {
        let name_start = self.pos;
        while self.pos < self.bytes.len() && !matches!(self.bytes[self.pos], b'=' | b'/' | b'>')
            && !self.bytes[self.pos].is_ascii_whitespace()
        {
            self.pos += 1;
        }
        let name = self.src[name_start..self.pos].to_string();
        if name.is_empty() {
            // Stray byte we cannot attribute; skip it to guarantee progress.
            self.pos += 1;
            return;
        }

        self.skip_whitespace();
        let value = if self.bytes.get(self.pos) == Some(&b'=') {
            self.pos += 1;
            self.skip_whitespace();
            self.attribute_value()
        } else {
            String::new() // bare attribute
        };

        // First occurrence wins, as in the HTML spec.
        if !self.doc.has_attr(element, &name) {
            self.doc.set_attr(element, &name, value);
        }
    }

    fn attribute_value(&mut self) -> String {
        match self.bytes.get(self.pos) {
            Some(&quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                let end = match memchr(quote, &self.bytes[self.pos..]) {
                    Some(offset) => self.pos + offset,
                    None => self.bytes.len(),
                };
                self.pos = (end + 1).min(self.bytes.len());
                decode_entities(&self.src[start..end]).into_owned()
            }
            _ => {
                let start = self.pos;
                while self.pos < self.bytes.len()
                    && !matches!(self.bytes[self.pos], b'>')
                    && !self.bytes[self.pos].is_ascii_whitespace()
                {
                    self.pos += 1;
                }
                decode_entities(&self.src[start..self.pos]).into_owned()
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Decode the five entities the serializer can produce, plus `&#39;`.
/// Anything else passes through untouched.
#[must_use]
pub(crate) fn decode_entities(text: &str) -> Cow<'_, str> {
    if memchr(b'&', text.as_bytes()).is_none() {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let replaced = [
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&quot;", "\""),
            ("&#x27;", "'"),
            ("&#39;", "'"),
            ("&apos;", "'"),
            ("&#x2f;", "/"),
            ("&#x2F;", "/"),
            ("&#x3D;", "="),
            ("&#x60;", "`"),
        ]
        .iter()
        .find(|(entity, _)| rest.starts_with(entity));
        match replaced {
            Some((entity, ch)) => {
                out.push_str(ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
