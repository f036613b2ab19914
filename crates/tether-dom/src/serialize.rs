#![forbid(unsafe_code)]

//! Markup serialization for [`Document`] subtrees.
//!
//! Text and attribute values are HTML-escaped on the way out, so a
//! serialize → parse round trip is stable for trees the parser produced.
//! Live control state (`value`, `checked`, display override) deliberately
//! does not serialize: it is not markup.

use std::fmt::Write;

use v_htmlescape::escape;

use crate::document::{Document, NodeId};
use crate::parser::is_void_element;

impl Document {
    /// Serialized markup of `id`'s children (the `innerHTML` view).
    #[must_use]
    pub fn inner_markup(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(&mut out, child);
        }
        out
    }

    /// Serialized markup of `id` itself, children included. The synthetic
    /// root serializes as its children.
    #[must_use]
    pub fn outer_markup(&self, id: NodeId) -> String {
        if self.tag(id) == Some("#document") {
            return self.inner_markup(id);
        }
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        if let Some(text) = self.text(id) {
            let _ = write!(out, "{}", escape(text));
            return;
        }
        let tag = self.tag(id).expect("node is element or text");
        let _ = write!(out, "<{tag}");
        for attr in self.attrs(id) {
            let _ = write!(out, " {}=\"{}\"", attr.name, escape(&attr.value));
        }
        out.push('>');
        if is_void_element(tag) {
            return;
        }
        for &child in self.children(id) {
            self.write_node(out, child);
        }
        let _ = write!(out, "</{tag}>");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::parser::parse_fragment;

    #[test]
    fn round_trip_simple_markup() {
        let markup = r#"<div id="app"><p class="note">hello</p><input type="text"></div>"#;
        let doc = parse_fragment(markup);
        assert_eq!(doc.inner_markup(doc.root()), markup);
    }

    #[test]
    fn text_is_escaped() {
        let mut doc = crate::Document::new();
        let root = doc.root();
        let text = doc.create_text("a < b & c");
        doc.append_child(root, text);
        assert_eq!(doc.inner_markup(root), "a &lt; b &amp; c");
    }

    #[test]
    fn void_elements_have_no_close_tag() {
        let doc = parse_fragment("<div><br><input value=\"x\"></div>");
        let html = doc.inner_markup(doc.root());
        assert!(!html.contains("</br>"));
        assert!(!html.contains("</input>"));
    }

    #[test]
    fn outer_vs_inner() {
        let doc = parse_fragment("<div><span>x</span></div>");
        let div = doc.children(doc.root())[0];
        assert_eq!(doc.inner_markup(div), "<span>x</span>");
        assert_eq!(doc.outer_markup(div), "<div><span>x</span></div>");
    }

    #[test]
    fn live_state_does_not_serialize() {
        let doc = {
            let mut doc = parse_fragment("<input>");
            let input = doc.children(doc.root())[0];
            doc.set_value(input, "typed");
            doc.set_checked(input, true);
            doc
        };
        assert_eq!(doc.inner_markup(doc.root()), "<input>");
    }

    #[test]
    fn reparse_of_serialized_output_is_stable() {
        let doc = parse_fragment(r#"<p title="a &quot;b&quot;">x &amp; y</p>"#);
        let once = doc.inner_markup(doc.root());
        let doc2 = parse_fragment(&once);
        assert_eq!(doc2.inner_markup(doc2.root()), once);
    }
}
