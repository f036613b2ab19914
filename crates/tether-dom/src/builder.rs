#![forbid(unsafe_code)]

//! Programmatic node construction (the hyperscript-style `h` helper).
//!
//! Useful for tests and for hosts that build fragments outside the template
//! path. Builders are plain descriptions; nothing touches a [`Document`]
//! until [`NodeBuilder::build`] or [`NodeBuilder::render_into`].
//!
//! ```
//! use tether_dom::{Document, h};
//!
//! let mut doc = Document::new();
//! let root = doc.root();
//! h("div")
//!     .attr("id", "panel")
//!     .style(&[("backgroundColor", "red"), ("display", "flex")])
//!     .child(h("span").text("hi"))
//!     .render_into(&mut doc, root);
//! assert!(doc.inner_markup(root).starts_with("<div id=\"panel\""));
//! ```

use crate::document::{Document, NodeId};

/// Shorthand constructor for a [`NodeBuilder`].
#[must_use]
pub fn h(tag: &str) -> NodeBuilder {
    NodeBuilder::new(tag)
}

enum Child {
    Text(String),
    Node(NodeBuilder),
}

/// Declarative element description, realized into a document on demand.
pub struct NodeBuilder {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<Child>,
}

impl NodeBuilder {
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    /// Inline style pairs. camelCase property names are normalized to
    /// kebab-case (`backgroundColor` → `background-color`).
    #[must_use]
    pub fn style(self, pairs: &[(&str, &str)]) -> Self {
        let css = pairs
            .iter()
            .map(|(name, value)| format!("{}: {value}", kebab_case(name)))
            .collect::<Vec<_>>()
            .join("; ");
        self.attr("style", css)
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Child::Text(text.into()));
        self
    }

    #[must_use]
    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(Child::Node(child));
        self
    }

    /// Realize the subtree in `doc`, returning the detached element.
    pub fn build(self, doc: &mut Document) -> NodeId {
        let element = doc.create_element(&self.tag);
        for (name, value) in self.attrs {
            doc.set_attr(element, &name, value);
        }
        for child in self.children {
            let child_id = match child {
                Child::Text(text) => doc.create_text(text),
                Child::Node(builder) => builder.build(doc),
            };
            doc.append_child(element, child_id);
        }
        element
    }

    /// Realize the subtree and append it under `parent`.
    pub fn render_into(self, doc: &mut Document, parent: NodeId) -> NodeId {
        let element = self.build(doc);
        doc.append_child(parent, element);
        element
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
