#![forbid(unsafe_code)]

//! Arena-backed document tree with live control state.
//!
//! # Design
//!
//! All nodes of a [`Document`] live in one `Vec` arena and are addressed by
//! [`NodeId`]. The arena never reclaims slots: a detached node simply loses
//! its parent link. Shadow documents are rebuilt and dropped every update
//! cycle, and a live document only accretes garbage when the reconciler
//! replaces a node wholesale, which the stable-template design makes rare.
//!
//! # Invariants
//!
//! 1. A node's id never changes for the lifetime of its document.
//! 2. `children` order is document order; attribute order is source order.
//! 3. Element tags are stored lowercased.
//! 4. The focused node, if any, is always attached.
//!
//! # Live state vs. markup
//!
//! `value`, `checked`, and the display override are *live* state: they are
//! not attributes and do not serialize. A control's effective value falls
//! back to its `value` attribute until the live value is first assigned,
//! mirroring how form controls dirty their value property.

use smallvec::SmallVec;

/// Handle to a node inside one [`Document`].
///
/// Ids are only meaningful for the document that created them; indexing a
/// document with a foreign id is a logic error (and may panic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single name/value attribute pair. Order within an element is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// What kind of node a [`NodeId`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
}

/// Editable-control classification, derived from tag and `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// `<input>` of a text-like type (text, number, password, ...).
    Input,
    /// `<input type="checkbox">`.
    Checkbox,
    /// `<input type="radio">`.
    Radio,
    /// `<textarea>`.
    TextArea,
    /// `<select>`.
    Select,
}

impl ControlKind {
    /// Whether this control carries checked state rather than a text value.
    #[must_use]
    pub fn is_toggle(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: SmallVec<[Attr; 4]>,
    /// Live value; `None` until first assigned (falls back to the attribute).
    value: Option<String>,
    checked: bool,
    /// Display override from the conditional-visibility pass.
    hidden: bool,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: SmallVec::new(),
            value: None,
            checked: false,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    payload: Payload,
}

/// An arena of nodes with one synthetic root element.
///
/// The root (tag `#document`) is never serialized; fragment content hangs
/// directly beneath it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    focus: Option<NodeId>,
}

impl Document {
    /// Create an empty document containing only the synthetic root.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            focus: None,
        };
        doc.root = doc.alloc(Payload::Element(Element::new("#document")));
        doc
    }

    /// The synthetic root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of arena slots (attached or not). Diagnostic only.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn alloc(&mut self, payload: Payload) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("arena exceeds u32::MAX nodes"));
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            payload,
        });
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id).payload {
            Payload::Element(el) => Some(el),
            Payload::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).payload {
            Payload::Element(el) => Some(el),
            Payload::Text(_) => None,
        }
    }

    // ── Construction ─────────────────────────────────────────────────────

    /// Create a detached element node. Tags are lowercased on entry.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(Payload::Element(Element::new(tag)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(Payload::Text(text.into()))
    }

    /// Append `child` (which must be detached) to `parent`'s child list.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(self.node(child).parent.is_none(), "child is already attached");
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Detach `id` from its parent, leaving the subtree intact but unrooted.
    /// Clears focus if the focused node is inside the detached subtree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            self.node_mut(parent).children.retain(|&c| c != id);
            self.node_mut(id).parent = None;
        }
        if let Some(focused) = self.focus
            && self.contains(id, focused)
        {
            self.focus = None;
        }
    }

    // ── Inspection ───────────────────────────────────────────────────────

    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.node(id).payload {
            Payload::Element(_) => NodeKind::Element,
            Payload::Text(_) => NodeKind::Text,
        }
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Element
    }

    /// Lowercased tag name, or `None` for text nodes.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Text content of a text node, or `None` for elements.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).payload {
            Payload::Text(t) => Some(t.as_str()),
            Payload::Element(_) => None,
        }
    }

    /// Overwrite a text node's content. No-op on elements.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Payload::Text(t) = &mut self.node_mut(id).payload {
            *t = text.into();
        }
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Whether `id` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cur = id;
        loop {
            if cur == self.root {
                return true;
            }
            match self.node(cur).parent {
                Some(p) => cur = p,
                None => return false,
            }
        }
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.node(c).parent;
        }
        false
    }

    // ── Attributes ───────────────────────────────────────────────────────

    /// Source-ordered attribute list (empty for text nodes).
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[Attr] {
        match self.element(id) {
            Some(el) => el.attrs.as_slice(),
            None => &[],
        }
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    #[must_use]
    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    /// Set an attribute, updating in place to preserve source order.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => el.attrs.push(Attr {
                    name: name.to_string(),
                    value,
                }),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|a| a.name != name);
        }
    }

    // ── Control state ────────────────────────────────────────────────────

    /// Effective control value: live value if assigned, else the `value`
    /// attribute, else the empty string.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &str {
        match self.element(id) {
            Some(el) => match &el.value {
                Some(v) => v.as_str(),
                None => el
                    .attrs
                    .iter()
                    .find(|a| a.name == "value")
                    .map_or("", |a| a.value.as_str()),
            },
            None => "",
        }
    }

    /// Assign the live value (dirties the control).
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.value = Some(value.into());
        }
    }

    #[must_use]
    pub fn checked(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.checked)
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) {
        if let Some(el) = self.element_mut(id) {
            el.checked = checked;
        }
    }

    /// Whether the conditional-visibility pass is currently hiding this node.
    #[must_use]
    pub fn hidden(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(|el| el.hidden)
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(el) = self.element_mut(id) {
            el.hidden = hidden;
        }
    }

    // ── Tag classification ───────────────────────────────────────────────

    /// `input`, `textarea`, and `select` are editable form controls.
    #[must_use]
    pub fn is_form_control(&self, id: NodeId) -> bool {
        matches!(self.tag(id), Some("input" | "textarea" | "select"))
    }

    /// Block containers get deep reconciliation instead of replacement.
    #[must_use]
    pub fn is_block_container(&self, id: NodeId) -> bool {
        self.tag(id) == Some("div")
    }

    #[must_use]
    pub fn control_kind(&self, id: NodeId) -> Option<ControlKind> {
        match self.tag(id)? {
            "textarea" => Some(ControlKind::TextArea),
            "select" => Some(ControlKind::Select),
            "input" => Some(match self.attr(id, "type") {
                Some("checkbox") => ControlKind::Checkbox,
                Some("radio") => ControlKind::Radio,
                _ => ControlKind::Input,
            }),
            _ => None,
        }
    }

    // ── Focus ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.focus
    }

    /// Focus an attached element. Detached nodes and text nodes are ignored.
    pub fn focus(&mut self, id: NodeId) {
        if self.is_element(id) && self.is_attached(id) {
            self.focus = Some(id);
        }
    }

    pub fn blur(&mut self) {
        self.focus = None;
    }

    // ── Cross-document grafting ──────────────────────────────────────────

    /// Deep-copy a subtree (including live control state) from another
    /// document into this one. The copy is returned detached.
    pub fn import_subtree(&mut self, src: &Document, src_id: NodeId) -> NodeId {
        let payload = src.node(src_id).payload.clone();
        let copy = self.alloc(payload);
        for &child in &src.node(src_id).children {
            let child_copy = self.import_subtree(src, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Replace `target` with a copy of `src_id` from another document,
    /// keeping the position in the parent's child list. Returns the new node.
    ///
    /// The old subtree is detached (losing focus if it held it).
    pub fn replace_with_import(
        &mut self,
        target: NodeId,
        src: &Document,
        src_id: NodeId,
    ) -> NodeId {
        let parent = self
            .node(target)
            .parent
            .expect("cannot replace a detached node");
        let position = self
            .node(parent)
            .children
            .iter()
            .position(|&c| c == target)
            .expect("target missing from parent child list");
        let copy = self.import_subtree(src, src_id);
        self.detach(target);
        self.node_mut(copy).parent = Some(parent);
        self.node_mut(parent).children.insert(position, copy);
        copy
    }

    /// Detach every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        while let Some(&child) = self.node(id).children.first() {
            self.detach(child);
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Minimal selector lookup: `#id`, `.class`, or a bare string treated as
    /// an id. Returns the first match in document order.
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        enum Sel<'a> {
            Id(&'a str),
            Class(&'a str),
        }
        let sel = match selector.as_bytes().first()? {
            b'#' => Sel::Id(&selector[1..]),
            b'.' => Sel::Class(&selector[1..]),
            _ => Sel::Id(selector),
        };
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                let hit = match sel {
                    Sel::Id(want) => self.attr(id, "id") == Some(want),
                    Sel::Class(want) => self
                        .attr(id, "class")
                        .is_some_and(|c| c.split_ascii_whitespace().any(|part| part == want)),
                };
                if hit {
                    return Some(id);
                }
            }
            // Push in reverse so document order wins.
            for &child in self.node(id).children.iter().rev() {
                stack.push(child);
            }
        }
        None
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_div() -> (Document, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        let root = doc.root();
        doc.append_child(root, div);
        (doc, div)
    }

    #[test]
    fn tags_are_lowercased() {
        let (doc, div) = doc_with_div();
        assert_eq!(doc.tag(div), Some("div"));
    }

    #[test]
    fn append_and_children_order() {
        let (mut doc, div) = doc_with_div();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        doc.append_child(div, a);
        doc.append_child(div, b);
        assert_eq!(doc.children(div), &[a, b]);
        assert_eq!(doc.parent(a), Some(div));
    }

    #[test]
    fn attr_order_preserved_on_update() {
        let (mut doc, div) = doc_with_div();
        doc.set_attr(div, "class", "x");
        doc.set_attr(div, "id", "main");
        doc.set_attr(div, "class", "y");
        let names: Vec<_> = doc.attrs(div).iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["class", "id"]);
        assert_eq!(doc.attr(div, "class"), Some("y"));
    }

    #[test]
    fn value_falls_back_to_attribute_until_dirtied() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        let root = doc.root();
        doc.append_child(root, input);
        assert_eq!(doc.value(input), "");
        doc.set_attr(input, "value", "seed");
        assert_eq!(doc.value(input), "seed");
        doc.set_value(input, "typed");
        assert_eq!(doc.value(input), "typed");
        // Attribute updates no longer show through once dirtied.
        doc.set_attr(input, "value", "later");
        assert_eq!(doc.value(input), "typed");
    }

    #[test]
    fn control_kind_from_type_attr() {
        let mut doc = Document::new();
        let input = doc.create_element("input");
        assert_eq!(doc.control_kind(input), Some(ControlKind::Input));
        doc.set_attr(input, "type", "checkbox");
        assert_eq!(doc.control_kind(input), Some(ControlKind::Checkbox));
        assert!(doc.control_kind(input).unwrap().is_toggle());
        let div = doc.create_element("div");
        assert_eq!(doc.control_kind(div), None);
    }

    #[test]
    fn detach_clears_focus_inside_subtree() {
        let (mut doc, div) = doc_with_div();
        let input = doc.create_element("input");
        doc.append_child(div, input);
        doc.focus(input);
        assert_eq!(doc.focused(), Some(input));
        doc.detach(div);
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn focus_rejects_detached_nodes() {
        let mut doc = Document::new();
        let stray = doc.create_element("input");
        doc.focus(stray);
        assert_eq!(doc.focused(), None);
    }

    #[test]
    fn replace_with_import_keeps_position() {
        let (mut doc, div) = doc_with_div();
        let before = doc.create_text("before");
        let target = doc.create_element("span");
        let after = doc.create_text("after");
        doc.append_child(div, before);
        doc.append_child(div, target);
        doc.append_child(div, after);

        let mut other = Document::new();
        let replacement = other.create_element("p");
        let t = other.create_text("new");
        other.append_child(replacement, t);

        let copied = doc.replace_with_import(target, &other, replacement);
        assert_eq!(doc.children(div).len(), 3);
        assert_eq!(doc.children(div)[1], copied);
        assert_eq!(doc.tag(copied), Some("p"));
        assert!(!doc.is_attached(target));
    }

    #[test]
    fn import_copies_live_state() {
        let mut src = Document::new();
        let input = src.create_element("input");
        src.set_value(input, "hello");
        src.set_checked(input, true);

        let mut dst = Document::new();
        let copy = dst.import_subtree(&src, input);
        assert_eq!(dst.value(copy), "hello");
        assert!(dst.checked(copy));
    }

    #[test]
    fn query_selector_forms() {
        let (mut doc, div) = doc_with_div();
        doc.set_attr(div, "id", "app");
        let span = doc.create_element("span");
        doc.set_attr(span, "class", "note highlight");
        doc.append_child(div, span);

        assert_eq!(doc.query_selector("#app"), Some(div));
        assert_eq!(doc.query_selector("app"), Some(div));
        assert_eq!(doc.query_selector(".highlight"), Some(span));
        assert_eq!(doc.query_selector("#missing"), None);
    }

    #[test]
    fn contains_and_attachment() {
        let (mut doc, div) = doc_with_div();
        let inner = doc.create_element("span");
        doc.append_child(div, inner);
        assert!(doc.contains(div, inner));
        assert!(!doc.contains(inner, div));
        assert!(doc.is_attached(inner));
        doc.detach(div);
        assert!(!doc.is_attached(inner));
    }
}
