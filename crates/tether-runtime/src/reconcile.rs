#![forbid(unsafe_code)]

//! Tree reconciliation.
//!
//! # Design
//!
//! `reconcile` mutates the live tree in place to match a freshly parsed
//! shadow tree, pairing children positionally (by index, not by key) and
//! preserving node identity wherever tag names match so focus and control
//! state survive a cycle. The template skeleton is stable across renders,
//! so positions and tags rarely change; only text, attributes, and control
//! values do. Positional pairing is the intended scope, not a placeholder
//! for keyed reconciliation.
//!
//! # Invariants
//!
//! - Reconciling a tree against an identical shadow applies zero patches.
//! - A node is replaced (new `NodeId`) only when its tag name differs from
//!   its positional counterpart; every other patch is in place.
//! - Child lists are paired up to the shorter length; extra trailing
//!   children on either side are left alone.

use bitflags::bitflags;
use smallvec::SmallVec;
use tether_dom::{Document, NodeId, NodeKind};

bitflags! {
    /// Which classes of patch a reconciliation pass applied.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PatchKind: u8 {
        const TEXT    = 1 << 0;
        const ATTR    = 1 << 1;
        const VALUE   = 1 << 2;
        const CHECKED = 1 << 3;
        const REPLACE = 1 << 4;
    }
}

/// Patch counts from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    pub texts: usize,
    pub attrs: usize,
    pub values: usize,
    pub checked: usize,
    pub replaced: usize,
    pub kinds: PatchKind,
}

impl PatchStats {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.texts + self.attrs + self.values + self.checked + self.replaced
    }
}

/// Reconcile the children of `live_parent` against the children of
/// `shadow_parent`, mutating the live document in place.
pub fn reconcile(
    live: &mut Document,
    live_parent: NodeId,
    shadow: &Document,
    shadow_parent: NodeId,
) -> PatchStats {
    let mut stats = PatchStats::default();
    reconcile_children(live, live_parent, shadow, shadow_parent, &mut stats);
    stats
}

fn reconcile_children(
    live: &mut Document,
    live_parent: NodeId,
    shadow: &Document,
    shadow_parent: NodeId,
    stats: &mut PatchStats,
) {
    let pairs = live
        .children(live_parent)
        .iter()
        .copied()
        .zip(shadow.children(shadow_parent).iter().copied())
        .collect::<SmallVec<[(NodeId, NodeId); 8]>>();
    for (live_child, shadow_child) in pairs {
        reconcile_node(live, live_child, shadow, shadow_child, stats);
    }
}

fn reconcile_node(
    live: &mut Document,
    live_id: NodeId,
    shadow: &Document,
    shadow_id: NodeId,
    stats: &mut PatchStats,
) {
    match (live.kind(live_id), shadow.kind(shadow_id)) {
        (NodeKind::Text, NodeKind::Text) => {
            let new_text = shadow.text(shadow_id).unwrap_or_default();
            if live.text(live_id) != Some(new_text) {
                live.set_text(live_id, new_text);
                stats.texts += 1;
                stats.kinds |= PatchKind::TEXT;
            }
        }
        (NodeKind::Element, NodeKind::Element) => {
            if live.tag(live_id) != shadow.tag(shadow_id) {
                live.replace_with_import(live_id, shadow, shadow_id);
                stats.replaced += 1;
                stats.kinds |= PatchKind::REPLACE;
                return;
            }
            let mut recursed = false;
            if live.is_block_container(live_id)
                && live.inner_markup(live_id) != shadow.inner_markup(shadow_id)
            {
                reconcile_children(live, live_id, shadow, shadow_id, stats);
                recursed = true;
            } else if live.is_form_control(live_id)
                && live.value(live_id) != shadow.value(shadow_id)
            {
                let new_value = shadow.value(shadow_id).to_string();
                live.set_value(live_id, new_value);
                stats.values += 1;
                stats.kinds |= PatchKind::VALUE;
            }
            reconcile_attrs(live, live_id, shadow, shadow_id, stats);
            if !recursed {
                reconcile_children(live, live_id, shadow, shadow_id, stats);
            }
        }
        // Text against element at the same position: the shadow side wins.
        _ => {
            live.replace_with_import(live_id, shadow, shadow_id);
            stats.replaced += 1;
            stats.kinds |= PatchKind::REPLACE;
        }
    }
}

/// Pair attributes positionally; only pairs whose names match are
/// patched. `value` is special: it feeds the live value property (and
/// `checked` for toggle controls) rather than the attribute list, since
/// control value is live state, not just markup.
fn reconcile_attrs(
    live: &mut Document,
    live_id: NodeId,
    shadow: &Document,
    shadow_id: NodeId,
    stats: &mut PatchStats,
) {
    let pairs = live
        .attrs(live_id)
        .iter()
        .zip(shadow.attrs(shadow_id).iter())
        .map(|(l, s)| {
            (
                l.name.clone(),
                l.value.clone(),
                s.name.clone(),
                s.value.clone(),
            )
        })
        .collect::<SmallVec<[(String, String, String, String); 4]>>();

    for (live_name, live_value, shadow_name, shadow_value) in pairs {
        if live_name != shadow_name {
            continue;
        }
        if shadow_name == "value" {
            if live.value(live_id) != shadow_value {
                live.set_value(live_id, shadow_value.as_str());
                stats.values += 1;
                stats.kinds |= PatchKind::VALUE;
            }
            if let Some(kind) = live.control_kind(live_id)
                && kind.is_toggle()
            {
                let want = shadow_value == "true";
                if live.checked(live_id) != want {
                    live.set_checked(live_id, want);
                    stats.checked += 1;
                    stats.kinds |= PatchKind::CHECKED;
                }
            }
        } else if live_value != shadow_value {
            live.set_attr(live_id, &shadow_name, &shadow_value);
            stats.attrs += 1;
            stats.kinds |= PatchKind::ATTR;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tether_dom::parse_fragment;

    fn docs(live: &str, shadow: &str) -> (Document, Document) {
        (parse_fragment(live), parse_fragment(shadow))
    }

    fn find(doc: &Document, tag: &str) -> Option<NodeId> {
        let mut stack = vec![doc.root()];
        while let Some(id) = stack.pop() {
            if doc.tag(id) == Some(tag) {
                return Some(id);
            }
            for &child in doc.children(id).iter().rev() {
                stack.push(child);
            }
        }
        None
    }

    #[test]
    fn identical_trees_patch_nothing() {
        let (mut live, shadow) = docs(
            "<div><p>hi</p><span>x</span></div>",
            "<div><p>hi</p><span>x</span></div>",
        );
        let live_root = live.root();
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert!(stats.is_empty());
    }

    #[test]
    fn text_change_patches_only_that_node() {
        let (mut live, shadow) = docs(
            "<div><p>old</p><span>keep</span></div>",
            "<div><p>new</p><span>keep</span></div>",
        );
        let live_root = live.root();
        let span = find(&live, "span");
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(stats.texts, 1);
        assert_eq!(stats.replaced, 0);
        assert_eq!(stats.kinds, PatchKind::TEXT);
        // Sibling identity survives.
        assert_eq!(find(&live, "span"), span);
        assert_eq!(live.inner_markup(live.root()), shadow.inner_markup(shadow.root()));
    }

    #[test]
    fn tag_mismatch_replaces_wholesale() {
        let (mut live, shadow) = docs("<p>a</p>", "<span>a</span>");
        let live_root = live.root();
        let old = find(&live, "p");
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(stats.replaced, 1);
        assert!(stats.kinds.contains(PatchKind::REPLACE));
        assert_ne!(find(&live, "span"), old);
        assert_eq!(live.inner_markup(live.root()), "<span>a</span>");
    }

    #[test]
    fn attr_change_copies_new_value() {
        let (mut live, shadow) = docs(
            r#"<p class="a">x</p>"#,
            r#"<p class="b">x</p>"#,
        );
        let live_root = live.root();
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(stats.attrs, 1);
        let p = find(&live, "p").unwrap();
        assert_eq!(live.attr(p, "class"), Some("b"));
    }

    #[test]
    fn mismatched_attr_names_are_left_alone() {
        let (mut live, shadow) = docs(
            r#"<p class="a">x</p>"#,
            r#"<p id="a">x</p>"#,
        );
        let live_root = live.root();
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(stats.attrs, 0);
        let p = find(&live, "p").unwrap();
        assert_eq!(live.attr(p, "class"), Some("a"));
        assert_eq!(live.attr(p, "id"), None);
    }

    #[test]
    fn value_attr_feeds_live_value_not_markup() {
        let (mut live, shadow) = docs(
            r#"<input type="text" value="a">"#,
            r#"<input type="text" value="b">"#,
        );
        let live_root = live.root();
        let input = find(&live, "input").unwrap();
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert!(stats.kinds.contains(PatchKind::VALUE));
        assert_eq!(live.value(input), "b");
        // Identity preserved: the input was patched, not replaced.
        assert_eq!(find(&live, "input"), Some(input));
    }

    #[test]
    fn checkbox_checked_follows_literal_true() {
        let (mut live, shadow) = docs(
            r#"<input type="checkbox" value="false">"#,
            r#"<input type="checkbox" value="true">"#,
        );
        let live_root = live.root();
        let input = find(&live, "input").unwrap();
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert!(stats.kinds.contains(PatchKind::CHECKED));
        assert!(live.checked(input));
    }

    #[test]
    fn block_container_recurses_instead_of_replacing() {
        let (mut live, shadow) = docs(
            "<div><p>a</p></div>",
            "<div><p>b</p></div>",
        );
        let live_root = live.root();
        let div = find(&live, "div");
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(stats.replaced, 0);
        assert_eq!(stats.texts, 1);
        assert_eq!(find(&live, "div"), div);
    }

    #[test]
    fn extra_trailing_children_are_left_alone() {
        let (mut live, shadow) = docs(
            "<p>a</p><p>b</p><p>c</p>",
            "<p>a</p><p>B</p>",
        );
        let live_root = live.root();
        let stats = reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(stats.texts, 1);
        assert_eq!(
            live.inner_markup(live.root()),
            "<p>a</p><p>B</p><p>c</p>"
        );
    }

    #[test]
    fn focus_survives_in_place_patch_and_dies_on_replace() {
        let (mut live, shadow) = docs("<p>a</p>", "<p>b</p>");
        let live_root = live.root();
        let p = find(&live, "p").unwrap();
        live.focus(p);
        reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(live.focused(), Some(p));

        let (mut live, shadow) = docs("<p>a</p>", "<span>a</span>");
        let live_root = live.root();
        let p = find(&live, "p").unwrap();
        live.focus(p);
        reconcile(&mut live, live_root, &shadow, shadow.root());
        assert_eq!(live.focused(), None);
    }
}
