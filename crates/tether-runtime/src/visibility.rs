#![forbid(unsafe_code)]

//! Conditional-visibility pass.
//!
//! Walks the live tree depth-first and applies the display override for
//! every element carrying a `#show` or `#if` marker. Evaluation is eager:
//! children of a hidden element are still visited, and their own markers
//! are evaluated independently.

use serde_json::Value;
use tether_dom::{Document, NodeId};
use tether_template::{is_falsy, resolve};
use tracing::warn;

const MARKERS: [&str; 2] = ["#show", "#if"];

/// Apply show/hide semantics to every marked element under `root`
/// (inclusive).
pub fn apply(doc: &mut Document, root: NodeId, snapshot: &Value) {
    if doc.is_element(root) {
        for marker in MARKERS {
            let Some(expr) = doc.attr(root, marker).map(str::trim).map(String::from) else {
                continue;
            };
            match expr.as_str() {
                "true" => doc.set_hidden(root, false),
                "false" => doc.set_hidden(root, true),
                path => match resolve(snapshot, path) {
                    Some(value) => doc.set_hidden(root, is_falsy(value)),
                    None => warn!(path, marker, "no property named in data"),
                },
            }
        }
    }
    let children = doc.children(root).to_vec();
    for child in children {
        apply(doc, child, snapshot);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
