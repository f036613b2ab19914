#![forbid(unsafe_code)]

//! Form-binding pass.
//!
//! # Design
//!
//! Bindings are not persisted structures with their own lifecycle: every
//! cycle walks the freshly patched live tree and derives two flat tables,
//! one for `#value` controls and one for `@event` invocations. The app's
//! event entry points consult the current tables, so a node the reconciler
//! replaced mid-cycle simply stops matching and its replacement is picked
//! up on the same walk.
//!
//! Seeding also happens here: text-like controls take their displayed value
//! from the resolved path, toggle controls take `checked` from the resolved
//! value's truthiness (or from a literal `"true"`/`"false"` marker).

use serde_json::Value;
use tether_dom::{ControlKind, Document, EventKind, NodeId};
use tether_template::{display_value, is_falsy, resolve};
use tracing::warn;

/// A `#value` binding: control node, dotted path, control class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormBinding {
    pub node: NodeId,
    pub path: String,
    pub kind: ControlKind,
}

/// An `@event="method(args)"` binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub node: NodeId,
    pub event: EventKind,
    pub method: String,
    pub args: Vec<String>,
}

/// The two binding tables derived from one walk of the live tree.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub forms: Vec<FormBinding>,
    pub events: Vec<EventBinding>,
}

/// Walk the subtree under `root` (inclusive), seed control state from the
/// snapshot, and collect both binding tables.
pub fn collect(doc: &mut Document, root: NodeId, snapshot: &Value) -> Bindings {
    let mut bindings = Bindings::default();
    visit(doc, root, snapshot, &mut bindings);
    bindings
}

fn visit(doc: &mut Document, id: NodeId, snapshot: &Value, bindings: &mut Bindings) {
    if doc.is_element(id) {
        bind_control(doc, id, snapshot, bindings);
        bind_events(doc, id, bindings);
    }
    let children = doc.children(id).to_vec();
    for child in children {
        visit(doc, child, snapshot, bindings);
    }
}

fn bind_control(doc: &mut Document, id: NodeId, snapshot: &Value, bindings: &mut Bindings) {
    let Some(kind) = doc.control_kind(id) else {
        return;
    };
    let Some(expr) = doc.attr(id, "#value").map(str::trim).map(String::from) else {
        return;
    };
    if kind.is_toggle() {
        match expr.as_str() {
            "true" => doc.set_checked(id, true),
            "false" => doc.set_checked(id, false),
            path => match resolve(snapshot, path) {
                Some(value) => doc.set_checked(id, !is_falsy(value)),
                None => warn!(path, "no property named in data"),
            },
        }
    } else {
        match resolve(snapshot, &expr) {
            Some(value) => match display_value(value) {
                Ok(text) => doc.set_value(id, text),
                Err(error) => warn!(path = expr.as_str(), %error, "cannot stringify value for binding"),
            },
            None => warn!(path = expr.as_str(), "no property named in data"),
        }
    }
    bindings.forms.push(FormBinding {
        node: id,
        path: expr,
        kind,
    });
}

fn bind_events(doc: &Document, id: NodeId, bindings: &mut Bindings) {
    for attr in doc.attrs(id) {
        let Some(name) = attr.name.strip_prefix('@') else {
            continue;
        };
        let Some(event) = EventKind::from_name(name) else {
            warn!(event = name, "unknown event name in binding");
            continue;
        };
        let (method, args) = parse_invocation(&attr.value);
        if method.is_empty() {
            continue;
        }
        bindings.events.push(EventBinding {
            node: id,
            event,
            method,
            args,
        });
    }
}

/// Parse `name`, `name()`, or `name(a, 'b', "c")`. Arguments are literal
/// strings only; surrounding quotes are stripped, nothing is evaluated.
#[must_use]
pub fn parse_invocation(src: &str) -> (String, Vec<String>) {
    let src = src.trim();
    let Some(open) = src.find('(') else {
        return (src.to_string(), Vec::new());
    };
    let name = src[..open].trim().to_string();
    let inner = match src.rfind(')') {
        Some(close) if close > open => &src[open + 1..close],
        _ => &src[open + 1..],
    };
    if inner.trim().is_empty() {
        return (name, Vec::new());
    }
    let args = inner
        .split(',')
        .map(|arg| strip_quotes(arg.trim()).to_string())
        .collect();
    (name, args)
}

fn strip_quotes(arg: &str) -> &str {
    let bytes = arg.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &arg[1..arg.len() - 1];
        }
    }
    arg
}

/// Coerce raw input text to the type already stored at the target path:
/// numbers parse as numbers, booleans as booleans, everything else stays a
/// string. Unparseable numeric input falls back to the raw string.
#[must_use]
pub fn coerce_to_existing(existing: Option<&Value>, raw: &str) -> Value {
    match existing {
        Some(Value::Number(_)) => {
            if let Ok(n) = raw.parse::<i64>() {
                Value::from(n)
            } else if let Ok(f) = raw.parse::<f64>()
                && f.is_finite()
            {
                Value::from(f)
            } else {
                Value::String(raw.to_string())
            }
        }
        Some(Value::Bool(_)) => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
