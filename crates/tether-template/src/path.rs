#![forbid(unsafe_code)]

//! Dotted-path resolution over a data snapshot.
//!
//! # Resolution policy
//!
//! Walking `a.b.c` descends one segment at a time. A segment resolves when
//! the container has that member and the member is not `null`; the values
//! `0`, `false`, and `""` are ordinary resolved values, not misses. Arrays
//! accept numeric segments (`items.0`). Descending *through* a primitive
//! fails: `a.b` is missing when `a` is a number.
//!
//! Resolution never errors: callers decide whether a miss is a logged
//! warning (bindings) or a hard failure (empty expressions, handled before
//! resolution is ever attempted).

use serde_json::Value;
use smallvec::SmallVec;

/// Split a dotted path into segments. `"a.b.c"` → `["a", "b", "c"]`.
/// Empty segments are preserved (and will fail resolution), matching the
/// textual split the markup surface implies.
#[must_use]
pub fn segments(path: &str) -> SmallVec<[&str; 4]> {
    path.split('.').collect()
}

/// Resolve a dotted path against a snapshot. `None` means some segment was
/// missing, `null`, or addressed through a primitive.
#[must_use]
pub fn resolve<'v>(snapshot: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = snapshot;
    for segment in segments(path) {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }?;
        if next.is_null() {
            return None;
        }
        current = next;
    }
    Some(current)
}

/// Host-language truthiness: `null`, `false`, `0`, and `""` are falsy;
/// every other value (including empty objects and arrays) is truthy.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a resolved value for substitution into markup. Strings pass
/// through unquoted; structured values serialize to compact JSON.
pub fn display_value(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
