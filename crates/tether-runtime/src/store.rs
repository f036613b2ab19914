#![forbid(unsafe_code)]

//! The reactive store.
//!
//! # Design
//!
//! The snapshot is a `serde_json::Value` object owned exclusively by the
//! store, and every mutation flows through [`Store::commit`]. That single
//! choke point is what makes deep observability an invariant: there is no
//! write, at any depth, that the orchestrator does not see. (No proxying of
//! nested values is needed because no other mutable access exists.)
//!
//! # Invariants
//!
//! - The root is always a JSON object.
//! - A write whose new value is loosely equal to the old one commits
//!   nothing and reports [`WriteOutcome::Unchanged`].
//! - Intermediate path segments must already exist; the final key may be
//!   new. A write through a missing or primitive intermediate is rejected
//!   with a warning, never an error value.

use serde_json::Value;
use tracing::warn;

use crate::error::ConfigError;
use tether_template::{resolve, segments};

/// Result of a [`Store::commit`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// The value changed; `previous` is the old value (`Null` for a new key).
    Committed { previous: Value },
    /// New value was loosely equal to the old one; nothing happened.
    Unchanged,
    /// The path could not be written (missing intermediate, bad index);
    /// a warning was logged.
    Rejected,
}

pub struct Store {
    root: Value,
}

impl Store {
    /// The root must be a JSON object.
    pub fn new(root: Value) -> Result<Self, ConfigError> {
        if !root.is_object() {
            return Err(ConfigError::NonObjectData);
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn snapshot(&self) -> &Value {
        &self.root
    }

    /// Resolve a dotted path against the snapshot.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve(&self.root, path)
    }

    /// Write `new` at `path`, comparing against the current value first.
    pub fn commit(&mut self, path: &str, new: Value) -> WriteOutcome {
        let segs = segments(path);
        let (last, parents) = match segs.split_last() {
            Some(split) => split,
            None => return WriteOutcome::Rejected,
        };
        if last.is_empty() {
            warn!(path, "empty final segment in write path");
            return WriteOutcome::Rejected;
        }

        let mut current = &mut self.root;
        for seg in parents {
            let next = match current {
                Value::Object(map) => map.get_mut(*seg),
                Value::Array(items) => {
                    seg.parse::<usize>().ok().and_then(|i| items.get_mut(i))
                }
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => {
                    warn!(path, segment = *seg, "no property named in data");
                    return WriteOutcome::Rejected;
                }
            }
        }

        match current {
            Value::Object(map) => {
                if let Some(old) = map.get(*last)
                    && loosely_eq(old, &new)
                {
                    return WriteOutcome::Unchanged;
                }
                let previous = map.insert((*last).to_string(), new).unwrap_or(Value::Null);
                WriteOutcome::Committed { previous }
            }
            Value::Array(items) => match last.parse::<usize>() {
                Ok(i) if i < items.len() => {
                    if loosely_eq(&items[i], &new) {
                        return WriteOutcome::Unchanged;
                    }
                    let previous = std::mem::replace(&mut items[i], new);
                    WriteOutcome::Committed { previous }
                }
                _ => {
                    warn!(path, index = *last, "array index out of range");
                    WriteOutcome::Rejected
                }
            },
            _ => {
                warn!(path, "cannot write through a primitive");
                WriteOutcome::Rejected
            }
        }
    }
}

/// Loose equality: exact `Value` equality, plus numeric cross-representation
/// equality so that `1` and `1.0` count as the same value.
#[must_use]
pub fn loosely_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_non_object_root() {
        assert!(Store::new(json!([1, 2])).is_err());
        assert!(Store::new(json!("x")).is_err());
        assert!(Store::new(json!({})).is_ok());
    }

    #[test]
    fn deep_write_commits_and_reports_previous() {
        let mut store = Store::new(json!({"a": {"b": {"c": 1}}})).unwrap();
        let outcome = store.commit("a.b.c", json!(2));
        assert_eq!(outcome, WriteOutcome::Committed { previous: json!(1) });
        assert_eq!(store.get("a.b.c"), Some(&json!(2)));
    }

    #[test]
    fn equal_write_is_unchanged() {
        let mut store = Store::new(json!({"n": 5})).unwrap();
        assert_eq!(store.commit("n", json!(5)), WriteOutcome::Unchanged);
    }

    #[test]
    fn numeric_cross_representation_is_equal() {
        let mut store = Store::new(json!({"n": 1})).unwrap();
        assert_eq!(store.commit("n", json!(1.0)), WriteOutcome::Unchanged);
    }

    #[test]
    fn new_final_key_is_allowed() {
        let mut store = Store::new(json!({"a": {}})).unwrap();
        let outcome = store.commit("a.b", json!("x"));
        assert_eq!(
            outcome,
            WriteOutcome::Committed { previous: Value::Null }
        );
        assert_eq!(store.get("a.b"), Some(&json!("x")));
    }

    #[test]
    fn missing_intermediate_is_rejected() {
        let mut store = Store::new(json!({"a": {}})).unwrap();
        assert_eq!(store.commit("a.b.c", json!(1)), WriteOutcome::Rejected);
        assert_eq!(store.snapshot(), &json!({"a": {}}));
    }

    #[test]
    fn write_through_primitive_is_rejected() {
        let mut store = Store::new(json!({"a": 3})).unwrap();
        assert_eq!(store.commit("a.b", json!(1)), WriteOutcome::Rejected);
    }

    #[test]
    fn array_index_writes() {
        let mut store = Store::new(json!({"items": [1, 2, 3]})).unwrap();
        assert_eq!(
            store.commit("items.1", json!(9)),
            WriteOutcome::Committed { previous: json!(2) }
        );
        assert_eq!(store.commit("items.5", json!(0)), WriteOutcome::Rejected);
    }

    #[test]
    fn structured_replacement_commits_whole() {
        let mut store = Store::new(json!({"user": {"name": "a"}})).unwrap();
        let outcome = store.commit("user", json!({"name": "b", "age": 1}));
        assert!(matches!(outcome, WriteOutcome::Committed { .. }));
        assert_eq!(store.get("user.age"), Some(&json!(1)));
    }
}
