#![forbid(unsafe_code)]

//! Method and watch tables.
//!
//! Two explicit, separately addressable tables with no merged namespace:
//! methods are looked up by event bindings, watches fire after a committed
//! write. [`NameRef`] is the capability that answers "is this name a method
//! or a data key" without any string-prefix tricks.
//!
//! Callbacks are stored as `Rc<dyn Fn>` so a table entry can be cloned out
//! before invocation; a callback that writes to the store re-enters the app
//! without aliasing the table it came from.

use std::rc::Rc;

use ahash::AHashMap;
use serde_json::Value;

use crate::app::App;

/// An event-bound method: receives the app and the literal string arguments
/// parsed from the `@event="name(a, b)"` attribute.
pub type MethodFn = Rc<dyn Fn(&mut App, &[String])>;

/// A watch callback: `(app, new, old, container)` where `container` is the
/// mapping the written key lives in.
pub type WatchFn = Rc<dyn Fn(&mut App, &Value, &Value, &Value)>;

/// A lifecycle hook.
pub type HookFn = Rc<dyn Fn(&mut App)>;

/// Wrapper form for a watch entry, for callers that configure watches as
/// `{ handler }` objects rather than bare functions.
pub struct WatchHandler {
    pub handler: WatchFn,
}

/// Normalization seam for watch entries: bare closures and
/// [`WatchHandler`] objects both become a [`WatchFn`].
pub trait IntoWatch {
    fn into_watch(self) -> WatchFn;
}

impl<F> IntoWatch for F
where
    F: Fn(&mut App, &Value, &Value, &Value) + 'static,
{
    fn into_watch(self) -> WatchFn {
        Rc::new(self)
    }
}

impl IntoWatch for WatchHandler {
    fn into_watch(self) -> WatchFn {
        self.handler
    }
}

#[derive(Default)]
pub struct MethodTable {
    entries: AHashMap<String, MethodFn>,
}

impl MethodTable {
    pub fn insert(&mut self, name: impl Into<String>, method: MethodFn) {
        self.entries.insert(name.into(), method);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MethodFn> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Default)]
pub struct WatchTable {
    entries: AHashMap<String, WatchFn>,
}

impl WatchTable {
    pub fn insert(&mut self, name: impl Into<String>, watch: WatchFn) {
        self.entries.insert(name.into(), watch);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WatchFn> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

/// What a bare name refers to on the app surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NameRef<'a> {
    /// A method table entry.
    Method,
    /// A top-level data key, with its current value.
    Data(&'a Value),
    /// Neither.
    Absent,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_watch_forms_normalize() {
        let mut table = WatchTable::default();
        table.insert(
            "plain",
            (|_: &mut App, _: &Value, _: &Value, _: &Value| {}).into_watch(),
        );
        table.insert(
            "wrapped",
            WatchHandler {
                handler: Rc::new(|_: &mut App, _: &Value, _: &Value, _: &Value| {}),
            }
            .into_watch(),
        );
        assert!(table.contains("plain"));
        assert!(table.contains("wrapped"));
        assert!(!table.contains("other"));
    }

    #[test]
    fn method_table_lookup() {
        let mut table = MethodTable::default();
        assert!(table.is_empty());
        table.insert("save", Rc::new(|_: &mut App, _: &[String]| {}));
        assert_eq!(table.len(), 1);
        assert!(table.get("save").is_some());
        assert!(table.get("load").is_none());
    }
}
