#![forbid(unsafe_code)]

//! tether: a minimal reactive micro-framework over a headless document tree.
//!
//! Bind a JSON snapshot to a markup template, write through [`App::set`],
//! and the live tree is patched incrementally: recompile, diff, patch,
//! re-run the visibility and form-binding passes. Form controls carry
//! two-way bindings with type coercion on write-back.
//!
//! ```
//! use serde_json::json;
//! use tether::prelude::*;
//!
//! let doc = parse_fragment(r#"<div id="app"><p>{{count}}</p></div>"#);
//! let mut app = App::mount(
//!     doc,
//!     AppOptions::new(json!({"count": 0})).el("#app"),
//! )
//! .unwrap();
//! assert_eq!(app.document().inner_markup(app.mount_node()), "<p>0</p>");
//!
//! app.set("count", 1);
//! assert_eq!(app.document().inner_markup(app.mount_node()), "<p>1</p>");
//! ```
//!
//! The crates underneath are usable on their own: [`dom`] for the arena
//! document and parser, [`template`] for path resolution and compilation,
//! [`runtime`] for the store, reconciler, and orchestrator.

pub use tether_dom as dom;
pub use tether_runtime as runtime;
pub use tether_template as template;

pub use tether_dom::{
    Attr, ControlKind, Document, EventKind, NodeBuilder, NodeId, NodeKind, h, parse_fragment,
    parse_into,
};
pub use tether_runtime::{
    App, AppContext, AppOptions, ConfigError, CycleState, NameRef, PatchKind, PatchStats, Store,
    WatchHandler, WriteOutcome,
};
pub use tether_template::{TemplateError, compile, display_value, is_falsy, resolve, segments};

/// One-stop imports for applications.
pub mod prelude {
    pub use tether_dom::{Document, EventKind, NodeId, h, parse_fragment};
    pub use tether_runtime::{App, AppOptions, ConfigError, WatchHandler};
    pub use tether_template::compile;
}
