#![forbid(unsafe_code)]

//! Reactive runtime: store, reconciler, render passes, and the update-cycle
//! orchestrator.
//!
//! The flow per committed write is fixed: recompile the template from the
//! snapshot, parse a shadow tree, [`reconcile`] it into the live tree, run
//! the visibility pass, rebuild the binding tables, then fire the watch for
//! the written key. Everything is synchronous and single-threaded; ordering
//! is stack discipline, so re-entrant writes nest complete inner cycles.

pub mod app;
pub mod context;
pub mod error;
pub mod forms;
pub mod reconcile;
pub mod store;
pub mod tables;
pub mod visibility;

pub use app::{App, AppOptions, CycleState};
pub use context::{AppContext, VERSION};
pub use error::ConfigError;
pub use forms::{Bindings, EventBinding, FormBinding, coerce_to_existing, parse_invocation};
pub use reconcile::{PatchKind, PatchStats, reconcile};
pub use store::{Store, WriteOutcome, loosely_eq};
pub use tables::{
    HookFn, IntoWatch, MethodFn, MethodTable, NameRef, WatchFn, WatchHandler, WatchTable,
};
