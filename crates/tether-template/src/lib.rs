#![forbid(unsafe_code)]

//! Template compilation for tether.
//!
//! Two concerns live here, both pure over a data snapshot
//! (`serde_json::Value`):
//!
//! - [`path`]: dotted-path resolution (`user.profile.name`) with the
//!   falsy-but-valid rule (`0`, `false`, and `""` resolve; `null` and
//!   missing keys do not).
//! - [`compile`]: the two-pass textual compiler: `{{ expr }}`
//!   interpolation, then `#value="path"` marker expansion. Substitution is
//!   string-level and order-sensitive; no tree is involved.
//!
//! Per-expression failures are isolated: an unresolvable path leaves that
//! one expression untouched and emits a `tracing` warning. The only hard
//! failure is an empty `#value` expression, which is a caller-facing
//! configuration error.

pub mod compile;
pub mod path;

pub use compile::{TemplateError, compile};
pub use path::{display_value, is_falsy, resolve, segments};
