#![forbid(unsafe_code)]

//! Headless document tree for tether.
//!
//! This crate plays the role the browser DOM plays for an in-page framework:
//! an arena-backed tree of elements and text nodes with stable identity,
//! a lenient markup parser (the `innerHTML` contract: garbage in, best-effort
//! tree out), a serializer, and the live control state that markup alone does
//! not carry (`value`, `checked`, display override, focus).
//!
//! # Identity
//!
//! Nodes are addressed by [`NodeId`], an index into the owning [`Document`]'s
//! arena. Patching a node in place never changes its id; replacing a node
//! allocates a fresh id and detaches the old one. This is the property the
//! reconciler relies on to keep focus and control state alive across renders.

pub mod builder;
pub mod document;
pub mod event;
pub mod parser;
pub mod serialize;

pub use builder::NodeBuilder;
pub use builder::h;
pub use document::{Attr, ControlKind, Document, NodeId, NodeKind};
pub use event::EventKind;
pub use parser::{parse_fragment, parse_into};
