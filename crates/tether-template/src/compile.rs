#![forbid(unsafe_code)]

//! The two-pass textual template compiler.
//!
//! Pass 1 substitutes `{{ expr }}` interpolations; pass 2 expands
//! `#value="path"` markers into the marker plus a literal `value="..."`
//! attribute, so the parsed tree carries the current value as real markup
//! for the reconciler to diff. Order matters: interpolation may produce the
//! very text pass 2 consumes.
//!
//! # Failure isolation
//!
//! Unresolvable paths and unserializable values leave their single
//! expression untouched and log a warning; the rest of the template still
//! compiles. The one fatal case is an empty `#value` expression: a marker
//! that demands an expression and has none is a configuration error, not a
//! data problem.

use std::fmt::Write;

use memchr::memchr;
use memchr::memmem;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::path::{display_value, resolve};

/// Fatal template errors, surfaced at mount time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("no expression provided for {marker}")]
    EmptyExpression { marker: &'static str },
}

/// Compile a template source against a snapshot, producing markup ready to
/// parse into the shadow tree.
pub fn compile(template: &str, snapshot: &Value) -> Result<String, TemplateError> {
    let interpolated = interpolate(template, snapshot);
    expand_value_markers(&interpolated, snapshot)
}

/// Pass 1: `{{ expr }}` interpolation.
///
/// An empty expression, an unresolvable path, or a serialization failure
/// leaves the braces in place (the template's author sees their marker, not
/// a hole).
fn interpolate(template: &str, snapshot: &Value) -> String {
    let open = memmem::Finder::new("{{");
    let close = memmem::Finder::new("}}");
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = open.find(rest.as_bytes()) {
        let Some(len) = close.find(&rest.as_bytes()[start + 2..]) else {
            break; // unterminated: emit the tail verbatim
        };
        let end = start + 2 + len;
        out.push_str(&rest[..start]);
        let raw = &rest[start..end + 2];
        let expr = rest[start + 2..end].trim();
        if expr.is_empty() {
            out.push_str(raw);
        } else {
            match resolve(snapshot, expr) {
                Some(value) => match display_value(value) {
                    Ok(text) => out.push_str(&text),
                    Err(error) => {
                        warn!(path = expr, %error, "cannot stringify value for interpolation");
                        out.push_str(raw);
                    }
                },
                None => {
                    warn!(path = expr, "no property named in data");
                    out.push_str(raw);
                }
            }
        }
        rest = &rest[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Pass 2: rewrite `#value="path"` into `#value="path" value="<resolved>"`.
///
/// A resolved empty string leaves the marker unexpanded (there is nothing
/// to seed); misses warn and leave it as-is.
fn expand_value_markers(template: &str, snapshot: &Value) -> Result<String, TemplateError> {
    const MARKER: &str = "#value=\"";
    let finder = memmem::Finder::new(MARKER);
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = finder.find(rest.as_bytes()) {
        let expr_start = start + MARKER.len();
        let Some(len) = memchr(b'"', &rest.as_bytes()[expr_start..]) else {
            break; // unterminated: emit the tail verbatim
        };
        let expr = rest[expr_start..expr_start + len].trim();
        if expr.is_empty() {
            return Err(TemplateError::EmptyExpression { marker: "#value" });
        }
        let raw = &rest[start..expr_start + len + 1];
        out.push_str(&rest[..start]);
        match resolve(snapshot, expr) {
            Some(value) if !matches!(value, Value::String(s) if s.is_empty()) => {
                match display_value(value) {
                    Ok(text) => {
                        let _ = write!(out, "#value=\"{expr}\" value=\"{text}\"");
                    }
                    Err(error) => {
                        warn!(path = expr, %error, "cannot stringify value for binding");
                        out.push_str(raw);
                    }
                }
            }
            Some(_) => out.push_str(raw), // empty string: nothing to seed
            None => {
                warn!(path = expr, "no property named in data");
                out.push_str(raw);
            }
        }
        rest = &rest[expr_start + len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
