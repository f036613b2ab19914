#![forbid(unsafe_code)]

//! Runtime error types.
//!
//! Only construction-time misconfiguration is fatal. Everything that can go
//! wrong inside an update cycle (unresolvable paths, missing methods,
//! unserializable values) is isolated to the one binding that caused it and
//! logged through `tracing`, never surfaced as an error value.

use thiserror::Error;

/// Fatal configuration errors, surfaced from [`crate::App::mount`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The data root was not a JSON object.
    #[error("data root must be an object")]
    NonObjectData,

    /// No mount selector was supplied in the options.
    #[error("no mount selector provided")]
    MissingMountSelector,

    /// The mount selector matched nothing in the host document.
    #[error("mount element not found for selector `{selector}`")]
    MountNotFound { selector: String },

    /// A marker attribute that demands an expression carried none.
    #[error("no expression provided for {marker}")]
    EmptyExpression { marker: String },
}

impl ConfigError {
    pub(crate) fn mount_not_found(selector: &str) -> Self {
        Self::MountNotFound {
            selector: selector.to_string(),
        }
    }

    pub(crate) fn empty_expression(marker: &str) -> Self {
        Self::EmptyExpression {
            marker: marker.to_string(),
        }
    }
}

impl From<tether_template::TemplateError> for ConfigError {
    fn from(err: tether_template::TemplateError) -> Self {
        match err {
            tether_template::TemplateError::EmptyExpression { marker } => {
                Self::empty_expression(marker)
            }
        }
    }
}
