#![forbid(unsafe_code)]

//! App context: the explicit handle collaborators receive instead of a
//! process-global registration. Owned by the orchestrator; read-only to
//! everyone else.

use std::time::Duration;

use tether_dom::NodeId;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy)]
pub struct AppContext {
    mount: NodeId,
    dev: bool,
    strict: bool,
    last_render: Option<Duration>,
}

impl AppContext {
    pub(crate) fn new(mount: NodeId, dev: bool, strict: bool) -> Self {
        Self {
            mount,
            dev,
            strict,
            last_render: None,
        }
    }

    #[must_use]
    pub fn version(&self) -> &'static str {
        VERSION
    }

    /// The mount element the app rendered into.
    #[must_use]
    pub fn mount(&self) -> NodeId {
        self.mount
    }

    /// Whether diagnostic render logging is on.
    #[must_use]
    pub fn dev(&self) -> bool {
        self.dev
    }

    /// Whether extra bind-time warnings are on.
    #[must_use]
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Duration of the most recent render cycle, if one has run.
    #[must_use]
    pub fn last_render(&self) -> Option<Duration> {
        self.last_render
    }

    pub(crate) fn record_render(&mut self, took: Duration) {
        self.last_render = Some(took);
    }
}
