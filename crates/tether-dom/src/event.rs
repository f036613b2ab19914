#![forbid(unsafe_code)]

//! Event kinds the framework routes to bindings.
//!
//! A headless document has no input devices; events enter through the host
//! (tests, an embedding, an event loop) and are dispatched by name. Only the
//! kinds with a `@` marker attribute are listed here.

/// The event vocabulary of the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Submit,
    Reset,
    Change,
    Input,
    Blur,
    Focus,
}

impl EventKind {
    /// Every kind, in marker-table order.
    pub const ALL: [EventKind; 7] = [
        Self::Click,
        Self::Submit,
        Self::Reset,
        Self::Change,
        Self::Input,
        Self::Blur,
        Self::Focus,
    ];

    /// Lowercase event name (`click`, `submit`, ...).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Reset => "reset",
            Self::Change => "change",
            Self::Input => "input",
            Self::Blur => "blur",
            Self::Focus => "focus",
        }
    }

    /// The marker attribute that binds this event (`@click`, ...).
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Click => "@click",
            Self::Submit => "@submit",
            Self::Reset => "@reset",
            Self::Change => "@change",
            Self::Input => "@input",
            Self::Blur => "@blur",
            Self::Focus => "@focus",
        }
    }

    /// Parse an event name (without the `@`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
