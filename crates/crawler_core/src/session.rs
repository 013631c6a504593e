use std::fmt;

use thiserror::Error;

/// Navigation and query capability of a live browser session.
///
/// Handles returned by one call are only valid until the next navigation of
/// the context they came from; callers re-query instead of caching them. The
/// session keeps one *active* context that every query and input goes to.
pub trait BrowserSession {
    type Link;
    type Element;
    type Context: Clone + PartialEq + fmt::Debug;

    fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    /// Markup of the active context as currently rendered.
    fn current_markup(&mut self) -> Result<String, SessionError>;

    /// Links whose visible text equals `text`, in document order.
    fn query_by_link_text(&mut self, text: &str) -> Result<Vec<Self::Link>, SessionError>;

    /// Elements whose `class` attribute equals one of `classes` exactly, in document order.
    fn query_by_class_exact(&mut self, classes: &[&str])
        -> Result<Vec<Self::Element>, SessionError>;

    fn element_text(&mut self, element: &Self::Element) -> Result<String, SessionError>;

    /// Activate `link` with `modifier` + Enter so it opens in a new context.
    fn open_in_new_context(
        &mut self,
        link: &Self::Link,
        modifier: OpenModifier,
    ) -> Result<(), SessionError>;

    /// Open contexts in creation order; the first one is the origin.
    fn list_contexts(&mut self) -> Result<Vec<Self::Context>, SessionError>;

    fn set_active_context(&mut self, context: &Self::Context) -> Result<(), SessionError>;

    fn close_active_context(&mut self) -> Result<(), SessionError>;
}

/// Keyboard modifier that turns Enter on a link into "open in new tab".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenModifier {
    Command,
    Control,
}

impl OpenModifier {
    pub fn for_host() -> Self {
        Self::for_os(std::env::consts::OS)
    }

    pub fn for_os(os: &str) -> Self {
        if os == "macos" {
            OpenModifier::Command
        } else {
            OpenModifier::Control
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFailureKind {
    Launch,
    Navigation,
    Query,
    Input,
    ContextNotFound,
    StaleElement,
}

impl fmt::Display for SessionFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionFailureKind::Launch => write!(f, "browser launch failed"),
            SessionFailureKind::Navigation => write!(f, "navigation failed"),
            SessionFailureKind::Query => write!(f, "query failed"),
            SessionFailureKind::Input => write!(f, "input failed"),
            SessionFailureKind::ContextNotFound => write!(f, "browsing context not found"),
            SessionFailureKind::StaleElement => write!(f, "stale element"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct SessionError {
    pub kind: SessionFailureKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: SessionFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
