//! Host visibility-observation capability.

use std::fmt;
use std::rc::Rc;

use crate::element::ElementId;

/// Identifier of one observation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Options for a new observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserveOptions {
    /// Fraction of the element's area that must be visible. Forwarded to the
    /// host without validation.
    pub threshold: f64,
}

/// One element's visibility as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub element: ElementId,
    /// The host considers the element sufficiently visible for the session's
    /// threshold.
    pub is_visible: bool,
    /// Visible fraction of the element's area.
    pub ratio: f64,
}

/// Receives a batch of visibility changes, in host delivery order.
pub type VisibilityCallback = Rc<dyn Fn(&[VisibilityEntry])>;

/// Reports when elements cross a visibility threshold.
///
/// Sessions are independent: releasing one must not affect any other, even
/// when they watch the same element. Implementations must not hold internal
/// borrows while invoking callbacks, since callbacks call back into
/// [`unobserve`](VisibilityObserver::unobserve).
pub trait VisibilityObserver {
    /// Start watching `element`; `on_change` receives batches for this session.
    fn observe(
        &self,
        element: ElementId,
        options: ObserveOptions,
        on_change: VisibilityCallback,
    ) -> SessionId;

    /// Stop reporting `element` to `session`. Unknown pairs are ignored.
    fn unobserve(&self, session: SessionId, element: ElementId);

    /// Release the whole session. Releasing twice is a no-op.
    fn disconnect(&self, session: SessionId);
}
