//! Element identity and host-owned element references.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier of a host element (a DOM node, a scene node, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Generate a new unique element ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot the host fills with the element a component is bound to.
///
/// Clones share the same slot. The host attaches the element once it is
/// mounted and detaches it on removal; scheduled work checks the slot right
/// before acting so that detached elements are skipped.
#[derive(Debug, Clone, Default)]
pub struct ElementRef(Rc<Cell<Option<ElementId>>>);

impl ElementRef {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the slot at a live element.
    pub fn attach(&self, element: ElementId) {
        self.0.set(Some(element));
    }

    /// Clear the slot.
    pub fn detach(&self) {
        self.0.set(None);
    }

    /// The element currently held, if any.
    pub fn current(&self) -> Option<ElementId> {
        self.0.get()
    }

    pub fn is_attached(&self) -> bool {
        self.0.get().is_some()
    }

    pub(crate) fn downgrade(&self) -> WeakElementRef {
        WeakElementRef(Rc::downgrade(&self.0))
    }
}

/// Non-owning view of an [`ElementRef`], held by pending timers.
#[derive(Debug, Clone)]
pub(crate) struct WeakElementRef(Weak<Cell<Option<ElementId>>>);

impl WeakElementRef {
    /// The element, if the slot is still alive and attached.
    pub(crate) fn current(&self) -> Option<ElementId> {
        self.0.upgrade().and_then(|slot| slot.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ids_are_unique() {
        let a = ElementId::new();
        let b = ElementId::new();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
    }

    #[test]
    fn test_clones_share_slot() {
        let slot = ElementRef::new();
        let host_side = slot.clone();
        assert!(!slot.is_attached());

        host_side.attach(ElementId(7));
        assert_eq!(slot.current(), Some(ElementId(7)));

        slot.detach();
        assert_eq!(host_side.current(), None);
    }

    #[test]
    fn test_weak_ref_sees_detach_and_drop() {
        let slot = ElementRef::new();
        slot.attach(ElementId(3));
        let weak = slot.downgrade();
        assert_eq!(weak.current(), Some(ElementId(3)));

        slot.detach();
        assert_eq!(weak.current(), None);

        slot.attach(ElementId(4));
        drop(slot);
        assert_eq!(weak.current(), None);
    }
}
