//! The external animation primitive.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::descriptor::AnimationDescriptor;
use crate::element::ElementId;
use crate::error::Result;

/// Handle to an animation started by an [`Animator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnimationHandle(pub u64);

impl AnimationHandle {
    /// Generate a new unique handle.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for AnimationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "anim-{}", self.0)
    }
}

/// Plays a descriptor against one element or a collection.
///
/// `targets` is ordered; index `i` receives `descriptor.delay_for(i)`.
/// Implementations take `&self` and keep their own interior state, since the
/// scheduler shares one animator across triggers, players and timers.
pub trait Animator {
    /// Start the animation.
    ///
    /// Errors describe descriptors the animator cannot play; callers either
    /// return them unchanged or log and drop them.
    fn animate(&self, targets: &[ElementId], descriptor: &AnimationDescriptor)
    -> Result<AnimationHandle>;
}
