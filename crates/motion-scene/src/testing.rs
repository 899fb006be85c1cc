//! Test doubles for driving the scheduler without a real animator.

use std::cell::RefCell;

use crate::animator::{AnimationHandle, Animator};
use crate::descriptor::AnimationDescriptor;
use crate::element::ElementId;
use crate::error::{AnimationError, Result};
use crate::scheduler::VirtualClock;

/// One recorded `animate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimateCall {
    /// Clock time of the call; 0 without a clock.
    pub at_ms: f64,
    pub targets: Vec<ElementId>,
    pub descriptor: AnimationDescriptor,
    pub handle: AnimationHandle,
}

/// [`Animator`] that records every call instead of animating.
///
/// Descriptors are validated like a real animator would; `fail_with` makes
/// every later call fail.
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    clock: Option<VirtualClock>,
    calls: RefCell<Vec<AnimateCall>>,
    failure: RefCell<Option<String>>,
}

impl RecordingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp calls with `clock`'s current time.
    pub fn with_clock(clock: VirtualClock) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    /// Fail every following call with a malformed-descriptor error.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.borrow_mut() = Some(reason.into());
    }

    pub fn calls(&self) -> Vec<AnimateCall> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Calls whose targets include `element`.
    pub fn calls_for(&self, element: ElementId) -> Vec<AnimateCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.targets.contains(&element))
            .cloned()
            .collect()
    }

    /// Descriptor names in call order.
    pub fn names(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|call| call.descriptor.name.clone())
            .collect()
    }
}

impl Animator for RecordingAnimator {
    fn animate(
        &self,
        targets: &[ElementId],
        descriptor: &AnimationDescriptor,
    ) -> Result<AnimationHandle> {
        if let Some(reason) = self.failure.borrow().clone() {
            return Err(AnimationError::MalformedDescriptor(reason));
        }
        descriptor.validate()?;

        let handle = AnimationHandle::new();
        self.calls.borrow_mut().push(AnimateCall {
            at_ms: self.clock.as_ref().map_or(0.0, VirtualClock::now_ms),
            targets: targets.to_vec(),
            descriptor: descriptor.clone(),
            handle,
        });
        Ok(handle)
    }
}
