//! Grid choreography for filterable product listings.
//!
//! `leave` shrinks and fades the current results, `enter` cascades new
//! results in, and `reveal` slides the first page of results up on load.
//! There is no visibility gating: the listing calls these on filter changes.

use std::rc::Rc;

use motion_config::GridConfig;

use crate::animator::{AnimationHandle, Animator};
use crate::descriptor::AnimationDescriptor;
use crate::element::ElementId;
use crate::error::Result;
use crate::library;

/// Durations and offsets for the three grid transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct GridTimings {
    pub leave_ms: f64,
    pub enter_ms: f64,
    pub reveal_ms: f64,
    pub stagger_ms: f64,
    pub leave_scale: f64,
    pub reveal_offset_y: f64,
}

impl Default for GridTimings {
    fn default() -> Self {
        Self::from(&GridConfig::default())
    }
}

impl From<&GridConfig> for GridTimings {
    fn from(config: &GridConfig) -> Self {
        Self {
            leave_ms: config.leave_ms,
            enter_ms: config.enter_ms,
            reveal_ms: config.reveal_ms,
            stagger_ms: config.stagger_ms,
            leave_scale: config.leave_scale,
            reveal_offset_y: config.reveal_offset_y,
        }
    }
}

/// Stateless façade over the animator for grid transitions.
pub struct GridTransitions {
    animator: Rc<dyn Animator>,
    leave: AnimationDescriptor,
    enter: AnimationDescriptor,
    reveal: AnimationDescriptor,
}

impl GridTransitions {
    pub fn new(animator: Rc<dyn Animator>, timings: &GridTimings) -> Self {
        Self {
            animator,
            leave: library::grid_leave(timings),
            enter: library::grid_enter(timings),
            reveal: library::grid_reveal(timings),
        }
    }

    /// Shrink and fade out the current results, all at once.
    pub fn leave(&self, elements: &[ElementId]) -> Result<AnimationHandle> {
        self.animator.animate(elements, &self.leave)
    }

    /// Cascade new results in.
    pub fn enter(&self, elements: &[ElementId]) -> Result<AnimationHandle> {
        self.animator.animate(elements, &self.enter)
    }

    /// Initial page-load reveal.
    pub fn reveal(&self, elements: &[ElementId]) -> Result<AnimationHandle> {
        self.animator.animate(elements, &self.reveal)
    }
}
