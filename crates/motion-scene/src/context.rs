//! Shared capabilities and defaults handed to every component.

use std::rc::Rc;

use motion_config::MotionConfig;

use crate::animator::Animator;
use crate::descriptor::AnimationDescriptor;
use crate::grid::{GridTimings, GridTransitions};
use crate::scheduler::Scheduler;
use crate::sequence::SequencePlayer;
use crate::trigger::{TriggerOptions, VisibilityTrigger};
use crate::visibility::VisibilityObserver;

/// Caller-facing entry point: bundles the animator, visibility observer and
/// scheduler with the configured defaults.
///
/// Cloning is cheap; clones share the same capabilities.
#[derive(Clone)]
pub struct MotionContext {
    animator: Rc<dyn Animator>,
    observer: Rc<dyn VisibilityObserver>,
    scheduler: Rc<dyn Scheduler>,
    trigger_defaults: TriggerOptions,
    step_spacing_ms: f64,
    grid: GridTimings,
}

impl std::fmt::Debug for MotionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionContext")
            .field("trigger_defaults", &self.trigger_defaults)
            .field("step_spacing_ms", &self.step_spacing_ms)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

impl MotionContext {
    /// Context with built-in defaults (threshold 0.1, trigger once, 100 ms
    /// step spacing, stock grid timings).
    pub fn new(
        animator: Rc<dyn Animator>,
        observer: Rc<dyn VisibilityObserver>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        Self {
            animator,
            observer,
            scheduler,
            trigger_defaults: TriggerOptions::default(),
            step_spacing_ms: 100.0,
            grid: GridTimings::default(),
        }
    }

    /// Take defaults from loaded configuration.
    pub fn with_config(mut self, config: &MotionConfig) -> Self {
        self.trigger_defaults = TriggerOptions::from(&config.visibility);
        self.step_spacing_ms = config.sequence.step_spacing_ms;
        self.grid = GridTimings::from(&config.grid);
        self
    }

    pub fn animator(&self) -> Rc<dyn Animator> {
        Rc::clone(&self.animator)
    }

    pub fn observer(&self) -> Rc<dyn VisibilityObserver> {
        Rc::clone(&self.observer)
    }

    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        Rc::clone(&self.scheduler)
    }

    pub fn trigger_defaults(&self) -> TriggerOptions {
        self.trigger_defaults
    }

    pub fn step_spacing_ms(&self) -> f64 {
        self.step_spacing_ms
    }

    pub fn grid_timings(&self) -> &GridTimings {
        &self.grid
    }

    /// Visibility trigger with explicit options.
    pub fn bind_visibility_trigger(
        &self,
        descriptor: AnimationDescriptor,
        options: TriggerOptions,
    ) -> VisibilityTrigger {
        VisibilityTrigger::bind(self, descriptor, options)
    }

    /// Visibility trigger using the configured defaults.
    pub fn bind_reveal(&self, descriptor: AnimationDescriptor) -> VisibilityTrigger {
        VisibilityTrigger::bind(self, descriptor, self.trigger_defaults)
    }

    pub fn bind_sequence_player(&self) -> SequencePlayer {
        SequencePlayer::bind(self)
    }

    pub fn grid(&self) -> GridTransitions {
        GridTransitions::new(self.animator(), &self.grid)
    }
}
