//! Multi-step sequences against one element.
//!
//! Step `i` starts `i * spacing` after [`play`](SequencePlayer::play), where
//! `spacing` is the step descriptor's fixed delay or the player's default
//! (100 ms unless configured). Each step runs on its own timer, so steps keep
//! their order only as far as the host's timers do.
//!
//! Calling `play` again while steps are pending starts a second, overlapping
//! run; nothing is queued or serialized.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::animator::Animator;
use crate::context::MotionContext;
use crate::descriptor::AnimationDescriptor;
use crate::element::ElementRef;
use crate::scheduler::{Scheduler, TimerId};

/// Plays ordered descriptor lists against a bound element.
pub struct SequencePlayer {
    element_ref: ElementRef,
    animator: Rc<dyn Animator>,
    scheduler: Rc<dyn Scheduler>,
    step_spacing_ms: f64,
    pending: Rc<RefCell<Vec<TimerId>>>,
}

impl std::fmt::Debug for SequencePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequencePlayer")
            .field("element", &self.element_ref.current())
            .field("step_spacing_ms", &self.step_spacing_ms)
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl SequencePlayer {
    pub fn bind(ctx: &MotionContext) -> Self {
        Self {
            element_ref: ElementRef::new(),
            animator: ctx.animator(),
            scheduler: ctx.scheduler(),
            step_spacing_ms: ctx.step_spacing_ms(),
            pending: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Override the spacing used by steps without a fixed delay.
    pub fn with_step_spacing(mut self, spacing_ms: f64) -> Self {
        self.step_spacing_ms = spacing_ms;
        self
    }

    /// The slot the host attaches the element to.
    pub fn element_ref(&self) -> ElementRef {
        self.element_ref.clone()
    }

    /// Start delay of `step` at position `index`.
    pub fn step_delay(&self, index: usize, step: &AnimationDescriptor) -> f64 {
        let spacing = step
            .delay
            .and_then(|delay| delay.as_fixed())
            .unwrap_or(self.step_spacing_ms);
        index as f64 * spacing
    }

    /// Schedule every step of `sequence`.
    ///
    /// Each step checks the element slot when its timer fires and silently
    /// skips if nothing is attached. Animator errors are logged and dropped.
    pub fn play(&self, sequence: &[AnimationDescriptor]) {
        for (index, step) in sequence.iter().enumerate() {
            let delay = self.step_delay(index, step);
            let timer_slot = Rc::new(Cell::new(None::<TimerId>));

            let task = {
                let timer_slot = Rc::clone(&timer_slot);
                let pending = Rc::downgrade(&self.pending);
                let element = self.element_ref.downgrade();
                let animator = Rc::clone(&self.animator);
                let step = step.clone();
                Box::new(move || {
                    if let (Some(pending), Some(timer)) = (pending.upgrade(), timer_slot.get()) {
                        pending.borrow_mut().retain(|t| *t != timer);
                    }
                    let Some(element) = element.current() else {
                        trace!(index, name = step.display_name(), "sequence step skipped, element detached");
                        return;
                    };
                    if let Err(err) = animator.animate(&[element], &step) {
                        debug!(%element, index, name = step.display_name(), error = %err, "sequence step failed");
                    }
                })
            };

            let timer = self.scheduler.schedule(delay, task);
            timer_slot.set(Some(timer));
            self.pending.borrow_mut().push(timer);
        }
    }

    /// Steps scheduled but not yet fired.
    pub fn pending_steps(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Detach the element and cancel every pending step.
    pub fn unbind(&self) {
        self.element_ref.detach();
        let timers: Vec<TimerId> = self.pending.borrow_mut().drain(..).collect();
        if !timers.is_empty() {
            debug!(cancelled = timers.len(), "sequence player unbound");
        }
        for timer in timers {
            self.scheduler.cancel(timer);
        }
    }
}

impl Drop for SequencePlayer {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Property;
    use crate::element::ElementId;
    use crate::scheduler::VirtualClock;
    use crate::testing::RecordingAnimator;
    use crate::viewport::HeadlessViewport;

    fn setup() -> (VirtualClock, Rc<RecordingAnimator>, MotionContext) {
        let clock = VirtualClock::new();
        let animator = Rc::new(RecordingAnimator::with_clock(clock.clone()));
        let ctx = MotionContext::new(
            animator.clone(),
            HeadlessViewport::new(100.0, 100.0),
            Rc::new(clock.clone()),
        );
        (clock, animator, ctx)
    }

    fn step(name: &str) -> AnimationDescriptor {
        AnimationDescriptor::new(name)
            .from_to(Property::Opacity, 0.0, 1.0)
            .duration_ms(200.0)
    }

    #[test]
    fn test_step_delay_prefers_fixed_delay() {
        let (_, _, ctx) = setup();
        let player = SequencePlayer::bind(&ctx);
        assert_eq!(player.step_delay(2, &step("a")), 200.0);
        assert_eq!(player.step_delay(2, &step("a").delay_ms(40.0)), 80.0);
        assert_eq!(
            player.step_delay(3, &step("a").stagger(crate::stagger::stagger(10.0))),
            300.0
        );
    }

    #[test]
    fn test_pending_steps_drain_as_they_fire() {
        let (clock, animator, ctx) = setup();
        let player = SequencePlayer::bind(&ctx);
        player.element_ref().attach(ElementId(1));
        player.play(&[step("a"), step("b"), step("c")]);
        assert_eq!(player.pending_steps(), 3);

        clock.advance(100.0);
        assert_eq!(player.pending_steps(), 1);
        assert_eq!(animator.call_count(), 2);
    }

    #[test]
    fn test_unbind_cancels_timers() {
        let (clock, animator, ctx) = setup();
        let player = SequencePlayer::bind(&ctx);
        player.element_ref().attach(ElementId(2));
        player.play(&[step("a"), step("b")]);
        clock.advance(0.0);

        player.unbind();
        assert_eq!(player.pending_steps(), 0);
        assert_eq!(clock.pending(), 0);
        clock.advance(1_000.0);
        assert_eq!(animator.call_count(), 1);
    }

    #[test]
    fn test_drop_cancels_timers() {
        let (clock, animator, ctx) = setup();
        {
            let player = SequencePlayer::bind(&ctx);
            player.element_ref().attach(ElementId(3));
            player.play(&[step("a"), step("b")]);
        }
        assert_eq!(clock.pending(), 0);
        clock.advance(1_000.0);
        assert_eq!(animator.call_count(), 0);
    }
}
