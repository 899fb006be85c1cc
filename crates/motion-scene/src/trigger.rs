//! Visibility-triggered animations.
//!
//! A [`VisibilityTrigger`] binds one element to one descriptor. Once the host
//! reports the element as sufficiently visible the descriptor is played; with
//! `trigger_once` (the default) the element is unobserved right after.
//!
//! Lifecycle of the underlying subscription:
//!
//! ```text
//! sync() with an attached element ─► Armed ─(visible)─► Fired
//!                                      │                  │
//!                  rebind / dispose / drop / detach        │
//!                                      ▼                  ▼
//!                                   Released ◄────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let mut trigger = VisibilityTrigger::bind(&ctx, library::fade_in_up(), TriggerOptions::default());
//! trigger.attach(heading);       // host mounted the element
//! viewport.scroll_to(900.0);     // animation plays once the heading shows up
//! drop(trigger);                 // session released
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use motion_config::VisibilityConfig;
use tracing::{debug, trace, warn};

use crate::animator::Animator;
use crate::context::MotionContext;
use crate::descriptor::AnimationDescriptor;
use crate::element::{ElementId, ElementRef, WeakElementRef};
use crate::visibility::{
    ObserveOptions, SessionId, VisibilityCallback, VisibilityEntry, VisibilityObserver,
};

/// Options for [`VisibilityTrigger::bind`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerOptions {
    /// Fraction of the element that must be visible. Passed to the observer
    /// uninterpreted, even outside [0, 1].
    pub threshold: f64,
    /// Play at most once and stop observing after the first fire.
    pub trigger_once: bool,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            trigger_once: true,
        }
    }
}

impl From<&VisibilityConfig> for TriggerOptions {
    fn from(config: &VisibilityConfig) -> Self {
        Self {
            threshold: config.threshold,
            trigger_once: config.trigger_once,
        }
    }
}

impl TriggerOptions {
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn trigger_once(mut self, trigger_once: bool) -> Self {
        self.trigger_once = trigger_once;
        self
    }
}

/// Where a subscription is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionPhase {
    /// Observing, not fired yet.
    Armed,
    /// Played at least once. Trigger-once subscriptions no longer watch the
    /// element; others keep observing.
    Fired,
    /// Session released.
    Released,
}

#[derive(Debug)]
struct SubscriptionState {
    phase: SubscriptionPhase,
    session: Option<SessionId>,
    /// The element is still registered with the session.
    element_observed: bool,
    /// Last entry said visible; a new fire needs an exit first.
    was_visible: bool,
    fire_count: usize,
}

struct Subscription {
    element: ElementId,
    descriptor: AnimationDescriptor,
    options: TriggerOptions,
    state: Rc<RefCell<SubscriptionState>>,
}

impl Subscription {
    fn matches(
        &self,
        element: ElementId,
        descriptor: &AnimationDescriptor,
        options: &TriggerOptions,
    ) -> bool {
        self.element == element
            && self.descriptor == *descriptor
            && same_options(&self.options, options)
    }

    /// Release the session; later calls do nothing.
    fn release(&self, observer: &dyn VisibilityObserver) {
        let session = {
            let mut state = self.state.borrow_mut();
            if state.phase == SubscriptionPhase::Released {
                return;
            }
            state.phase = SubscriptionPhase::Released;
            state.element_observed = false;
            state.session
        };
        if let Some(session) = session {
            debug!(element = %self.element, %session, "releasing visibility subscription");
            observer.disconnect(session);
        }
    }
}

/// Thresholds compare bitwise so a NaN threshold still matches itself.
fn same_options(a: &TriggerOptions, b: &TriggerOptions) -> bool {
    a.threshold.to_bits() == b.threshold.to_bits() && a.trigger_once == b.trigger_once
}

/// Handles one batch for one subscription.
fn on_visibility(
    entries: &[VisibilityEntry],
    element: ElementId,
    slot: &WeakElementRef,
    descriptor: &AnimationDescriptor,
    trigger_once: bool,
    state: &RefCell<SubscriptionState>,
    animator: &dyn Animator,
    observer: &Weak<dyn VisibilityObserver>,
) {
    for entry in entries.iter().filter(|e| e.element == element) {
        if slot.current() != Some(element) {
            trace!(%element, "visibility entry skipped, element detached");
            return;
        }
        {
            let mut st = state.borrow_mut();
            let armed = match st.phase {
                SubscriptionPhase::Armed => true,
                SubscriptionPhase::Fired => !trigger_once,
                SubscriptionPhase::Released => false,
            };
            if !armed {
                return;
            }
            if !entry.is_visible {
                st.was_visible = false;
                continue;
            }
            if st.was_visible {
                continue;
            }
            st.was_visible = true;
            st.phase = SubscriptionPhase::Fired;
            st.fire_count += 1;
        }

        debug!(%element, name = descriptor.display_name(), ratio = entry.ratio, "visibility trigger fired");
        if let Err(err) = animator.animate(&[element], descriptor) {
            warn!(%element, name = descriptor.display_name(), error = %err, "animation failed to start");
        }

        if trigger_once {
            stop_observing(state, element, observer);
            return;
        }
    }
}

/// Deregister the element after a trigger-once fire. The session itself stays
/// until the trigger is disposed.
fn stop_observing(
    state: &RefCell<SubscriptionState>,
    element: ElementId,
    observer: &Weak<dyn VisibilityObserver>,
) {
    let session = {
        let mut st = state.borrow_mut();
        if !st.element_observed {
            return;
        }
        match st.session {
            Some(session) => {
                st.element_observed = false;
                session
            }
            // fired from inside observe(); subscribe() finishes the job
            None => return,
        }
    };
    if let Some(observer) = observer.upgrade() {
        observer.unobserve(session, element);
    }
}

/// Plays a descriptor when its element becomes visible.
pub struct VisibilityTrigger {
    descriptor: AnimationDescriptor,
    options: TriggerOptions,
    element_ref: ElementRef,
    animator: Rc<dyn Animator>,
    observer: Rc<dyn VisibilityObserver>,
    active: Option<Subscription>,
}

impl std::fmt::Debug for VisibilityTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityTrigger")
            .field("descriptor", &self.descriptor.name)
            .field("options", &self.options)
            .field("element", &self.element_ref.current())
            .field("phase", &self.phase())
            .finish()
    }
}

impl VisibilityTrigger {
    /// Create an unsubscribed trigger. The host fills [`element_ref`]
    /// (or calls [`attach`]) and then [`sync`] registers the observation.
    ///
    /// [`element_ref`]: VisibilityTrigger::element_ref
    /// [`attach`]: VisibilityTrigger::attach
    /// [`sync`]: VisibilityTrigger::sync
    pub fn bind(
        ctx: &MotionContext,
        descriptor: AnimationDescriptor,
        options: TriggerOptions,
    ) -> Self {
        Self {
            descriptor,
            options,
            element_ref: ElementRef::new(),
            animator: ctx.animator(),
            observer: ctx.observer(),
            active: None,
        }
    }

    /// The slot the host attaches the element to.
    pub fn element_ref(&self) -> ElementRef {
        self.element_ref.clone()
    }

    /// Attach `element` and subscribe.
    pub fn attach(&mut self, element: ElementId) {
        self.element_ref.attach(element);
        self.sync();
    }

    /// Detach the element, releasing its subscription.
    pub fn detach(&mut self) {
        self.element_ref.detach();
        self.sync();
    }

    /// Bring the subscription in line with the current element, descriptor
    /// and options.
    ///
    /// Nothing happens if they are unchanged, even after a trigger-once fire.
    /// Otherwise the previous session is released before a new one is
    /// registered.
    pub fn sync(&mut self) {
        let element = self.element_ref.current();
        if let (Some(active), Some(element)) = (&self.active, element) {
            if active.matches(element, &self.descriptor, &self.options) {
                return;
            }
        }

        self.teardown();
        if let Some(element) = element {
            self.subscribe(element);
        }
    }

    /// Swap descriptor and options; changed parameters recreate the
    /// subscription.
    pub fn rebind(&mut self, descriptor: AnimationDescriptor, options: TriggerOptions) {
        self.descriptor = descriptor;
        self.options = options;
        self.sync();
    }

    /// Release the subscription. Safe to call any number of times.
    pub fn dispose(&mut self) {
        self.teardown();
    }

    /// Phase of the current subscription, `None` when unsubscribed.
    pub fn phase(&self) -> Option<SubscriptionPhase> {
        self.active.as_ref().map(|s| s.state.borrow().phase)
    }

    /// How many times the current subscription has played.
    pub fn fire_count(&self) -> usize {
        self.active
            .as_ref()
            .map_or(0, |s| s.state.borrow().fire_count)
    }

    pub fn descriptor(&self) -> &AnimationDescriptor {
        &self.descriptor
    }

    pub fn options(&self) -> TriggerOptions {
        self.options
    }

    fn subscribe(&mut self, element: ElementId) {
        let state = Rc::new(RefCell::new(SubscriptionState {
            phase: SubscriptionPhase::Armed,
            session: None,
            element_observed: true,
            was_visible: false,
            fire_count: 0,
        }));

        let callback: VisibilityCallback = {
            let state = Rc::clone(&state);
            let descriptor = self.descriptor.clone();
            let trigger_once = self.options.trigger_once;
            let animator = Rc::clone(&self.animator);
            let observer = Rc::downgrade(&self.observer);
            let slot = self.element_ref.downgrade();
            Rc::new(move |entries: &[VisibilityEntry]| {
                on_visibility(
                    entries,
                    element,
                    &slot,
                    &descriptor,
                    trigger_once,
                    &state,
                    animator.as_ref(),
                    &observer,
                );
            })
        };

        let session = self.observer.observe(
            element,
            ObserveOptions {
                threshold: self.options.threshold,
            },
            callback,
        );
        debug!(
            %element,
            %session,
            threshold = self.options.threshold,
            trigger_once = self.options.trigger_once,
            "visibility subscription armed"
        );

        let fired_during_observe = {
            let mut st = state.borrow_mut();
            st.session = Some(session);
            st.phase == SubscriptionPhase::Fired && self.options.trigger_once
        };
        if fired_during_observe {
            stop_observing(&state, element, &Rc::downgrade(&self.observer));
        }

        self.active = Some(Subscription {
            element,
            descriptor: self.descriptor.clone(),
            options: self.options,
            state,
        });
    }

    fn teardown(&mut self) {
        if let Some(subscription) = self.active.take() {
            subscription.release(self.observer.as_ref());
        }
    }
}

impl Drop for VisibilityTrigger {
    fn drop(&mut self) {
        self.teardown();
    }
}
