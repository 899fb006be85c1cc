use std::rc::Rc;

use anyhow::Result;
use motion_scene::testing::RecordingAnimator;
use motion_scene::{
    AnimationDescriptor, ElementId, HeadlessViewport, MotionContext, ObserverCall, Property, Rect,
    SubscriptionPhase, TriggerOptions, VirtualClock, VisibilityTrigger, library,
};

struct Page {
    viewport: Rc<HeadlessViewport>,
    animator: Rc<RecordingAnimator>,
    ctx: MotionContext,
}

/// 800×600 viewport; elements are placed below the fold by the tests.
fn page() -> Page {
    let viewport = HeadlessViewport::new(800.0, 600.0);
    let animator = Rc::new(RecordingAnimator::new());
    let ctx = MotionContext::new(
        animator.clone(),
        viewport.clone(),
        Rc::new(VirtualClock::new()),
    );
    Page {
        viewport,
        animator,
        ctx,
    }
}

fn below_fold(viewport: &HeadlessViewport, element: ElementId) {
    viewport.set_rect(element, Rect::new(0.0, 1000.0, 800.0, 200.0));
}

fn unobserves(viewport: &HeadlessViewport, element: ElementId) -> usize {
    viewport
        .calls()
        .iter()
        .filter(|c| matches!(c, ObserverCall::Unobserve { element: e, .. } if *e == element))
        .count()
}

#[test]
fn trigger_once_fires_at_most_once_and_releases_in_same_callback() {
    let p = page();
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = p.ctx.bind_visibility_trigger(library::fade_in_up(), TriggerOptions::default());
    trigger.attach(el);
    p.viewport.flush();
    assert_eq!(p.animator.call_count(), 0);

    // into view, out again, back in
    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.call_count(), 1);
    assert_eq!(unobserves(&p.viewport, el), 1);
    assert!(!p.viewport.is_observing(el));

    p.viewport.scroll_to(0.0);
    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.call_count(), 1);
    assert_eq!(trigger.fire_count(), 1);
    assert_eq!(trigger.phase(), Some(SubscriptionPhase::Fired));

    let call = &p.animator.calls()[0];
    assert_eq!(call.targets, vec![el]);
    assert_eq!(call.descriptor.name, "fade-in-up");
}

#[test]
fn repeating_trigger_fires_per_enter_and_keeps_observing() {
    let p = page();
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = p.ctx.bind_visibility_trigger(
        library::glow(),
        TriggerOptions::default().trigger_once(false),
    );
    trigger.attach(el);
    p.viewport.flush();

    for _ in 0..3 {
        p.viewport.scroll_to(700.0);
        // partial scroll within the visible range is not a new enter
        p.viewport.scroll_to(750.0);
        p.viewport.scroll_to(0.0);
    }

    assert_eq!(p.animator.calls_for(el).len(), 3);
    assert_eq!(unobserves(&p.viewport, el), 0);
    assert!(p.viewport.is_observing(el));
    assert_eq!(trigger.fire_count(), 3);
}

#[test]
fn unmount_before_intersection_releases_without_animating() {
    let p = page();
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = p.ctx.bind_visibility_trigger(library::fade_in(), TriggerOptions::default());
    trigger.attach(el);
    drop(trigger);

    assert_eq!(p.viewport.session_count(), 0);
    assert!(matches!(
        p.viewport.calls().last(),
        Some(ObserverCall::Disconnect { .. })
    ));

    // queued initial entry and later scrolls never reach the dropped trigger
    p.viewport.flush();
    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.call_count(), 0);
}

#[test]
fn dispose_after_fire_still_releases_session_once() {
    let p = page();
    let el = ElementId::new();
    p.viewport.set_rect(el, Rect::new(0.0, 0.0, 100.0, 100.0));

    let mut trigger = p.ctx.bind_visibility_trigger(library::scale_in(), TriggerOptions::default());
    trigger.attach(el);
    p.viewport.flush();
    assert_eq!(p.animator.call_count(), 1);

    trigger.dispose();
    trigger.dispose();
    assert_eq!(trigger.phase(), None);

    let calls = p.viewport.calls();
    let kinds: Vec<&str> = calls
        .iter()
        .map(|c| match c {
            ObserverCall::Observe { .. } => "observe",
            ObserverCall::Unobserve { .. } => "unobserve",
            ObserverCall::Disconnect { .. } => "disconnect",
        })
        .collect();
    assert_eq!(kinds, vec!["observe", "unobserve", "disconnect"]);
}

#[test]
fn rebind_with_new_threshold_releases_before_observing_again() {
    let p = page();
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = p.ctx.bind_visibility_trigger(library::fade_in(), TriggerOptions::default());
    trigger.attach(el);
    trigger.rebind(library::fade_in(), TriggerOptions::default().threshold(0.75));

    let calls = p.viewport.calls();
    assert_eq!(calls.len(), 3);
    let first_session = match calls[0] {
        ObserverCall::Observe { session, threshold, .. } => {
            assert_eq!(threshold, 0.1);
            session
        }
        ref other => panic!("expected observe, got {other:?}"),
    };
    assert_eq!(
        calls[1],
        ObserverCall::Disconnect {
            session: first_session
        }
    );
    assert!(matches!(
        calls[2],
        ObserverCall::Observe { threshold, .. } if threshold == 0.75
    ));
    assert_eq!(p.viewport.session_count(), 1);

    // the new threshold is live: 50% visible is not enough any more
    p.viewport.scroll_to(500.0);
    assert_eq!(p.animator.call_count(), 0);
    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.call_count(), 1);
}

#[test]
fn rebind_with_trigger_once_change_recreates_subscription() {
    let p = page();
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = p.ctx.bind_visibility_trigger(library::fade_in(), TriggerOptions::default());
    trigger.attach(el);
    trigger.rebind(library::fade_in(), TriggerOptions::default().trigger_once(false));

    assert_eq!(p.viewport.session_count(), 1);
    assert_eq!(trigger.phase(), Some(SubscriptionPhase::Armed));
    assert!(!trigger.options().trigger_once);
}

#[test]
fn sibling_subscriptions_are_independent() {
    let p = page();
    let a = ElementId::new();
    let b = ElementId::new();
    p.viewport.set_rect(a, Rect::new(0.0, 1000.0, 400.0, 200.0));
    p.viewport.set_rect(b, Rect::new(400.0, 1000.0, 400.0, 200.0));

    let mut first = p.ctx.bind_visibility_trigger(library::fade_in(), TriggerOptions::default());
    let mut second = p.ctx.bind_visibility_trigger(
        library::fade_in(),
        TriggerOptions::default().trigger_once(false),
    );
    first.attach(a);
    second.attach(b);
    p.viewport.flush();

    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.call_count(), 2);
    assert!(!p.viewport.is_observing(a));
    assert!(p.viewport.is_observing(b));

    drop(first);
    p.viewport.scroll_to(0.0);
    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.calls_for(b).len(), 2);
    assert_eq!(p.animator.calls_for(a).len(), 1);
}

#[test]
fn malformed_descriptor_is_logged_not_raised() {
    let p = page();
    let el = ElementId::new();
    p.viewport.set_rect(el, Rect::new(0.0, 0.0, 100.0, 100.0));

    let broken = AnimationDescriptor::new("broken")
        .keyframes(Property::GlowRadius, Vec::<f64>::new())
        .duration_ms(100.0);
    let mut trigger = VisibilityTrigger::bind(&p.ctx, broken, TriggerOptions::default());
    trigger.attach(el);
    p.viewport.flush();

    // the trigger still counts as fired and stops observing
    assert_eq!(p.animator.call_count(), 0);
    assert_eq!(trigger.phase(), Some(SubscriptionPhase::Fired));
    assert!(!p.viewport.is_observing(el));
}

#[test]
fn reveal_defaults_come_from_config() -> Result<()> {
    let config = motion_config::MotionConfig::from_toml_str(
        r#"
        [visibility]
        threshold = 0.5
        trigger_once = false
        "#,
    )?;
    let p = page();
    let ctx = p.ctx.clone().with_config(&config);
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = ctx.bind_reveal(library::fade_in());
    trigger.attach(el);

    assert!(matches!(
        p.viewport.calls()[0],
        ObserverCall::Observe { threshold, .. } if threshold == 0.5
    ));
    assert!(!trigger.options().trigger_once);
    Ok(())
}

#[test]
fn cleared_slot_suppresses_animation() {
    let p = page();
    let el = ElementId::new();
    below_fold(&p.viewport, el);

    let mut trigger = p.ctx.bind_visibility_trigger(library::fade_in_up(), TriggerOptions::default());
    trigger.attach(el);
    p.viewport.flush();

    // host unmounts the element without telling the trigger
    trigger.element_ref().detach();
    p.viewport.scroll_to(700.0);
    assert_eq!(p.animator.call_count(), 0);
    assert_eq!(trigger.fire_count(), 0);

    // the next sync releases the stale session
    trigger.sync();
    assert_eq!(trigger.phase(), None);
    assert_eq!(p.viewport.session_count(), 0);
}

#[test]
fn slot_moved_to_another_element_does_not_animate_the_old_one() {
    let p = page();
    let old = ElementId::new();
    let new = ElementId::new();
    below_fold(&p.viewport, old);
    below_fold(&p.viewport, new);

    let mut trigger = p.ctx.bind_visibility_trigger(library::fade_in(), TriggerOptions::default());
    trigger.attach(old);
    p.viewport.flush();

    trigger.element_ref().attach(new);
    p.viewport.scroll_to(700.0);
    assert!(p.animator.calls_for(old).is_empty());
}

#[test]
fn nan_threshold_keeps_one_observation_across_syncs() {
    let p = page();
    let el = ElementId::new();
    p.viewport.set_rect(el, Rect::new(0.0, 0.0, 100.0, 100.0));

    let mut trigger = p.ctx.bind_visibility_trigger(
        library::fade_in(),
        TriggerOptions::default().threshold(f64::NAN),
    );
    trigger.attach(el);
    p.viewport.flush();
    trigger.sync();
    trigger.sync();

    // a NaN threshold is never met, and unchanged options never resubscribe
    assert_eq!(p.viewport.calls().len(), 1);
    assert_eq!(p.viewport.session_count(), 1);
    assert_eq!(trigger.fire_count(), 0);
    assert_eq!(trigger.phase(), Some(SubscriptionPhase::Armed));
}
