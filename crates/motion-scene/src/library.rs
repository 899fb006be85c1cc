//! Named, reusable descriptors for the storefront.
//!
//! Everything here is a pure constructor except [`start_breathing`] and
//! [`start_floating`], which immediately hand an infinite loop to the
//! animator. The returned handle is the caller's to keep; the library does
//! not track running loops.

use crate::animator::{AnimationHandle, Animator};
use crate::descriptor::{AnimationDescriptor, Direction, Looping, Property};
use crate::easing::Easing;
use crate::element::ElementId;
use crate::error::Result;
use crate::grid::GridTimings;
use crate::stagger::stagger;

/// `cubic-bezier(0.34, 1.56, 0.64, 1)`: slight overshoot.
const EASE_OUT_BACK: Easing = Easing::CubicBezier {
    x1: 0.34,
    y1: 1.56,
    x2: 0.64,
    y2: 1.0,
};

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &[
    "fade-in",
    "fade-in-up",
    "stagger-children",
    "scale-in",
    "glow",
    "breathe",
    "float",
];

/// Plain opacity fade.
pub fn fade_in() -> AnimationDescriptor {
    AnimationDescriptor::new("fade-in")
        .from_to(Property::Opacity, 0.0, 1.0)
        .duration_ms(600.0)
        .easing(Easing::EaseOutQuart)
}

/// Fade while rising 40 px; section headings and copy blocks.
pub fn fade_in_up() -> AnimationDescriptor {
    AnimationDescriptor::new("fade-in-up")
        .from_to(Property::Opacity, 0.0, 1.0)
        .from_to(Property::TranslateY, 40.0, 0.0)
        .duration_ms(800.0)
        .easing(Easing::EaseOutQuart)
}

/// Cascade for a list of children, 100 ms apart.
pub fn stagger_children() -> AnimationDescriptor {
    AnimationDescriptor::new("stagger-children")
        .from_to(Property::Opacity, 0.0, 1.0)
        .from_to(Property::TranslateY, 20.0, 0.0)
        .duration_ms(600.0)
        .easing(Easing::EaseOutQuart)
        .stagger(stagger(100.0))
}

pub fn scale_in() -> AnimationDescriptor {
    AnimationDescriptor::new("scale-in")
        .from_to(Property::Opacity, 0.0, 1.0)
        .from_to(Property::Scale, 0.8, 1.0)
        .duration_ms(500.0)
        .easing(EASE_OUT_BACK)
}

/// One pulse of the call-to-action glow.
pub fn glow() -> AnimationDescriptor {
    AnimationDescriptor::new("glow")
        .keyframes(Property::GlowRadius, [0.0, 20.0, 0.0])
        .keyframes(Property::GlowOpacity, [0.0, 0.6, 0.0])
        .duration_ms(2000.0)
        .easing(Easing::EaseInOutSine)
}

/// Endless gentle scale pulse.
pub fn breathe() -> AnimationDescriptor {
    AnimationDescriptor::new("breathe")
        .from_to(Property::Scale, 1.0, 1.05)
        .duration_ms(2000.0)
        .easing(Easing::EaseInOutSine)
        .looping(Looping::Infinite)
        .direction(Direction::Alternate)
}

/// Endless 10 px bob.
pub fn float() -> AnimationDescriptor {
    AnimationDescriptor::new("float")
        .from_to(Property::TranslateY, 0.0, -10.0)
        .duration_ms(3000.0)
        .easing(Easing::EaseInOutSine)
        .looping(Looping::Infinite)
        .direction(Direction::Alternate)
}

/// Start [`breathe`] on `targets` right away.
pub fn start_breathing(animator: &dyn Animator, targets: &[ElementId]) -> Result<AnimationHandle> {
    animator.animate(targets, &breathe())
}

/// Start [`float`] on `targets` right away.
pub fn start_floating(animator: &dyn Animator, targets: &[ElementId]) -> Result<AnimationHandle> {
    animator.animate(targets, &float())
}

/// Scale 1 → `leave_scale`, opacity 1 → 0, no stagger.
pub fn grid_leave(timings: &GridTimings) -> AnimationDescriptor {
    AnimationDescriptor::new("grid-leave")
        .from_to(Property::Scale, 1.0, timings.leave_scale)
        .from_to(Property::Opacity, 1.0, 0.0)
        .duration_ms(timings.leave_ms)
        .easing(Easing::EaseInQuart)
}

/// Scale `leave_scale` → 1, opacity 0 → 1, staggered.
pub fn grid_enter(timings: &GridTimings) -> AnimationDescriptor {
    AnimationDescriptor::new("grid-enter")
        .from_to(Property::Scale, timings.leave_scale, 1.0)
        .from_to(Property::Opacity, 0.0, 1.0)
        .duration_ms(timings.enter_ms)
        .easing(Easing::EaseOutQuart)
        .stagger(stagger(timings.stagger_ms))
}

/// Opacity 0 → 1, slide up from `reveal_offset_y`, scale 0.95 → 1, staggered.
pub fn grid_reveal(timings: &GridTimings) -> AnimationDescriptor {
    AnimationDescriptor::new("grid-reveal")
        .from_to(Property::Opacity, 0.0, 1.0)
        .from_to(Property::TranslateY, timings.reveal_offset_y, 0.0)
        .from_to(Property::Scale, 0.95, 1.0)
        .duration_ms(timings.reveal_ms)
        .easing(Easing::EaseOutQuart)
        .stagger(stagger(timings.stagger_ms))
}

/// Look up a descriptor by name.
pub fn by_name(name: &str) -> Option<AnimationDescriptor> {
    let descriptor = match name {
        "fade-in" => fade_in(),
        "fade-in-up" => fade_in_up(),
        "stagger-children" => stagger_children(),
        "scale-in" => scale_in(),
        "glow" => glow(),
        "breathe" => breathe(),
        "float" => float(),
        _ => return None,
    };
    Some(descriptor)
}
