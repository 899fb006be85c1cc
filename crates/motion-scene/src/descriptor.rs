//! Animation descriptors: immutable parameter sets for one animation.
//!
//! A descriptor lists the animated properties and the timing metadata
//! (duration, delay or stagger, easing, looping, direction). It owns no
//! elements and can be played against any number of targets.
//!
//! # Example
//!
//! ```
//! use motion_scene::descriptor::{AnimationDescriptor, Property};
//! use motion_scene::easing::Easing;
//! use motion_scene::stagger::stagger;
//!
//! let enter = AnimationDescriptor::new("grid-enter")
//!     .from_to(Property::Opacity, 0.0, 1.0)
//!     .from_to(Property::Scale, 0.9, 1.0)
//!     .duration_ms(250.0)
//!     .easing(Easing::EaseOutQuart)
//!     .stagger(stagger(60.0));
//!
//! assert_eq!(enter.delay_for(2), 120.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::stagger::Stagger;

/// Property an animation drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    Scale,
    TranslateX,
    TranslateY,
    /// Degrees.
    Rotate,
    /// Blur radius of the glow shadow in px.
    GlowRadius,
    /// Alpha of the glow shadow.
    GlowOpacity,
}

/// Target value(s) for a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    /// Explicit two-point range.
    FromTo { from: f64, to: f64 },
    /// Animate from the element's current value to `value`.
    Scalar { value: f64 },
    /// Evenly spaced waypoints.
    Keyframes { values: Vec<f64> },
}

impl PropertyValue {
    /// Value at eased progress `t`.
    ///
    /// `current` is the element's value before the animation; it is only read
    /// by [`PropertyValue::Scalar`]. Returns `None` for an empty keyframe list.
    pub fn sample(&self, t: f32, current: Option<f64>) -> Option<f64> {
        let t = t as f64;
        match self {
            Self::FromTo { from, to } => Some(lerp(*from, *to, t)),
            Self::Scalar { value } => Some(match current {
                Some(start) => lerp(start, *value, t),
                None => *value,
            }),
            Self::Keyframes { values } => match values.as_slice() {
                [] => None,
                [only] => Some(*only),
                _ => {
                    let segments = (values.len() - 1) as f64;
                    let position = (t * segments).clamp(0.0, segments);
                    let index = (position.floor() as usize).min(values.len() - 2);
                    let local = position - index as f64;
                    Some(lerp(values[index], values[index + 1], local))
                }
            },
        }
    }

    fn numbers(&self) -> Vec<f64> {
        match self {
            Self::FromTo { from, to } => vec![*from, *to],
            Self::Scalar { value } => vec![*value],
            Self::Keyframes { values } => values.clone(),
        }
    }
}

#[inline]
fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Start delay of an animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delay {
    /// Same delay for every target.
    Fixed { ms: f64 },
    /// Delay depends on the target's index in the collection.
    Stagger(Stagger),
}

impl Delay {
    pub fn for_index(&self, index: usize) -> f64 {
        match self {
            Self::Fixed { ms } => *ms,
            Self::Stagger(stagger) => stagger.delay_for(index),
        }
    }

    /// The scalar delay, `None` for a generator.
    pub fn as_fixed(&self) -> Option<f64> {
        match self {
            Self::Fixed { ms } => Some(*ms),
            Self::Stagger(_) => None,
        }
    }
}

/// How many times an animation plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Looping {
    #[default]
    Once,
    /// Play `count` iterations in total.
    Times { count: u32 },
    /// Never ends on its own.
    Infinite,
}

impl Looping {
    /// Total iterations, `None` when infinite.
    pub fn iterations(&self) -> Option<u32> {
        match self {
            Self::Once => Some(1),
            Self::Times { count } => Some(*count),
            Self::Infinite => None,
        }
    }
}

/// Playback direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Normal,
    Reverse,
    /// Forward on even iterations, backward on odd ones.
    Alternate,
}

impl Direction {
    pub fn is_reversed(&self, iteration: u32) -> bool {
        match self {
            Self::Normal => false,
            Self::Reverse => true,
            Self::Alternate => iteration % 2 == 1,
        }
    }
}

/// Single-shot descriptors finish; looping ones run until cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    SingleShot,
    Looping,
}

/// Immutable description of one animation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDescriptor {
    /// Name used in logs and by [`library::by_name`](crate::library::by_name).
    pub name: String,
    /// Animated properties in declaration order.
    pub properties: Vec<(Property, PropertyValue)>,
    /// Length of one iteration in milliseconds.
    pub duration_ms: f64,
    /// Start delay; `None` means "use the caller's default".
    pub delay: Option<Delay>,
    pub easing: Easing,
    pub looping: Looping,
    pub direction: Direction,
}

impl AnimationDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_to(self, property: Property, from: f64, to: f64) -> Self {
        self.property(property, PropertyValue::FromTo { from, to })
    }

    pub fn scalar(self, property: Property, value: f64) -> Self {
        self.property(property, PropertyValue::Scalar { value })
    }

    pub fn keyframes(self, property: Property, values: impl Into<Vec<f64>>) -> Self {
        self.property(
            property,
            PropertyValue::Keyframes {
                values: values.into(),
            },
        )
    }

    /// Set a property, replacing an earlier entry for the same property.
    pub fn property(mut self, property: Property, value: PropertyValue) -> Self {
        match self.properties.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((property, value)),
        }
        self
    }

    pub fn duration_ms(mut self, duration: f64) -> Self {
        self.duration_ms = duration;
        self
    }

    pub fn delay_ms(mut self, delay: f64) -> Self {
        self.delay = Some(Delay::Fixed { ms: delay });
        self
    }

    pub fn stagger(mut self, stagger: Stagger) -> Self {
        self.delay = Some(Delay::Stagger(stagger));
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn looping(mut self, looping: Looping) -> Self {
        self.looping = looping;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn kind(&self) -> DescriptorKind {
        match self.looping {
            Looping::Infinite => DescriptorKind::Looping,
            Looping::Once | Looping::Times { .. } => DescriptorKind::SingleShot,
        }
    }

    /// Start delay for the target at `index`; zero without a delay.
    pub fn delay_for(&self, index: usize) -> f64 {
        self.delay.map_or(0.0, |delay| delay.for_index(index))
    }

    pub fn get(&self, property: Property) -> Option<&PropertyValue> {
        self.properties
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, value)| value)
    }

    /// Check that the descriptor can be played.
    pub fn validate(&self) -> Result<()> {
        let malformed = |reason: String| {
            Err(AnimationError::MalformedDescriptor(format!(
                "{}: {reason}",
                self.display_name()
            )))
        };

        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return malformed(format!("invalid duration {}", self.duration_ms));
        }
        match self.delay {
            Some(Delay::Fixed { ms }) if !ms.is_finite() => {
                return malformed(format!("invalid delay {ms}"));
            }
            Some(Delay::Stagger(s)) if !s.base_ms.is_finite() || !s.start_ms.is_finite() => {
                return malformed("invalid stagger".to_string());
            }
            _ => {}
        }
        if self.looping == (Looping::Times { count: 0 }) {
            return malformed("zero iterations".to_string());
        }
        for (property, value) in &self.properties {
            if let PropertyValue::Keyframes { values } = value {
                if values.is_empty() {
                    return malformed(format!("empty keyframes for {property:?}"));
                }
            }
            if value.numbers().iter().any(|n| !n.is_finite()) {
                return malformed(format!("non-finite value for {property:?}"));
            }
        }
        Ok(())
    }

    pub(crate) fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "<anonymous>"
        } else {
            &self.name
        }
    }
}
