//! Easing curves for animation timing.
//!
//! Covers the CSS timing functions (linear, the `ease` family, cubic-bezier,
//! steps) plus the polynomial and sine curves the storefront descriptors use
//! (`ease-in-quart`, `ease-out-quart`, `ease-in-out-sine`).
//!
//! ```
//! use motion_scene::easing::Easing;
//!
//! let curve = Easing::parse("easeOutQuart").unwrap();
//! assert_eq!(curve, Easing::EaseOutQuart);
//! assert!(curve.evaluate(0.5) > 0.9);
//! ```

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::{AnimationError, Result};

/// Position for stepped animations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPosition {
    /// Jump at the start of each interval (CSS `jump-start`).
    Start,
    /// Jump at the end of each interval (CSS `jump-end`).
    #[default]
    End,
}

/// Easing curve mapping linear progress (0.0 to 1.0) to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Easing {
    /// No easing.
    #[default]
    Linear,
    /// CSS `ease`, `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,
    /// CSS `ease-in`, `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,
    /// CSS `ease-out`, `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,
    /// CSS `ease-in-out`, `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,
    /// `t⁴`: items leaving the grid.
    EaseInQuart,
    /// `1 - (1 - t)⁴`: items entering the grid.
    EaseOutQuart,
    /// Half cosine wave, used by the breathing and floating loops.
    EaseInOutSine,
    /// Custom cubic bezier with control points (x1, y1) and (x2, y2).
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Discrete jumps.
    Steps { count: u32, position: StepPosition },
}

impl Easing {
    /// Evaluate the curve at progress `t`; input is clamped to [0, 1].
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::EaseInQuart => t.powi(4),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Self::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, t),
            Self::Steps { count, position } => stepped(count, position, t),
        }
    }

    /// Custom cubic bezier. x values must be in [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(AnimationError::MalformedDescriptor(format!(
                "bezier x values must be in [0, 1], got {x1} and {x2}"
            )));
        }
        Ok(Self::CubicBezier { x1, y1, x2, y2 })
    }

    /// Stepped curve with `count` intervals (at least one).
    pub fn steps(count: u32, position: StepPosition) -> Result<Self> {
        if count == 0 {
            return Err(AnimationError::MalformedDescriptor(
                "steps must be at least 1".to_string(),
            ));
        }
        Ok(Self::Steps { count, position })
    }

    /// Parse a named curve.
    ///
    /// Accepts camel case (`easeOutQuart`), kebab case (`ease-out-quart`) and
    /// the short forms without the `ease` prefix (`outQuart`).
    pub fn parse(name: &str) -> Option<Self> {
        let key: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let key = key.strip_prefix("ease").filter(|rest| !rest.is_empty()).unwrap_or(key.as_str());

        let curve = match key {
            "linear" => Self::Linear,
            "ease" => Self::Ease,
            "in" => Self::EaseIn,
            "out" => Self::EaseOut,
            "inout" => Self::EaseInOut,
            "inquart" => Self::EaseInQuart,
            "outquart" => Self::EaseOutQuart,
            "inoutsine" => Self::EaseInOutSine,
            _ => return None,
        };
        Some(curve)
    }

    /// Kebab-case name, `None` for parameterised curves.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Self::Linear => Some("linear"),
            Self::Ease => Some("ease"),
            Self::EaseIn => Some("ease-in"),
            Self::EaseOut => Some("ease-out"),
            Self::EaseInOut => Some("ease-in-out"),
            Self::EaseInQuart => Some("ease-in-quart"),
            Self::EaseOutQuart => Some("ease-out-quart"),
            Self::EaseInOutSine => Some("ease-in-out-sine"),
            Self::CubicBezier { .. } | Self::Steps { .. } => None,
        }
    }
}

/// Evaluate a cubic bezier at `progress` by solving x(t) with Newton-Raphson,
/// then reading y(t).
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let mut t = progress;
    for _ in 0..8 {
        let x = bezier_component(x1, x2, t) - progress;
        if x.abs() < 1e-6 {
            break;
        }
        let dx = bezier_derivative(x1, x2, t);
        if dx.abs() < 1e-6 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    bezier_component(y1, y2, t)
}

/// `3(1-t)²t·p1 + 3(1-t)t²·p2 + t³`
#[inline]
fn bezier_component(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_derivative(p1: f32, p2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

fn stepped(count: u32, position: StepPosition, t: f32) -> f32 {
    if count == 0 {
        return t;
    }
    let n = count as f32;
    match position {
        StepPosition::Start => (t * n).ceil() / n,
        StepPosition::End => (t * n).floor() / n,
    }
}
