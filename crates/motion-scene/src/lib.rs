//! Scroll-triggered animation scheduling for the storefront front-end.
//!
//! This crate decides *when* decorative animations start and *how* they are
//! sequenced and cleaned up. Interpolation itself belongs to an injected
//! [`Animator`]; visibility reporting and timers come from injected
//! [`VisibilityObserver`] and [`Scheduler`] capabilities.
//!
//! # Architecture
//!
//! ```text
//! MotionContext (shared capabilities + defaults)
//!   ├── VisibilityTrigger   element ⟶ observe ⟶ animate once visible
//!   ├── SequencePlayer      element ⟶ schedule step i at i * spacing
//!   └── GridTransitions     elements ⟶ leave / enter / reveal
//!
//! library         named descriptors (fade, scale, glow, loops, grid)
//! AnimationEngine headless reference Animator (tick + sample)
//! HeadlessViewport / VirtualClock   deterministic host capabilities
//! ```
//!
//! Everything runs on a single cooperative event loop: shared state uses
//! `Rc`/`RefCell` and no type here is `Send`.

pub mod animator;
pub mod context;
pub mod descriptor;
pub mod easing;
pub mod element;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod library;
pub mod scheduler;
pub mod sequence;
pub mod stagger;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod trigger;
pub mod viewport;
pub mod visibility;

pub use animator::{AnimationHandle, Animator};
pub use context::MotionContext;
pub use descriptor::{
    AnimationDescriptor, Delay, DescriptorKind, Direction, Looping, Property, PropertyValue,
};
pub use easing::{Easing, StepPosition};
pub use element::{ElementId, ElementRef};
pub use engine::AnimationEngine;
pub use error::{AnimationError, Result};
pub use events::{AnimationEvent, EventQueue};
pub use grid::{GridTimings, GridTransitions};
pub use scheduler::{Scheduler, Task, TimerId, VirtualClock};
pub use sequence::SequencePlayer;
pub use stagger::{Stagger, stagger};
pub use trigger::{SubscriptionPhase, TriggerOptions, VisibilityTrigger};
pub use viewport::{HeadlessViewport, ObserverCall, Rect};
pub use visibility::{ObserveOptions, SessionId, VisibilityCallback, VisibilityEntry, VisibilityObserver};
