//! Animation lifecycle events.
//!
//! The [`AnimationEngine`](crate::AnimationEngine) pushes events while it
//! starts, advances and cancels animations; the host drains them after each
//! tick.
//!
//! ```ignore
//! engine.tick(16.0);
//! for event in engine.drain_events() {
//!     if let AnimationEvent::Ended { handle, .. } = event {
//!         tracing::info!(%handle, "animation finished");
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::animator::AnimationHandle;
use crate::element::ElementId;

/// Event emitted when an animation changes state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationEvent {
    /// Animation was accepted by the engine.
    Started {
        handle: AnimationHandle,
        /// Descriptor name.
        name: String,
        targets: Vec<ElementId>,
    },
    /// One target completed an iteration of a multi-iteration animation.
    Iteration {
        handle: AnimationHandle,
        element: ElementId,
        /// The iteration that just completed (0-indexed).
        iteration: u32,
    },
    /// Every target finished.
    Ended {
        handle: AnimationHandle,
        name: String,
    },
    /// Animation was cancelled before completion.
    Cancelled {
        handle: AnimationHandle,
        name: String,
    },
}

impl AnimationEvent {
    pub fn handle(&self) -> AnimationHandle {
        match self {
            Self::Started { handle, .. }
            | Self::Iteration { handle, .. }
            | Self::Ended { handle, .. }
            | Self::Cancelled { handle, .. } => *handle,
        }
    }
}

/// FIFO of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<AnimationEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: AnimationEvent) {
        self.events.push_back(event);
    }

    /// Remove and return all events in emission order.
    pub fn drain(&mut self) -> Vec<AnimationEvent> {
        self.events.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
